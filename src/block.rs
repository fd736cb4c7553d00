// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Cuts a source image into character-cell tiles.
//!
//! Tiles come out in row-major order: the first row left to right, then
//! the next row. Text reconstruction and the grid coordinates in warnings
//! both rely on this order.

use crate::config::{PunkConfig, ResizePolicy};
use crate::error::{PunkError, Result};
use image::{imageops, imageops::FilterType, DynamicImage, Rgb, RgbImage};
use log::info;

#[derive(Debug, Clone)]
pub struct Tile {
    /// 0-based position in row-major order
    pub index: usize,
    pub col: u32,
    pub row: u32,
    /// top-left pixel in the source image
    pub x: u32,
    pub y: u32,
    pub image: RgbImage,
}

impl Tile {
    /// Pixel rect `(x0, y0, x1, y1)`, end exclusive
    pub fn rect(&self) -> (u32, u32, u32, u32) {
        (
            self.x,
            self.y,
            self.x + self.image.width(),
            self.y + self.image.height(),
        )
    }

    /// 1-based number used in warnings and debug dumps
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Brings a decoded image to the canonical size, or rejects it when no
/// resize policy is enabled
pub fn prepare_image(img: &DynamicImage, cfg: &PunkConfig) -> Result<RgbImage> {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    if (w, h) == (cfg.image_width, cfg.image_height) {
        return Ok(rgb);
    }
    let filter = match cfg.resize {
        ResizePolicy::Reject => {
            return Err(PunkError::InvalidDimensions {
                width: w,
                height: h,
                expected_width: cfg.image_width,
                expected_height: cfg.image_height,
            })
        }
        ResizePolicy::Quality => FilterType::Lanczos3,
        ResizePolicy::Nearest => FilterType::Nearest,
    };
    info!(
        "resizing {}x{} to {}x{} ({:?})",
        w, h, cfg.image_width, cfg.image_height, cfg.resize
    );
    let resized = imageops::resize(&rgb, cfg.image_width, cfg.image_height, filter);
    Ok(imageops::unsharpen(
        &resized,
        cfg.sharpen_sigma,
        cfg.sharpen_threshold,
    ))
}

/// Splits `img` into `tile_w x tile_h` tiles in row-major order
pub fn extract(img: &RgbImage, tile_w: u32, tile_h: u32) -> Result<Vec<Tile>> {
    let (w, h) = img.dimensions();
    if tile_w == 0 || tile_h == 0 || w % tile_w != 0 || h % tile_h != 0 {
        return Err(PunkError::InvalidDimensions {
            width: w,
            height: h,
            expected_width: w - w % tile_w.max(1),
            expected_height: h - h % tile_h.max(1),
        });
    }
    let cols = w / tile_w;
    let rows = h / tile_h;
    let mut tiles = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = (col * tile_w, row * tile_h);
            tiles.push(Tile {
                index: tiles.len(),
                col,
                row,
                x,
                y,
                image: imageops::crop_imm(img, x, y, tile_w, tile_h).to_image(),
            });
        }
    }
    Ok(tiles)
}

/// Color of the reference pixel that defines the main background
pub fn background_color(img: &RgbImage, probe: (u32, u32)) -> Rgb<u8> {
    let x = probe.0.min(img.width().saturating_sub(1));
    let y = probe.1.min(img.height().saturating_sub(1));
    *img.get_pixel(x, y)
}
