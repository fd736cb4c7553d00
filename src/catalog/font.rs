// RustPixel
// copyright zipxing@hotmail.com 2022～2025
//
// Live glyph rendering with fontdue

use super::{GlyphCatalog, GlyphRecord};
use crate::config::PunkConfig;
use crate::error::{PunkError, Result};
use fontdue::{Font, FontSettings};
use image::{GrayImage, Luma};
use log::{debug, info};
use rayon::prelude::*;
use std::path::Path;

/// Renders single code points onto a white tile-sized canvas
pub struct FontRasterizer {
    font: Font,
    size: f32,
    tile_width: u32,
    tile_height: u32,
}

impl FontRasterizer {
    pub fn from_bytes(data: &[u8], size: f32, tile: (u32, u32)) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings {
            scale: size,
            ..FontSettings::default()
        })
        .map_err(|e| PunkError::FontLoad(e.to_string()))?;
        Ok(Self {
            font,
            size,
            tile_width: tile.0,
            tile_height: tile.1,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, size: f32, tile: (u32, u32)) -> Result<Self> {
        let data = std::fs::read(path.as_ref()).map_err(|e| {
            PunkError::FontLoad(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_bytes(&data, size, tile)
    }

    /// Black ink on white paper, horizontally centered on the advance and
    /// vertically centered on the line box, then shifted back inside the
    /// tile where the ink box would stick out. Code points the font has no
    /// glyph for come back as a blank canvas.
    pub fn render(&self, code: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(self.tile_width, self.tile_height, Luma([255]));
        let ch = match char::from_u32(code) {
            Some(c) => c,
            None => return img,
        };
        if self.font.lookup_glyph_index(ch) == 0 {
            return img;
        }

        let (metrics, bitmap) = self.font.rasterize(ch, self.size);
        if metrics.width == 0 || metrics.height == 0 || bitmap.is_empty() {
            return img;
        }

        let (ascent, descent) = match self.font.horizontal_line_metrics(self.size) {
            Some(m) => (m.ascent, m.descent),
            None => (self.size * 0.8, -self.size * 0.2),
        };
        let baseline = (self.tile_height as f32 - (ascent - descent)) / 2.0 + ascent;
        let char_x = ((self.tile_width as f32 - metrics.advance_width) / 2.0).round() as i32
            + metrics.xmin;
        let char_y = baseline.round() as i32 - metrics.height as i32 - metrics.ymin;
        let char_x = fit_origin(char_x, metrics.width, self.tile_width);
        let char_y = fit_origin(char_y, metrics.height, self.tile_height);

        for (y, row) in bitmap.chunks(metrics.width).enumerate() {
            for (x, &coverage) in row.iter().enumerate() {
                let px = char_x + x as i32;
                let py = char_y + y as i32;
                if px >= 0 && py >= 0 && px < self.tile_width as i32 && py < self.tile_height as i32 {
                    // fontdue gives coverage, we want darkness
                    let p = img.get_pixel_mut(px as u32, py as u32);
                    p[0] = p[0].min(255 - coverage);
                }
            }
        }
        img
    }

    /// Sweeps `start..end`, keeping every code point that draws something
    pub fn build_catalog(
        &self,
        start: u32,
        end: u32,
        cfg: &PunkConfig,
    ) -> Result<GlyphCatalog> {
        let mode = cfg.hash_mode();
        let nudge = cfg.sample_nudge;
        let records: Vec<GlyphRecord> = (start..end)
            .into_par_iter()
            .filter_map(|code| {
                let rec = GlyphRecord::from_canvas(code, &self.render(code), mode, nudge);
                if rec.is_none() {
                    debug!("{:#06x} draws nothing, dropped", code);
                }
                rec
            })
            .collect();
        info!(
            "rendered {:#06x}..{:#06x} at {}px, {} visible glyphs",
            start,
            end,
            self.size,
            records.len()
        );
        GlyphCatalog::assemble(
            "font",
            (self.tile_width, self.tile_height),
            mode,
            records,
        )
    }
}

/// Builds the catalog for a run straight from a font file
pub fn catalog_from_font<P: AsRef<Path>>(path: P, cfg: &PunkConfig) -> Result<GlyphCatalog> {
    let raster = FontRasterizer::from_file(path, cfg.font_size, cfg.tile_size())?;
    raster.build_catalog(cfg.codepoint_start, cfg.codepoint_end, cfg)
}

/// Moves an ink box origin so `extent` pixels fit in `tile`. Boxes larger
/// than the tile keep their origin and get clipped.
fn fit_origin(origin: i32, extent: usize, tile: u32) -> i32 {
    let room = tile as i32 - extent as i32;
    if room < 0 {
        origin
    } else {
        origin.clamp(0, room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_origin() {
        // underscore below the tile moves up to the bottom row
        assert_eq!(fit_origin(158, 10, 160), 150);
        // accent above the tile moves down to the top row
        assert_eq!(fit_origin(-4, 20, 160), 0);
        assert_eq!(fit_origin(30, 100, 160), 30);
        // oversized boxes stay put
        assert_eq!(fit_origin(-10, 200, 160), -10);
        assert_eq!(fit_origin(0, 160, 160), 0);
    }

    #[test]
    fn test_garbage_font_is_rejected() {
        let err = FontRasterizer::from_bytes(b"not a font", 160.0, (80, 160));
        assert!(matches!(err, Err(PunkError::FontLoad(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let err = catalog_from_font("/nonexistent/BlockZone.ttf", &PunkConfig::default());
        assert!(matches!(err, Err(PunkError::FontLoad(_))));
        assert!(err.unwrap_err().is_configuration());
    }
}
