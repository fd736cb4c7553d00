// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Glyph catalog: one fingerprint per visible character of the reference
//! font, plus the two reserved solid glyphs.
//!
//! A catalog comes from one of three places: live rendering with a TTF
//! font ([`font`]), a directory of pre-rendered glyph PNGs ([`dir`]), or a
//! JSON cache written by [`GlyphCatalog::save`]. All three produce the same
//! shape. Records are keyed by code point in a `BTreeMap`, so iteration
//! (and therefore match tie-breaking) is in ascending code point order.

pub mod dir;
pub mod font;

use crate::config::PunkConfig;
use crate::error::{PunkError, Result};
use crate::hash::{average_hash, HashMode, PerceptualHash};
use image::{imageops, imageops::FilterType, GrayImage};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// non-breaking space, stands for solid background tiles
pub const SPACE: u32 = 0x00A0;
/// full block, stands for solid tiles of any other color
pub const FULL_BLOCK: u32 = 0x2588;

pub fn is_reserved(code: u32) -> bool {
    code == SPACE || code == FULL_BLOCK
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRecord {
    pub code: u32,
    pub hash: PerceptualHash,
    /// where the glyph has ink, in tile coordinates
    pub fg: (u32, u32),
    /// where the glyph has paper, in tile coordinates
    pub bg: (u32, u32),
}

impl GlyphRecord {
    /// Builds a record from a glyph canvas of exactly tile size.
    /// Returns None for blank canvases (a single gray level).
    pub fn from_canvas(
        code: u32,
        canvas: &GrayImage,
        mode: HashMode,
        nudge: u32,
    ) -> Option<GlyphRecord> {
        let (mut ink, mut paper) = (u8::MAX, 0u8);
        for p in canvas.pixels() {
            ink = ink.min(p[0]);
            paper = paper.max(p[0]);
        }
        if ink == paper {
            return None;
        }
        let fg = nudged(first_pixel(canvas, ink), canvas, nudge);
        let bg = nudged(first_pixel(canvas, paper), canvas, nudge);
        Some(GlyphRecord {
            code,
            hash: average_hash(canvas, mode),
            fg,
            bg,
        })
    }

    fn reserved(code: u32, bits: usize) -> GlyphRecord {
        GlyphRecord {
            code,
            hash: PerceptualHash::zeroed(bits),
            fg: (0, 0),
            bg: (0, 0),
        }
    }

    pub fn ch(&self) -> char {
        char::from_u32(self.code).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    pub fn is_reserved(&self) -> bool {
        is_reserved(self.code)
    }
}

// first pixel in row-major order with the given gray level
fn first_pixel(canvas: &GrayImage, level: u8) -> (u32, u32) {
    canvas
        .enumerate_pixels()
        .find(|(_, _, p)| p[0] == level)
        .map(|(x, y, _)| (x, y))
        .unwrap_or((0, 0))
}

fn nudged(p: (u32, u32), canvas: &GrayImage, nudge: u32) -> (u32, u32) {
    (
        (p.0 + nudge).min(canvas.width() - 1),
        (p.1 + nudge).min(canvas.height() - 1),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphCatalog {
    pub tile_width: u32,
    pub tile_height: u32,
    pub mode: HashMode,
    glyphs: BTreeMap<u32, GlyphRecord>,
}

impl GlyphCatalog {
    /// Assembles a catalog from swept records, re-adding the reserved
    /// glyphs. An empty sweep is a configuration error.
    pub fn assemble<I>(
        source: &str,
        tile: (u32, u32),
        mode: HashMode,
        records: I,
    ) -> Result<GlyphCatalog>
    where
        I: IntoIterator<Item = GlyphRecord>,
    {
        let mut glyphs: BTreeMap<u32, GlyphRecord> =
            records.into_iter().map(|r| (r.code, r)).collect();
        if glyphs.is_empty() {
            return Err(PunkError::EmptyGlyphSource(source.to_string()));
        }
        let bits = mode.bit_len(tile.0, tile.1);
        for code in [SPACE, FULL_BLOCK] {
            glyphs.insert(code, GlyphRecord::reserved(code, bits));
        }
        info!(
            "glyph catalog from {}: {} glyphs, {} bit hashes",
            source,
            glyphs.len(),
            bits
        );
        Ok(GlyphCatalog {
            tile_width: tile.0,
            tile_height: tile.1,
            mode,
            glyphs,
        })
    }

    /// Builds a catalog from in-memory glyph canvases.
    /// Canvases not of tile size are resampled first.
    pub fn from_canvases<I>(
        source: &str,
        tile: (u32, u32),
        mode: HashMode,
        nudge: u32,
        canvases: I,
    ) -> Result<GlyphCatalog>
    where
        I: IntoIterator<Item = (u32, GrayImage)>,
    {
        let canvases: Vec<(u32, GrayImage)> = canvases.into_iter().collect();
        let records: Vec<GlyphRecord> = canvases
            .par_iter()
            .filter_map(|(code, img)| {
                let fitted = fit_to_tile(img, tile);
                GlyphRecord::from_canvas(*code, &fitted, mode, nudge)
            })
            .collect();
        Self::assemble(source, tile, mode, records)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn get(&self, code: u32) -> Option<&GlyphRecord> {
        self.glyphs.get(&code)
    }

    /// Records in ascending code point order
    pub fn glyphs(&self) -> impl Iterator<Item = &GlyphRecord> {
        self.glyphs.values()
    }

    pub fn codes(&self) -> Vec<u32> {
        self.glyphs.keys().copied().collect()
    }

    pub fn hash_len(&self) -> usize {
        self.mode.bit_len(self.tile_width, self.tile_height)
    }

    /// A catalog only matches tiles cut and hashed the same way
    pub fn check_compatible(&self, cfg: &PunkConfig) -> Result<()> {
        if (self.tile_width, self.tile_height) != cfg.tile_size() {
            return Err(PunkError::TileSizeMismatch {
                expected: cfg.tile_size(),
                found: (self.tile_width, self.tile_height),
            });
        }
        let mode = cfg.hash_mode();
        if self.mode != mode {
            return Err(PunkError::HashLengthMismatch {
                left: self.hash_len(),
                right: mode.bit_len(cfg.tile_width, cfg.tile_height),
            });
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<GlyphCatalog> {
        let data = std::fs::read(path.as_ref())?;
        let cat: GlyphCatalog = serde_json::from_slice(&data)?;
        cat.check_records(&path.as_ref().display().to_string())?;
        Ok(cat)
    }

    /// Consistency of a catalog that did not come from a sweep: every hash
    /// has the catalog's length, every sample point lies inside the tile,
    /// keys agree with records and both reserved glyphs are present
    fn check_records(&self, source: &str) -> Result<()> {
        let bits = self.hash_len();
        for (code, g) in &self.glyphs {
            if *code != g.code {
                return Err(PunkError::InvalidConfig(format!(
                    "{}: record U+{:04X} stored under U+{:04X}",
                    source, g.code, code
                )));
            }
            if g.hash.len() != bits {
                return Err(PunkError::HashLengthMismatch {
                    left: g.hash.len(),
                    right: bits,
                });
            }
            for (x, y) in [g.fg, g.bg] {
                if x >= self.tile_width || y >= self.tile_height {
                    return Err(PunkError::InvalidConfig(format!(
                        "{}: sample point ({},{}) of U+{:04X} is outside the {}x{} tile",
                        source, x, y, g.code, self.tile_width, self.tile_height
                    )));
                }
            }
        }
        if let Some(code) = [SPACE, FULL_BLOCK].into_iter().find(|c| self.get(*c).is_none()) {
            return Err(PunkError::InvalidConfig(format!(
                "{}: reserved glyph U+{:04X} missing",
                source, code
            )));
        }
        if self.glyphs().all(|g| g.is_reserved()) {
            return Err(PunkError::EmptyGlyphSource(source.to_string()));
        }
        Ok(())
    }
}

pub(crate) fn fit_to_tile(img: &GrayImage, tile: (u32, u32)) -> GrayImage {
    if img.dimensions() == tile {
        img.clone()
    } else {
        imageops::resize(img, tile.0, tile.1, FilterType::Lanczos3)
    }
}
