// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Tile to glyph matching.
//!
//! Solid tiles skip the hash search: they carry no shape, so they become
//! the reserved space glyph (or the full block, when enabled and the color
//! is not the main background). Every other tile is hashed twice, as is
//! and color inverted, and compared against every catalog glyph. The
//! smallest Hamming distance wins; ties keep the first candidate seen,
//! walking the catalog in ascending code point order and trying the
//! normal orientation before the inverted one.

use crate::block::Tile;
use crate::catalog::{GlyphCatalog, GlyphRecord, FULL_BLOCK, SPACE};
use crate::error::{PunkError, Result};
use crate::hash::tile_hash_pair;
use image::{Pixel, Rgb, RgbImage};
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

pub type Color = [u8; 3];

/// Default luma below which a solid space tile is flagged inverted
pub const DARK_LEVEL: u8 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// 0-based tile index in row-major order
    pub index: usize,
    pub code: u32,
    pub inverted: bool,
    /// Hamming distance, 0 = exact
    pub score: u32,
    pub fg: Color,
    pub bg: Color,
}

impl MatchResult {
    pub fn ch(&self) -> char {
        char::from_u32(self.code).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

/// Returns the tile's color when every pixel is exactly the same
pub fn solid_color(tile: &RgbImage) -> Option<Rgb<u8>> {
    let mut pixels = tile.pixels();
    let first = *pixels.next()?;
    if pixels.all(|p| *p == first) {
        Some(first)
    } else {
        None
    }
}

pub struct Matcher<'a> {
    catalog: &'a GlyphCatalog,
    match_full_blocks: bool,
    background: Rgb<u8>,
    dark_level: u8,
}

impl<'a> Matcher<'a> {
    /// `background` is the image's main background color; it only matters
    /// when `match_full_blocks` is on
    pub fn new(catalog: &'a GlyphCatalog, match_full_blocks: bool, background: Rgb<u8>) -> Self {
        Self {
            catalog,
            match_full_blocks,
            background,
            dark_level: DARK_LEVEL,
        }
    }

    /// Solid space tiles with a luma below `level` come back inverted, so
    /// mono output shows them in reverse video. 0 turns this off.
    pub fn with_dark_level(mut self, level: u8) -> Self {
        self.dark_level = level;
        self
    }

    pub fn match_tile(&self, tile: &Tile) -> Result<MatchResult> {
        let dims = tile.image.dimensions();
        if dims != (self.catalog.tile_width, self.catalog.tile_height) {
            return Err(PunkError::TileSizeMismatch {
                expected: (self.catalog.tile_width, self.catalog.tile_height),
                found: dims,
            });
        }

        if let Some(color) = solid_color(&tile.image) {
            let code = if self.match_full_blocks && color != self.background {
                FULL_BLOCK
            } else {
                SPACE
            };
            let dark = code == SPACE && color.to_luma()[0] < self.dark_level;
            return Ok(MatchResult {
                index: tile.index,
                code,
                inverted: dark,
                score: 0,
                fg: color.0,
                bg: color.0,
            });
        }

        let (hash, inv_hash) = tile_hash_pair(&tile.image, self.catalog.mode);
        let mut best: Option<(&GlyphRecord, bool, u32)> = None;
        for glyph in self.catalog.glyphs() {
            for (inverted, h) in [(false, &hash), (true, &inv_hash)] {
                let d = glyph.hash.distance(h)?;
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((glyph, inverted, d));
                }
            }
        }
        let (glyph, inverted, score) =
            best.ok_or_else(|| PunkError::EmptyGlyphSource("catalog".into()))?;

        let fg = *tile.image.get_pixel(glyph.fg.0, glyph.fg.1);
        let bg = *tile.image.get_pixel(glyph.bg.0, glyph.bg.1);
        debug!(
            "tile {} -> {:?} (U+{:04X}) inverted={} score={}",
            tile.number(),
            glyph.ch(),
            glyph.code,
            inverted,
            score
        );
        Ok(MatchResult {
            index: tile.index,
            code: glyph.code,
            inverted,
            score,
            fg: fg.0,
            bg: bg.0,
        })
    }

    /// Matches every tile. Work may run on the current rayon pool, the
    /// results always come back in tile order.
    pub fn match_all(&self, tiles: &[Tile]) -> Result<Vec<MatchResult>> {
        tiles.par_iter().map(|t| self.match_tile(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::extract;
    use crate::catalog::tests::{left_half, test_catalog};
    use crate::hash::HashMode;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn tile_of(img: RgbImage) -> Tile {
        Tile {
            index: 0,
            col: 0,
            row: 0,
            x: 0,
            y: 0,
            image: img,
        }
    }

    #[test]
    fn test_solid_tile_is_space() {
        let cat = test_catalog((8, 16), HashMode::Native);
        let m = Matcher::new(&cat, false, WHITE);
        let r = m.match_tile(&tile_of(RgbImage::from_pixel(8, 16, WHITE))).unwrap();
        assert_eq!((r.code, r.score, r.inverted), (SPACE, 0, false));

        // without full blocks any solid color is a space
        let r = m.match_tile(&tile_of(RgbImage::from_pixel(8, 16, Rgb([200, 0, 0])))).unwrap();
        assert_eq!(r.code, SPACE);
        assert_eq!(r.fg, [200, 0, 0]);
    }

    #[test]
    fn test_dark_space_is_inverted() {
        let cat = test_catalog((8, 16), HashMode::Native);
        let m = Matcher::new(&cat, false, WHITE);
        let r = m.match_tile(&tile_of(RgbImage::from_pixel(8, 16, BLACK))).unwrap();
        assert_eq!((r.code, r.inverted, r.score), (SPACE, true, 0));
        assert_eq!((r.fg, r.bg), ([0, 0, 0], [0, 0, 0]));

        // luma 29 is still dark, 30 is not
        let r = m.match_tile(&tile_of(RgbImage::from_pixel(8, 16, Rgb([29, 29, 29])))).unwrap();
        assert!(r.inverted);
        let r = m.match_tile(&tile_of(RgbImage::from_pixel(8, 16, Rgb([30, 30, 30])))).unwrap();
        assert!(!r.inverted);

        let off = Matcher::new(&cat, false, WHITE).with_dark_level(0);
        let r = off.match_tile(&tile_of(RgbImage::from_pixel(8, 16, BLACK))).unwrap();
        assert!(!r.inverted);

        // full blocks carry their color, never inverted
        let full = Matcher::new(&cat, true, WHITE);
        let r = full.match_tile(&tile_of(RgbImage::from_pixel(8, 16, BLACK))).unwrap();
        assert_eq!((r.code, r.inverted), (FULL_BLOCK, false));
    }

    #[test]
    fn test_solid_non_background_is_full_block() {
        let cat = test_catalog((8, 16), HashMode::Native);
        let m = Matcher::new(&cat, true, WHITE);
        let r = m.match_tile(&tile_of(RgbImage::from_pixel(8, 16, Rgb([200, 0, 0])))).unwrap();
        assert_eq!((r.code, r.score), (FULL_BLOCK, 0));
        let r = m.match_tile(&tile_of(RgbImage::from_pixel(8, 16, WHITE))).unwrap();
        assert_eq!(r.code, SPACE);
    }

    #[test]
    fn test_exact_and_inverted_match() {
        let cat = test_catalog((8, 16), HashMode::Native);
        let m = Matcher::new(&cat, false, WHITE);

        // red ink on the left, yellow paper on the right
        let img = RgbImage::from_fn(8, 16, |x, _| if x < 4 { Rgb([255, 0, 0]) } else { Rgb([255, 255, 0]) });
        let r = m.match_tile(&tile_of(img)).unwrap();
        assert_eq!((r.code, r.inverted, r.score), (0x258C, false, 0));
        assert_eq!(r.fg, [255, 0, 0]);
        assert_eq!(r.bg, [255, 255, 0]);

        // light on the left: the left-half glyph again, inverted
        let img = RgbImage::from_fn(8, 16, |x, _| if x < 4 { WHITE } else { BLACK });
        let r = m.match_tile(&tile_of(img)).unwrap();
        assert_eq!((r.code, r.inverted, r.score), (0x258C, true, 0));
        assert_eq!(r.fg, [255, 255, 255]);
        assert_eq!(r.bg, [0, 0, 0]);
    }

    #[test]
    fn test_tie_break_first_code_point_wins() {
        // two glyphs with identical shapes: the lower code point must win
        let cat = GlyphCatalog::from_canvases(
            "twins",
            (8, 16),
            HashMode::Native,
            0,
            vec![(0x62, left_half(8, 16)), (0x61, left_half(8, 16))],
        )
        .unwrap();
        let m = Matcher::new(&cat, false, WHITE);
        let img = RgbImage::from_fn(8, 16, |x, _| if x < 4 { BLACK } else { WHITE });
        for _ in 0..5 {
            let r = m.match_tile(&tile_of(img.clone())).unwrap();
            assert_eq!(r.code, 0x61);
        }
    }

    #[test]
    fn test_chosen_glyph_is_nearest() {
        let cat = test_catalog((8, 16), HashMode::Native);
        let m = Matcher::new(&cat, false, WHITE);
        // a noisy quarter block, close to nothing in particular
        let img = RgbImage::from_fn(8, 16, |x, y| if x < 4 && y < 8 || (x + y) % 7 == 0 { BLACK } else { WHITE });
        let r = m.match_tile(&tile_of(img.clone())).unwrap();
        let (h, inv) = tile_hash_pair(&img, HashMode::Native);
        for g in cat.glyphs() {
            assert!(r.score <= g.hash.distance(&h).unwrap());
            assert!(r.score <= g.hash.distance(&inv).unwrap());
        }
    }

    #[test]
    fn test_tile_size_mismatch() {
        let cat = test_catalog((8, 16), HashMode::Native);
        let m = Matcher::new(&cat, false, WHITE);
        let err = m.match_tile(&tile_of(RgbImage::from_pixel(8, 8, WHITE)));
        assert!(matches!(err, Err(PunkError::TileSizeMismatch { .. })));
    }

    #[test]
    fn test_match_all_keeps_order() {
        let cat = test_catalog((8, 16), HashMode::Resized { size: 8 });
        let img = RgbImage::from_fn(64, 32, |x, y| {
            if (x / 8 + y / 16) % 2 == 0 && x % 8 < 4 {
                BLACK
            } else {
                WHITE
            }
        });
        let tiles = extract(&img, 8, 16).unwrap();
        let m = Matcher::new(&cat, false, WHITE);
        let results = m.match_all(&tiles).unwrap();
        assert_eq!(results.len(), 16);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.index, i);
            let expect = if (i % 8 + i / 8) % 2 == 0 { 0x258C } else { SPACE };
            assert_eq!(r.code, expect);
        }
    }

    #[test]
    fn test_solid_color_helper() {
        assert_eq!(solid_color(&RgbImage::from_pixel(3, 3, BLACK)), Some(BLACK));
        let mut img = RgbImage::from_pixel(3, 3, BLACK);
        img.put_pixel(2, 2, Rgb([0, 0, 1]));
        assert_eq!(solid_color(&img), None);
    }
}
