// RustPixel
// copyright zipxing@hotmail.com 2022～2025
//
// Pre-rendered glyph images, one PNG per code point

use super::{fit_to_tile, GlyphCatalog, GlyphRecord};
use crate::config::PunkConfig;
use crate::error::{PunkError, Result};
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Reads the code point from a glyph file stem: `9608`, `U+2588` or `0x2588`
pub fn parse_code(stem: &str) -> Option<u32> {
    let hex = stem
        .strip_prefix("U+")
        .or_else(|| stem.strip_prefix("u+"))
        .or_else(|| stem.strip_prefix("0x"));
    let code = match hex {
        Some(h) => u32::from_str_radix(h, 16).ok(),
        None => stem.parse().ok(),
    };
    code.filter(|c| char::from_u32(*c).is_some())
}

fn glyph_files(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|_| PunkError::EmptyGlyphSource(dir.display().to_string()))?;
    let mut files = vec![];
    for entry in entries {
        let path = entry?.path();
        let is_png = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if !is_png {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()).and_then(parse_code) {
            Some(code) => files.push((code, path)),
            None => debug!("skip {}: no code point in name", path.display()),
        }
    }
    files.sort();
    Ok(files)
}

/// Loads every glyph image in `dir`. Images that are not tile sized are
/// resampled before hashing and sample point picking.
pub fn catalog_from_dir<P: AsRef<Path>>(dir: P, cfg: &PunkConfig) -> Result<GlyphCatalog> {
    let dir = dir.as_ref();
    let files = glyph_files(dir)?;
    info!("loading {} glyph images from {}", files.len(), dir.display());

    let mode = cfg.hash_mode();
    let tile = cfg.tile_size();
    let records: Vec<Option<GlyphRecord>> = files
        .par_iter()
        .map(|(code, path)| -> Result<Option<GlyphRecord>> {
            let img = image::open(path)?.to_luma8();
            let fitted = fit_to_tile(&img, tile);
            Ok(GlyphRecord::from_canvas(*code, &fitted, mode, cfg.sample_nudge))
        })
        .collect::<Result<_>>()?;

    GlyphCatalog::assemble(
        &dir.display().to_string(),
        tile,
        mode,
        records.into_iter().flatten(),
    )
}
