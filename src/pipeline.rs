// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Converts one image into text.
//!
//! Each conversion is a function of (image, catalog, config): the image is
//! brought to canonical size, cut into tiles, every tile is matched and
//! checked, and the whole lot comes back as a [`PunkResult`]. Tile matching
//! runs on a bounded rayon pool owned by the [`Pipeline`]; results are
//! always returned in row-major tile order.

use crate::anomaly::{check, Anomaly, AnomalyKind, AnomalyRules};
use crate::block::{background_color, extract, prepare_image, Tile};
use crate::catalog::GlyphCatalog;
use crate::config::PunkConfig;
use crate::error::Result;
use crate::matcher::{MatchResult, Matcher};
use crate::metadata::PunkMetadata;
use image::{DynamicImage, RgbImage};
use log::{info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::Path;

/// Everything produced for one image
#[derive(Debug, Clone)]
pub struct PunkResult {
    pub tiles_per_row: u32,
    /// one per tile, row-major
    pub matches: Vec<MatchResult>,
    /// in tile order, several per tile possible
    pub anomalies: Vec<Anomaly>,
}

impl PunkResult {
    /// Matched characters, one line per tile row, each ending in `\n`
    pub fn transcript(&self) -> String {
        let per_row = self.tiles_per_row.max(1) as usize;
        let mut text = String::with_capacity(self.matches.len() * 3);
        for row in self.matches.chunks(per_row) {
            text.extend(row.iter().map(|m| m.ch()));
            text.push('\n');
        }
        text
    }

    pub fn warnings(&self) -> Vec<String> {
        self.anomalies.iter().map(|a| a.message.clone()).collect()
    }

    pub fn has_mutant(&self) -> bool {
        self.anomalies.iter().any(|a| a.kind == AnomalyKind::Mutant)
    }

    pub fn metadata(&self) -> PunkMetadata {
        PunkMetadata::new(self.transcript(), &self.matches)
    }

    /// Writes `<stem>.txt` and `<stem>.json` into `dir`
    pub fn save<P: AsRef<Path>>(&self, dir: P, stem: &str) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::write(dir.join(format!("{}.txt", stem)), self.transcript())?;
        std::fs::write(dir.join(format!("{}.json", stem)), self.metadata().to_json()?)?;
        Ok(())
    }
}

/// Bounded worker pool. `workers == 0` means one thread per cpu.
pub fn build_pool(workers: usize) -> Result<ThreadPool> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("punk-worker-{}", i))
        .build()?)
}

pub struct Pipeline<'a> {
    catalog: &'a GlyphCatalog,
    cfg: &'a PunkConfig,
    rules: AnomalyRules,
    pool: ThreadPool,
}

impl<'a> Pipeline<'a> {
    /// Fails with a configuration error when the config is invalid or the
    /// catalog was built for other tiles or another hash mode
    pub fn new(catalog: &'a GlyphCatalog, cfg: &'a PunkConfig) -> Result<Self> {
        cfg.validate()?;
        catalog.check_compatible(cfg)?;
        Ok(Self {
            catalog,
            cfg,
            rules: AnomalyRules::from_config(cfg),
            pool: build_pool(cfg.workers)?,
        })
    }

    pub fn catalog(&self) -> &GlyphCatalog {
        self.catalog
    }

    pub fn config(&self) -> &PunkConfig {
        self.cfg
    }

    pub(crate) fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    /// Canonical-size image and its tiles, before matching
    pub fn tiles(&self, img: &DynamicImage) -> Result<(RgbImage, Vec<Tile>)> {
        let rgb = prepare_image(img, self.cfg)?;
        let tiles = extract(&rgb, self.cfg.tile_width, self.cfg.tile_height)?;
        Ok((rgb, tiles))
    }

    pub fn convert(&self, img: &DynamicImage) -> Result<PunkResult> {
        let (rgb, tiles) = self.tiles(img)?;
        self.convert_tiles(&rgb, &tiles)
    }

    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<PunkResult> {
        let img = image::open(path.as_ref())?;
        self.convert(&img)
    }

    /// Matches tiles already cut from `rgb`
    pub fn convert_tiles(&self, rgb: &RgbImage, tiles: &[Tile]) -> Result<PunkResult> {
        let background = background_color(rgb, self.cfg.background_probe);
        let matcher = Matcher::new(self.catalog, self.cfg.match_full_blocks, background)
            .with_dark_level(self.cfg.dark_level);
        let matches = self.pool.install(|| matcher.match_all(tiles))?;

        let anomalies: Vec<Anomaly> = tiles
            .iter()
            .zip(matches.iter())
            .flat_map(|(t, m)| check(t, m, &self.rules))
            .collect();
        for a in &anomalies {
            warn!("{}", a.message);
        }
        info!(
            "matched {} tiles, {} anomalies",
            matches.len(),
            anomalies.len()
        );

        Ok(PunkResult {
            tiles_per_row: self.cfg.tiles_per_row(),
            matches,
            anomalies,
        })
    }
}

/// One-shot conversion with a pipeline built for this call
pub fn convert(img: &DynamicImage, catalog: &GlyphCatalog, cfg: &PunkConfig) -> Result<PunkResult> {
    Pipeline::new(catalog, cfg)?.convert(img)
}
