// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Advisory consistency checks on each match.
//!
//! None of these stop processing. They are collected per image and
//! reported after the transcript.

use crate::block::Tile;
use crate::catalog::{is_reserved, FULL_BLOCK};
use crate::config::PunkConfig;
use crate::matcher::{solid_color, MatchResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnomalyKind {
    /// detailed glyph whose sampled fg and bg are the same color
    Mutant,
    /// best score above the error threshold
    LowConfidence,
    /// reserved glyph on a detailed tile, or detailed glyph on a solid tile
    StructuralMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// 0-based tile index
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct AnomalyRules {
    pub error_threshold: u32,
}

impl AnomalyRules {
    pub fn from_config(cfg: &PunkConfig) -> Self {
        Self {
            error_threshold: cfg.active_error_threshold(),
        }
    }
}

pub fn check(tile: &Tile, m: &MatchResult, rules: &AnomalyRules) -> Vec<Anomaly> {
    let mut found = vec![];
    let n = tile.number();
    let anomaly = |kind, message| Anomaly {
        kind,
        index: tile.index,
        message,
    };

    let reserved = is_reserved(m.code);
    if !reserved && m.fg == m.bg {
        found.push(anomaly(
            AnomalyKind::Mutant,
            format!("Mutant block {}: Score: {} x:{} y:{}", n, m.score, tile.col, tile.row),
        ));
    }

    if m.score > rules.error_threshold {
        found.push(anomaly(
            AnomalyKind::LowConfidence,
            format!("Check block {}: Score: {} x:{} y:{}", n, m.score, tile.col, tile.row),
        ));
    }

    let solid = solid_color(&tile.image).is_some();
    if reserved && !solid {
        let name = if m.code == FULL_BLOCK { "Full" } else { "Space" };
        found.push(anomaly(
            AnomalyKind::StructuralMismatch,
            format!("{} block {} is not a solid color!", name, n),
        ));
    } else if !reserved && solid {
        found.push(anomaly(
            AnomalyKind::StructuralMismatch,
            format!("Character block {} is not a space!", n),
        ));
    }

    found
}
