// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Color and character metadata for one converted image.
//!
//! `pallet` is the list of distinct colors in first-seen order (walking
//! tiles in order, foreground before background). `fgColors`/`bgColors`
//! hold one palette index per tile.

use crate::matcher::{Color, MatchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunkMetadata {
    pub text: String,
    pub pallet: Vec<String>,
    #[serde(rename = "fgColors")]
    pub fg_colors: Vec<usize>,
    #[serde(rename = "bgColors")]
    pub bg_colors: Vec<usize>,
}

pub fn hex_color(c: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}

impl PunkMetadata {
    pub fn new(text: String, matches: &[MatchResult]) -> Self {
        let mut pallet = vec![];
        let mut seen: HashMap<Color, usize> = HashMap::new();
        let mut index_of = |c: Color| -> usize {
            *seen.entry(c).or_insert_with(|| {
                pallet.push(hex_color(c));
                pallet.len() - 1
            })
        };
        let mut fg_colors = Vec::with_capacity(matches.len());
        let mut bg_colors = Vec::with_capacity(matches.len());
        for m in matches {
            fg_colors.push(index_of(m.fg));
            bg_colors.push(index_of(m.bg));
        }
        Self {
            text,
            pallet,
            fg_colors,
            bg_colors,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(index: usize, fg: Color, bg: Color) -> MatchResult {
        MatchResult {
            index,
            code: 0x41,
            inverted: false,
            score: 0,
            fg,
            bg,
        }
    }

    #[test]
    fn test_palette_first_seen() {
        let matches = vec![
            m(0, [255, 0, 0], [0, 0, 0]),
            m(1, [0, 0, 0], [0, 0, 0]),
            m(2, [0, 255, 0], [255, 0, 0]),
        ];
        let meta = PunkMetadata::new("AAA\n".into(), &matches);
        assert_eq!(meta.pallet, vec!["#ff0000", "#000000", "#00ff00"]);
        assert_eq!(meta.fg_colors, vec![0, 1, 2]);
        assert_eq!(meta.bg_colors, vec![1, 1, 0]);
    }

    #[test]
    fn test_json_field_names() {
        let meta = PunkMetadata::new("A\n".into(), &[m(0, [1, 2, 3], [4, 5, 6])]);
        let v: serde_json::Value = serde_json::from_str(&meta.to_json().unwrap()).unwrap();
        assert_eq!(v["text"], "A\n");
        assert_eq!(v["pallet"][1], "#040506");
        assert_eq!(v["fgColors"][0], 0);
        assert_eq!(v["bgColors"][0], 1);
    }
}
