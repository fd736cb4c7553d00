// RustPixel
// copyright zipxing@hotmail.com 2022～2025
//
// Run configuration for PunkText

use crate::error::{PunkError, Result};
use crate::hash::HashMode;
use crate::matcher::DARK_LEVEL;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with images that are not the canonical size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResizePolicy {
    /// wrong size is a validation error
    #[default]
    Reject,
    /// Lanczos3, keeps glyph shapes
    Quality,
    /// no interpolation, keeps exact colors
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunkConfig {
    /// reverse video for inverted matches in mono terminal output
    pub invert_enabled: bool,
    /// dump tiles and glyph canvases to disk
    pub debug: bool,
    /// native-resolution hashing and the strict error threshold
    pub optimize: bool,
    /// solid tiles that are not the main background become full blocks
    pub match_full_blocks: bool,

    pub image_width: u32,
    pub image_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,

    pub resize: ResizePolicy,
    pub sharpen_sigma: f32,
    pub sharpen_threshold: i32,

    pub hash_size: u32,

    pub font_size: f32,
    pub codepoint_start: u32,
    pub codepoint_end: u32,
    /// Offset added to the first ink/paper pixel of a glyph canvas so the
    /// sample point leaves the antialiased edge. Heuristic, tune per font.
    pub sample_nudge: u32,

    pub error_threshold: u32,
    pub strict_error_threshold: u32,

    /// pixel whose color is the image's main background
    pub background_probe: (u32, u32),
    /// solid tiles darker than this luma are spaces drawn in reverse video
    pub dark_level: u8,

    /// 0 = one per cpu, 1 = sequential
    pub workers: usize,
}

impl Default for PunkConfig {
    fn default() -> Self {
        Self {
            invert_enabled: true,
            debug: false,
            optimize: false,
            match_full_blocks: false,
            image_width: 1280,
            image_height: 1280,
            tile_width: 80,
            tile_height: 160,
            resize: ResizePolicy::Reject,
            sharpen_sigma: 1.0,
            sharpen_threshold: 1,
            hash_size: 80,
            font_size: 160.0,
            codepoint_start: 0x0021,
            codepoint_end: 0x266C,
            sample_nudge: 5,
            error_threshold: 20,
            strict_error_threshold: 0,
            background_probe: (0, 0),
            dark_level: DARK_LEVEL,
            workers: 0,
        }
    }
}

impl PunkConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PunkConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(PunkError::InvalidConfig("tile size must be non-zero".into()));
        }
        if self.image_width % self.tile_width != 0 || self.image_height % self.tile_height != 0 {
            return Err(PunkError::InvalidConfig(format!(
                "{}x{} image does not split into {}x{} tiles",
                self.image_width, self.image_height, self.tile_width, self.tile_height
            )));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(PunkError::InvalidConfig("image size must be non-zero".into()));
        }
        if self.hash_size == 0 {
            return Err(PunkError::InvalidConfig("hash_size must be non-zero".into()));
        }
        if self.codepoint_start >= self.codepoint_end {
            return Err(PunkError::InvalidConfig(format!(
                "empty codepoint range {:#x}..{:#x}",
                self.codepoint_start, self.codepoint_end
            )));
        }
        if self.font_size <= 0.0 {
            return Err(PunkError::InvalidConfig("font_size must be positive".into()));
        }
        let (px, py) = self.background_probe;
        if px >= self.image_width || py >= self.image_height {
            return Err(PunkError::InvalidConfig(format!(
                "background probe ({},{}) is outside the image",
                px, py
            )));
        }
        Ok(())
    }

    pub fn hash_mode(&self) -> HashMode {
        if self.optimize {
            HashMode::Native
        } else {
            HashMode::Resized {
                size: self.hash_size,
            }
        }
    }

    pub fn active_error_threshold(&self) -> u32 {
        if self.optimize {
            self.strict_error_threshold
        } else {
            self.error_threshold
        }
    }

    pub fn tiles_per_row(&self) -> u32 {
        self.image_width / self.tile_width
    }

    pub fn tiles_per_column(&self) -> u32 {
        self.image_height / self.tile_height
    }

    pub fn tile_count(&self) -> usize {
        (self.tiles_per_row() * self.tiles_per_column()) as usize
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }
}
