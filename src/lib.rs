// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! PunkText converts grid pixel-art portraits into character art.
//!
//! Each fixed-size block of the source image is matched to the glyph of a
//! reference font whose average perceptual hash is closest, trying both
//! the block and its color-inverted counterpart. The glyph is then drawn
//! back with colors sampled from the block. A conversion yields a text
//! transcript, color metadata and a list of advisory anomalies; batch
//! mode folds a whole directory into one glyph frequency table.
//!
//! Glyph catalog construction, per-tile matching and batch images all run
//! on rayon; results always come back in row-major tile order, so output
//! does not depend on thread count.
//!
//! The base feature leaves out the terminal renderer, keeping only the
//! matching engine and file logging.

/// error type shared by every stage
pub mod error;

/// run configuration, loadable from toml
pub mod config;

/// average perceptual hash and hamming distance
pub mod hash;

/// glyph catalog: font rendering, glyph image dirs and json cache
pub mod catalog;

/// image preparation and tile extraction
pub mod block;

/// tile to glyph matching
pub mod matcher;

/// mutant, low-confidence and structural checks
pub mod anomaly;

/// per image conversion
pub mod pipeline;

/// color and text metadata of a conversion
pub mod metadata;

/// batch mode frequency table and csv report
pub mod aggregate;

pub mod util;

/// file logging with log4rs
#[cfg(feature = "log4rs")]
pub mod log;

/// terminal output with crossterm
#[cfg(feature = "term")]
pub mod term;

pub use catalog::{GlyphCatalog, GlyphRecord, FULL_BLOCK, SPACE};
pub use config::{PunkConfig, ResizePolicy};
pub use error::{PunkError, Result};
pub use hash::{HashMode, PerceptualHash};
pub use matcher::MatchResult;
pub use pipeline::{convert, Pipeline, PunkResult};
