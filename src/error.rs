// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Error type shared by every PunkText stage.
//!
//! Configuration errors abort a whole run; validation errors only abort
//! the image being processed. Match anomalies are not errors at all, see
//! [`crate::anomaly`].

#[derive(Debug, Clone, PartialEq)]
pub enum PunkError {
    // configuration
    HashLengthMismatch { left: usize, right: usize },
    EmptyGlyphSource(String),
    FontLoad(String),
    InvalidConfig(String),
    TileSizeMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    // input validation
    InvalidDimensions {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    Image(String),

    // I/O and persistence
    Io(String),
    Serialize(String),

    Cancelled,
}

impl PunkError {
    /// True for errors no later image could recover from.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PunkError::HashLengthMismatch { .. }
                | PunkError::EmptyGlyphSource(_)
                | PunkError::FontLoad(_)
                | PunkError::InvalidConfig(_)
                | PunkError::TileSizeMismatch { .. }
        )
    }
}

impl std::fmt::Display for PunkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PunkError::HashLengthMismatch { left, right } => {
                write!(
                    f,
                    "hash length mismatch: {} bits vs {} bits (hashes from different modes?)",
                    left, right
                )
            }
            PunkError::EmptyGlyphSource(src) => {
                write!(f, "glyph source '{}' produced no glyphs", src)
            }
            PunkError::FontLoad(msg) => write!(f, "failed to load font: {}", msg),
            PunkError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            PunkError::TileSizeMismatch { expected, found } => {
                write!(
                    f,
                    "tile size mismatch: expected {}x{}, found {}x{}",
                    expected.0, expected.1, found.0, found.1
                )
            }
            PunkError::InvalidDimensions {
                width,
                height,
                expected_width,
                expected_height,
            } => {
                write!(
                    f,
                    "image is {}x{}, please supply the {}x{} image",
                    width, height, expected_width, expected_height
                )
            }
            PunkError::Image(msg) => write!(f, "image error: {}", msg),
            PunkError::Io(msg) => write!(f, "I/O error: {}", msg),
            PunkError::Serialize(msg) => write!(f, "serialization error: {}", msg),
            PunkError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for PunkError {}

impl From<std::io::Error> for PunkError {
    fn from(e: std::io::Error) -> Self {
        PunkError::Io(e.to_string())
    }
}

impl From<image::ImageError> for PunkError {
    fn from(e: image::ImageError) -> Self {
        PunkError::Image(e.to_string())
    }
}

impl From<serde_json::Error> for PunkError {
    fn from(e: serde_json::Error) -> Self {
        PunkError::Serialize(e.to_string())
    }
}

impl From<toml::de::Error> for PunkError {
    fn from(e: toml::de::Error) -> Self {
        PunkError::InvalidConfig(e.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for PunkError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        PunkError::InvalidConfig(format!("worker pool: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, PunkError>;
