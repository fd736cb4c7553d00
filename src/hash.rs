// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Average-hash fingerprints for tiles and glyph canvases.
//!
//! The pipeline is: stretch contrast to the full 0..255 range, optionally
//! resample onto a fixed `size x size` grid, then emit one bit per sampled
//! pixel (`1` when brighter than the mean). Bits are packed MSB first into
//! `u64` words so Hamming distance is a popcount.
//!
//! Hashes made with different [`HashMode`]s have different lengths and
//! must never be compared; [`PerceptualHash::distance`] fails loudly when
//! that happens.

use crate::error::{PunkError, Result};
use image::{imageops, imageops::FilterType, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    /// resample to `size x size` whatever the tile size is
    Resized { size: u32 },
    /// one bit per tile pixel
    Native,
}

impl HashMode {
    /// Number of bits a hash of a `w x h` tile has in this mode
    pub fn bit_len(&self, w: u32, h: u32) -> usize {
        match self {
            HashMode::Resized { size } => (*size as usize) * (*size as usize),
            HashMode::Native => (w as usize) * (h as usize),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "HexHash", try_from = "HexHash")]
pub struct PerceptualHash {
    words: Vec<u64>,
    len: usize,
}

impl PerceptualHash {
    /// All-zero hash, used by the reserved solid glyphs
    pub fn zeroed(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut words = vec![];
        let mut len = 0usize;
        for bit in bits {
            if len % 64 == 0 {
                words.push(0u64);
            }
            if bit {
                words[len / 64] |= 1u64 << (63 - len % 64);
            }
            len += 1;
        }
        Self { words, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bit(&self, i: usize) -> bool {
        i < self.len && (self.words[i / 64] >> (63 - i % 64)) & 1 == 1
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Hamming distance. Unequal lengths mean the two hashes came from
    /// different configurations and is an error, never truncated.
    pub fn distance(&self, other: &PerceptualHash) -> Result<u32> {
        if self.len != other.len {
            return Err(PunkError::HashLengthMismatch {
                left: self.len,
                right: other.len,
            });
        }
        Ok(self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Fixed-width hex, `ceil(len / 4)` digits, zero padded on the left
    pub fn to_hex(&self) -> String {
        let digits = self.len.div_ceil(4);
        let mut s = String::with_capacity(digits);
        // pad the front so the last digit holds the last bit
        let pad = digits * 4 - self.len;
        let mut acc = 0u8;
        let mut n = pad;
        for i in 0..self.len {
            acc = (acc << 1) | self.bit(i) as u8;
            n += 1;
            if n == 4 {
                s.push(char::from_digit(acc as u32, 16).unwrap_or('0'));
                acc = 0;
                n = 0;
            }
        }
        s
    }

    pub fn from_hex(hex: &str, len: usize) -> Result<Self> {
        let digits = len.div_ceil(4);
        if hex.len() != digits {
            return Err(PunkError::HashLengthMismatch {
                left: hex.len() * 4,
                right: len,
            });
        }
        let pad = digits * 4 - len;
        let mut bits = Vec::with_capacity(digits * 4);
        for c in hex.chars() {
            let v = c
                .to_digit(16)
                .ok_or_else(|| PunkError::Serialize(format!("bad hex digit '{}'", c)))?;
            for shift in (0..4).rev() {
                bits.push((v >> shift) & 1 == 1);
            }
        }
        Ok(Self::from_bits(bits.into_iter().skip(pad)))
    }
}

#[derive(Serialize, Deserialize)]
struct HexHash {
    bits: usize,
    hex: String,
}

impl From<PerceptualHash> for HexHash {
    fn from(h: PerceptualHash) -> Self {
        HexHash {
            bits: h.len,
            hex: h.to_hex(),
        }
    }
}

impl TryFrom<HexHash> for PerceptualHash {
    type Error = PunkError;

    fn try_from(h: HexHash) -> Result<Self> {
        PerceptualHash::from_hex(&h.hex, h.bits)
    }
}

/// Stretch intensities so the darkest pixel becomes 0 and the brightest 255.
/// Flat images are returned unchanged.
pub fn normalize_contrast(img: &GrayImage) -> GrayImage {
    let (mut min, mut max) = (u8::MAX, 0u8);
    for p in img.pixels() {
        min = min.min(p[0]);
        max = max.max(p[0]);
    }
    if min >= max {
        return img.clone();
    }
    let range = (max - min) as u32;
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p[0] = (((p[0] - min) as u32 * 255 + range / 2) / range) as u8;
    }
    out
}

pub fn invert(img: &GrayImage) -> GrayImage {
    let mut out = img.clone();
    imageops::invert(&mut out);
    out
}

/// Average hash of a grayscale canvas
pub fn average_hash(img: &GrayImage, mode: HashMode) -> PerceptualHash {
    let stretched = normalize_contrast(img);
    let sampled = match mode {
        HashMode::Resized { size } if img.width() != size || img.height() != size => {
            imageops::resize(&stretched, size, size, FilterType::Lanczos3)
        }
        _ => stretched,
    };
    let n = sampled.width() as u64 * sampled.height() as u64;
    if n == 0 {
        return PerceptualHash::zeroed(0);
    }
    let sum: u64 = sampled.pixels().map(|p| p[0] as u64).sum();
    // p > sum / n, kept in integers
    PerceptualHash::from_bits(sampled.pixels().map(|p| p[0] as u64 * n > sum))
}

/// Hashes of a tile and of its color-inverted counterpart
pub fn tile_hash_pair(tile: &RgbImage, mode: HashMode) -> (PerceptualHash, PerceptualHash) {
    let gray = imageops::grayscale(tile);
    (average_hash(&gray, mode), average_hash(&invert(&gray), mode))
}
