// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Terminal rendering of a converted image with crossterm.
//!
//! The color strategy is picked once at startup. Palette terminals get
//! each RGB color quantized to the xterm 256 palette by CIEDE2000
//! distance.

use crate::matcher::Color;
use crate::pipeline::PunkResult;
use crossterm::{
    queue,
    style::{
        Attribute, Color as CColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
};
use deltae::*;
use lab::Lab;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    TrueColor,
    Ansi256,
    Mono,
}

impl ColorMode {
    pub fn detect() -> Self {
        let colorterm = std::env::var("COLORTERM").ok();
        let term = std::env::var("TERM").ok();
        Self::from_env(colorterm.as_deref(), term.as_deref())
    }

    pub fn from_env(colorterm: Option<&str>, term: Option<&str>) -> Self {
        if let Some(ct) = colorterm {
            let ct = ct.to_ascii_lowercase();
            if ct.contains("truecolor") || ct.contains("24bit") {
                return ColorMode::TrueColor;
            }
        }
        match term {
            None | Some("") | Some("dumb") => ColorMode::Mono,
            Some(_) => ColorMode::Ansi256,
        }
    }
}

/// RGB value of xterm palette entry `i`
pub fn ansi256_rgb(i: u8) -> Color {
    const SYSTEM: [Color; 16] = [
        [0, 0, 0],
        [128, 0, 0],
        [0, 128, 0],
        [128, 128, 0],
        [0, 0, 128],
        [128, 0, 128],
        [0, 128, 128],
        [192, 192, 192],
        [128, 128, 128],
        [255, 0, 0],
        [0, 255, 0],
        [255, 255, 0],
        [0, 0, 255],
        [255, 0, 255],
        [0, 255, 255],
        [255, 255, 255],
    ];
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    match i {
        0..=15 => SYSTEM[i as usize],
        16..=231 => {
            let c = i - 16;
            [
                LEVELS[(c / 36) as usize],
                LEVELS[(c / 6 % 6) as usize],
                LEVELS[(c % 6) as usize],
            ]
        }
        _ => {
            let g = 8 + (i - 232) * 10;
            [g, g, g]
        }
    }
}

pub fn color_distance(c1: Color, c2: Color) -> f32 {
    let l1 = Lab::from_rgb(&c1);
    let l2 = Lab::from_rgb(&c2);
    let lab1 = LabValue {
        l: l1.l,
        a: l1.a,
        b: l1.b,
    };
    let lab2 = LabValue {
        l: l2.l,
        a: l2.a,
        b: l2.b,
    };
    *DeltaE::new(&lab1, &lab2, DE2000).value()
}

/// Nearest palette entry. System colors 0..16 are skipped, terminals
/// theme them freely.
pub fn find_best_color(color: Color) -> u8 {
    let mut min_de = f32::MAX;
    let mut best_match = 16;
    for i in 16..=255u8 {
        let de = color_distance(color, ansi256_rgb(i));
        if de < min_de {
            min_de = de;
            best_match = i;
        }
    }
    best_match
}

/// Draws the transcript with the sampled colors. Rows end with a reset
/// and a newline. In mono mode inverted matches use reverse video, when
/// `invert_enabled`.
pub fn render<W: Write>(
    out: &mut W,
    result: &PunkResult,
    mode: ColorMode,
    invert_enabled: bool,
) -> std::io::Result<()> {
    let per_row = result.tiles_per_row.max(1) as usize;
    let mut palette: HashMap<Color, u8> = HashMap::new();
    let mut to_ccolor = |c: Color| -> CColor {
        match mode {
            ColorMode::TrueColor => CColor::Rgb {
                r: c[0],
                g: c[1],
                b: c[2],
            },
            _ => CColor::AnsiValue(*palette.entry(c).or_insert_with(|| find_best_color(c))),
        }
    };

    for row in result.matches.chunks(per_row) {
        for m in row {
            match mode {
                ColorMode::Mono => {
                    if invert_enabled && m.inverted {
                        queue!(
                            out,
                            SetAttribute(Attribute::Reverse),
                            Print(m.ch()),
                            SetAttribute(Attribute::NoReverse)
                        )?;
                    } else {
                        queue!(out, Print(m.ch()))?;
                    }
                }
                _ => {
                    let fg = to_ccolor(m.fg);
                    let bg = to_ccolor(m.bg);
                    queue!(
                        out,
                        SetForegroundColor(fg),
                        SetBackgroundColor(bg),
                        Print(m.ch())
                    )?;
                }
            }
        }
        queue!(out, ResetColor, SetAttribute(Attribute::Reset), Print("\n"))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchResult;

    fn result() -> PunkResult {
        let m = |index, code, inverted| MatchResult {
            index,
            code,
            inverted,
            score: 0,
            fg: [255, 0, 0],
            bg: [0, 0, 255],
        };
        PunkResult {
            tiles_per_row: 2,
            matches: vec![m(0, 0x41, false), m(1, 0x42, true), m(2, 0x43, false), m(3, 0x44, false)],
            anomalies: vec![],
        }
    }

    fn rendered(mode: ColorMode, invert: bool) -> String {
        let mut out = vec![];
        render(&mut out, &result(), mode, invert).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_detect() {
        assert_eq!(ColorMode::from_env(Some("truecolor"), Some("xterm")), ColorMode::TrueColor);
        assert_eq!(ColorMode::from_env(None, Some("xterm-256color")), ColorMode::Ansi256);
        assert_eq!(ColorMode::from_env(None, Some("dumb")), ColorMode::Mono);
        assert_eq!(ColorMode::from_env(None, None), ColorMode::Mono);
    }

    #[test]
    fn test_palette() {
        assert_eq!(ansi256_rgb(196), [255, 0, 0]);
        assert_eq!(ansi256_rgb(232), [8, 8, 8]);
        assert_eq!(find_best_color([255, 0, 0]), 196);
        assert_eq!(find_best_color([0, 0, 0]), 16);
        assert_eq!(find_best_color([255, 255, 255]), 231);
    }

    #[test]
    fn test_truecolor_output() {
        let s = rendered(ColorMode::TrueColor, true);
        assert!(s.contains("\x1b[38;2;255;0;0m"));
        assert!(s.contains("\x1b[48;2;0;0;255m"));
        assert_eq!(s.matches('\n').count(), 2);
    }

    #[test]
    fn test_mono_reverse_video() {
        let s = rendered(ColorMode::Mono, true);
        assert!(s.contains("\x1b[7mB"));
        assert!(!s.contains("38;"));
        let s = rendered(ColorMode::Mono, false);
        assert!(!s.contains("\x1b[7m"));
    }

    #[test]
    fn test_mono_dark_space_in_reverse_video() {
        let cat = crate::catalog::tests::test_catalog((8, 16), crate::hash::HashMode::Native);
        let matcher = crate::matcher::Matcher::new(&cat, false, image::Rgb([255, 255, 255]));
        let tile = crate::block::Tile {
            index: 0,
            col: 0,
            row: 0,
            x: 0,
            y: 0,
            image: image::RgbImage::from_pixel(8, 16, image::Rgb([0, 0, 0])),
        };
        let m = matcher.match_tile(&tile).unwrap();
        let result = PunkResult {
            tiles_per_row: 1,
            matches: vec![m],
            anomalies: vec![],
        };
        let mut out = vec![];
        render(&mut out, &result, ColorMode::Mono, true).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.starts_with("\x1b[7m\u{a0}"));

        let mut out = vec![];
        render(&mut out, &result, ColorMode::Mono, false).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with('\u{a0}'));
    }
}
