use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use punk_text::{convert, GlyphCatalog, PunkConfig, PunkError, ResizePolicy, SPACE};

const LEFT_HALF: u32 = 0x258C;
const TOP_HALF: u32 = 0x2580;

fn square_config() -> PunkConfig {
    PunkConfig {
        tile_width: 80,
        tile_height: 80,
        ..Default::default()
    }
}

fn catalog(cfg: &PunkConfig) -> GlyphCatalog {
    let (w, h) = cfg.tile_size();
    let left = GrayImage::from_fn(w, h, |x, _| Luma([if x < w / 2 { 0 } else { 255 }]));
    let top = GrayImage::from_fn(w, h, |_, y| Luma([if y < h / 2 { 0 } else { 255 }]));
    GlyphCatalog::from_canvases(
        "synthetic",
        cfg.tile_size(),
        cfg.hash_mode(),
        cfg.sample_nudge,
        vec![(LEFT_HALF, left), (TOP_HALF, top)],
    )
    .expect("Failed to build catalog")
}

#[test]
fn test_all_white_image_is_all_spaces() {
    let cfg = square_config();
    let cat = catalog(&cfg);
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1280, 1280, Rgb([255, 255, 255])));

    let result = convert(&img, &cat, &cfg).expect("conversion failed");

    assert_eq!(result.matches.len(), 256);
    assert!(result.matches.iter().all(|m| m.code == SPACE && m.score == 0));
    assert!(result.anomalies.is_empty());

    let text = result.transcript();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 16);
    for row in rows {
        assert_eq!(row.chars().count(), 16);
        assert!(row.chars().all(|c| c == '\u{a0}'));
    }
    assert!(text.ends_with('\n'));
}

#[test]
fn test_split_tile_matches_half_block() {
    let cfg = square_config();
    let cat = catalog(&cfg);
    // tile 1 is black on the left half, everything else white
    let img = RgbImage::from_fn(1280, 1280, |x, y| {
        if x < 40 && y < 80 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });

    let result = convert(&DynamicImage::ImageRgb8(img), &cat, &cfg).expect("conversion failed");

    let first = &result.matches[0];
    assert_eq!(first.code, LEFT_HALF);
    assert!(!first.inverted);
    assert_eq!(first.score, 0);
    assert_eq!(first.fg, [0, 0, 0]);
    assert_eq!(first.bg, [255, 255, 255]);
    assert!(!result.has_mutant());
    assert!(result.anomalies.is_empty());
    assert!(result.transcript().starts_with('\u{258c}'));

    let meta = result.metadata();
    assert_eq!(meta.pallet, vec!["#000000", "#ffffff"]);
    assert_eq!(meta.fg_colors[0], 0);
    assert_eq!(meta.bg_colors[0], 1);
    assert_eq!(meta.fg_colors.len(), 256);
}

#[test]
fn test_inverted_split_and_full_blocks() {
    let cfg = PunkConfig {
        match_full_blocks: true,
        ..square_config()
    };
    let cat = catalog(&cfg);
    // tile 1: white top over red bottom; tile 2: solid red
    let red = Rgb([200, 0, 0]);
    let img = RgbImage::from_fn(1280, 1280, |x, y| match (x / 80, y / 80) {
        (0, 0) if y >= 40 => red,
        (1, 0) => red,
        _ => Rgb([255, 255, 255]),
    });

    let result = convert(&DynamicImage::ImageRgb8(img), &cat, &cfg).expect("conversion failed");

    assert_eq!(result.matches[0].code, TOP_HALF);
    assert!(result.matches[0].inverted);
    assert_eq!(result.matches[0].fg, [255, 255, 255]);
    assert_eq!(result.matches[0].bg, [200, 0, 0]);
    assert_eq!(result.matches[1].code, punk_text::FULL_BLOCK);
    assert_eq!(result.matches[2].code, SPACE);
    assert!(result.anomalies.is_empty());
}

#[test]
fn test_wrong_dimensions_rejected_unless_resizing() {
    let cfg = square_config();
    let cat = catalog(&cfg);
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 640, Rgb([255, 255, 255])));

    let err = convert(&img, &cat, &cfg).unwrap_err();
    assert_eq!(err.to_string(), "image is 640x640, please supply the 1280x1280 image");
    assert!(matches!(err, PunkError::InvalidDimensions { .. }));

    let resizing = PunkConfig {
        resize: ResizePolicy::Nearest,
        ..square_config()
    };
    let result = convert(&img, &cat, &resizing).expect("resized conversion failed");
    assert_eq!(result.matches.len(), 256);
}
