// RustPixel
// copyright zipxing@hotmail.com 2022～2025
//
// punkii: converts pixel-art punks into glyph text
//
// punkii --font font.ttf --catalog glyphs.json punk-0042.png
// punkii --catalog glyphs.json --batch punks/ --csv punks.csv

use clap::Parser;
use log::{info, LevelFilter};
use punk_text::aggregate::run_batch;
use punk_text::catalog::{dir::catalog_from_dir, font::FontRasterizer};
use punk_text::log::init_log;
use punk_text::pipeline::Pipeline;
use punk_text::term::{render, ColorMode};
use punk_text::util::{get_file_stem, get_root_path};
use punk_text::{GlyphCatalog, PunkConfig, PunkError, ResizePolicy, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

#[derive(Parser, Debug)]
#[command(name = "punkii", version, about = "Convert pixel-art punks into glyph text")]
struct Cli {
    /// Image to convert (ignored with --batch)
    image: Option<PathBuf>,

    /// Convert every PNG in this directory into one CSV table
    #[arg(short = 'b', long = "batch")]
    batch: Option<PathBuf>,

    /// TTF/OTF font rendered into the glyph catalog
    #[arg(short = 'f', long = "font")]
    font: Option<PathBuf>,

    /// Directory of pre-rendered glyph PNGs named by code point
    #[arg(short = 'g', long = "glyph-dir")]
    glyph_dir: Option<PathBuf>,

    /// Glyph catalog cache, loaded when present, written otherwise
    #[arg(short = 'c', long = "catalog")]
    catalog: Option<PathBuf>,

    /// TOML run configuration
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Where to write <id>.txt and <id>.json (default: next to the image)
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Batch CSV path (default: <batch dir>/punks.csv)
    #[arg(long = "csv")]
    csv: Option<PathBuf>,

    /// No reverse video for inverted matches in mono output
    #[arg(long = "noinvert")]
    noinvert: bool,

    /// Dump tiles to punk-blocks/ and glyph canvases to font-blocks/
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Native resolution hashing with the strict threshold
    #[arg(long = "optimize")]
    optimize: bool,

    /// Solid tiles off the main background become full blocks
    #[arg(long = "full-blocks")]
    full_blocks: bool,

    /// Wrong-size images: reject, quality or nearest
    #[arg(long = "resize", value_parser = parse_resize)]
    resize: Option<ResizePolicy>,

    /// Worker threads, 0 = one per cpu
    #[arg(short = 'j', long = "workers")]
    workers: Option<usize>,

    /// Log level written to log/punkii.log
    #[arg(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
}

fn parse_resize(s: &str) -> std::result::Result<ResizePolicy, String> {
    match s.to_ascii_lowercase().as_str() {
        "reject" => Ok(ResizePolicy::Reject),
        "quality" => Ok(ResizePolicy::Quality),
        "nearest" => Ok(ResizePolicy::Nearest),
        other => Err(format!("unknown resize policy '{}'", other)),
    }
}

fn load_config(cli: &Cli) -> Result<PunkConfig> {
    let mut cfg = match &cli.config {
        Some(p) => PunkConfig::from_toml_file(p)?,
        None => PunkConfig::default(),
    };
    if cli.noinvert {
        cfg.invert_enabled = false;
    }
    cfg.debug |= cli.debug;
    cfg.optimize |= cli.optimize;
    cfg.match_full_blocks |= cli.full_blocks;
    if let Some(r) = cli.resize {
        cfg.resize = r;
    }
    if let Some(w) = cli.workers {
        cfg.workers = w;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn load_catalog(cli: &Cli, cfg: &PunkConfig) -> Result<GlyphCatalog> {
    if let Some(cache) = cli.catalog.as_ref().filter(|p| p.exists()) {
        info!("loading glyph catalog {}", cache.display());
        let cat = GlyphCatalog::load(cache)?;
        cat.check_compatible(cfg)?;
        return Ok(cat);
    }

    let cat = if let Some(dir) = &cli.glyph_dir {
        catalog_from_dir(dir, cfg)?
    } else if let Some(font) = &cli.font {
        let raster = FontRasterizer::from_file(font, cfg.font_size, cfg.tile_size())?;
        let cat = raster.build_catalog(cfg.codepoint_start, cfg.codepoint_end, cfg)?;
        if cfg.debug {
            dump_font_blocks(&raster, &cat)?;
        }
        cat
    } else {
        return Err(PunkError::InvalidConfig(
            "no glyph source, give --font, --glyph-dir or an existing --catalog".into(),
        ));
    };

    if let Some(cache) = &cli.catalog {
        cat.save(cache)?;
        info!("glyph catalog saved to {}", cache.display());
    }
    Ok(cat)
}

fn dump_font_blocks(raster: &FontRasterizer, cat: &GlyphCatalog) -> Result<()> {
    let dir = Path::new("font-blocks");
    std::fs::create_dir_all(dir)?;
    for g in cat.glyphs().filter(|g| !g.is_reserved()) {
        raster.render(g.code).save(dir.join(format!("{}.png", g.code)))?;
    }
    Ok(())
}

fn convert_one(path: &Path, cli: &Cli, cat: &GlyphCatalog, cfg: &PunkConfig) -> Result<()> {
    let pipeline = Pipeline::new(cat, cfg)?;
    let img = image::open(path)?;
    let (rgb, tiles) = pipeline.tiles(&img)?;
    if cfg.debug {
        let dir = Path::new("punk-blocks");
        std::fs::create_dir_all(dir)?;
        for t in &tiles {
            t.image.save(dir.join(format!("{}.png", t.number())))?;
        }
    }
    let result = pipeline.convert_tiles(&rgb, &tiles)?;

    let mut stdout = std::io::stdout();
    render(&mut stdout, &result, ColorMode::detect(), cfg.invert_enabled)?;

    let out_dir = match &cli.out {
        Some(d) => d.clone(),
        None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let stem = get_file_stem(path);
    result.save(&out_dir, &stem)?;

    let warnings = result.warnings();
    if !warnings.is_empty() {
        println!("\nWarning/Error:");
        for w in warnings {
            println!("{}", w);
        }
    }
    Ok(())
}

fn batch(dir: &Path, cli: &Cli, cat: &GlyphCatalog, cfg: &PunkConfig) -> Result<()> {
    let cancel = AtomicBool::new(false);
    let report = run_batch(dir, cat, cfg, &cancel)?;
    let csv = cli.csv.clone().unwrap_or_else(|| dir.join("punks.csv"));
    report.save_csv(&csv)?;
    println!("{} rows written to {}", report.rows.len(), csv.display());
    let mutants = report.rows.iter().filter(|r| r.mutant).count();
    if mutants > 0 {
        println!("{} images with mutant blocks", mutants);
    }
    for f in &report.failures {
        eprintln!("skipped {}: {}", f.path.display(), f.error);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let cfg = load_config(cli)?;
    let cat = load_catalog(cli, &cfg)?;
    match (&cli.batch, &cli.image) {
        (Some(dir), _) => batch(dir, cli, &cat, &cfg),
        (None, Some(image)) => convert_one(image, cli, &cat, &cfg),
        (None, None) => Err(PunkError::InvalidConfig(
            "nothing to do, give an image or --batch <dir>".into(),
        )),
    }
}

fn main() {
    let cli = Cli::parse();
    let log_dir = Path::new(&get_root_path()).join("log");
    if std::fs::create_dir_all(&log_dir).is_ok() {
        if let Err(e) = init_log(cli.log_level, "log/punkii.log") {
            eprintln!("punkii: logging disabled: {}", e);
        }
    }
    if let Err(e) = run(&cli) {
        eprintln!("punkii: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "punkii",
            "--noinvert",
            "--full-blocks",
            "--resize",
            "Nearest",
            "-j",
            "1",
            "punk.png",
        ]);
        let cfg = load_config(&cli).unwrap();
        assert!(!cfg.invert_enabled);
        assert!(cfg.match_full_blocks);
        assert_eq!(cfg.resize, ResizePolicy::Nearest);
        assert_eq!(cfg.workers, 1);
        assert_eq!(cli.image, Some(PathBuf::from("punk.png")));
    }

    #[test]
    fn test_no_glyph_source() {
        let cli = Cli::parse_from(["punkii", "punk.png"]);
        let cfg = load_config(&cli).unwrap();
        let err = load_catalog(&cli, &cfg).unwrap_err();
        assert!(err.is_configuration());
    }
}
