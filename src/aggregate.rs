// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Batch mode: converts every PNG in a directory and folds the results
//! into one frequency row per image.
//!
//! Images are converted in parallel on the pipeline's worker pool; rows
//! are appended afterwards in file name order, so the table does not
//! depend on scheduling. A bad image only costs its own row.

use crate::catalog::GlyphCatalog;
use crate::config::PunkConfig;
use crate::error::{PunkError, Result};
use crate::matcher::MatchResult;
use crate::pipeline::{Pipeline, PunkResult};
use crate::util::image_id;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-image glyph counts, one slot per catalog glyph in catalog order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    codes: Vec<u32>,
    counts: Vec<u32>,
}

impl FrequencyTable {
    pub fn new(catalog: &GlyphCatalog) -> Self {
        let codes = catalog.codes();
        let counts = vec![0; codes.len()];
        Self { codes, counts }
    }

    pub fn add(&mut self, code: u32) {
        // codes are sorted, catalog order is ascending code point
        if let Ok(i) = self.codes.binary_search(&code) {
            self.counts[i] += 1;
        }
    }

    pub fn add_all(&mut self, matches: &[MatchResult]) {
        for m in matches {
            self.add(m.code);
        }
    }

    pub fn get(&self, code: u32) -> u32 {
        self.codes
            .binary_search(&code)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn into_counts(self) -> Vec<u32> {
        self.counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// digits of the file name
    pub id: String,
    pub frequencies: Vec<u32>,
    pub mutant: bool,
}

impl BatchRow {
    pub fn new(id: String, catalog: &GlyphCatalog, result: &PunkResult) -> Self {
        let mut table = FrequencyTable::new(catalog);
        table.add_all(&result.matches);
        debug!("{}: {} of {} tiles counted", id, table.total(), result.matches.len());
        Self {
            id,
            frequencies: table.into_counts(),
            mutant: result.has_mutant(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: PunkError,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    /// `Character\nID`, one glyph per catalog entry, `MUTANT`
    pub header: Vec<String>,
    pub rows: Vec<BatchRow>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn new(catalog: &GlyphCatalog) -> Self {
        let mut header = vec!["Character\nID".to_string()];
        header.extend(catalog.glyphs().map(|g| g.ch().to_string()));
        header.push("MUTANT".to_string());
        Self {
            header,
            rows: vec![],
            failures: vec![],
        }
    }

    pub fn write_csv<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        write_record(w, self.header.iter().map(String::as_str))?;
        for row in &self.rows {
            let mut fields = Vec::with_capacity(row.frequencies.len() + 2);
            fields.push(row.id.clone());
            fields.extend(row.frequencies.iter().map(|f| f.to_string()));
            fields.push(if row.mutant { "1" } else { "0" }.to_string());
            write_record(w, fields.iter().map(String::as_str))?;
        }
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_csv(&mut file)?;
        file.flush()?;
        Ok(())
    }
}

fn quote(field: &str) -> String {
    if field.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record<'s, W, I>(w: &mut W, fields: I) -> std::io::Result<()>
where
    W: Write,
    I: Iterator<Item = &'s str>,
{
    let line: Vec<String> = fields.map(quote).collect();
    write!(w, "{}\r\n", line.join(","))
}

/// `*.png` files of `dir`, sorted by file name
pub fn png_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if path.is_file() && is_png {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Converts every PNG in `dir`. Validation errors go to `failures` and
/// the sweep moves on; configuration errors abort. Once `cancel` is set,
/// images not yet started are recorded as cancelled.
pub fn run_batch<P: AsRef<Path>>(
    dir: P,
    catalog: &GlyphCatalog,
    cfg: &PunkConfig,
    cancel: &AtomicBool,
) -> Result<BatchReport> {
    let pipeline = Pipeline::new(catalog, cfg)?;
    let files = png_files(dir.as_ref())?;
    info!(
        "batch: {} images of {} tiles in {}",
        files.len(),
        cfg.tile_count(),
        dir.as_ref().display()
    );

    let results: Vec<Result<PunkResult>> = pipeline.pool().install(|| {
        files
            .par_iter()
            .map(|path| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(PunkError::Cancelled);
                }
                pipeline.convert_file(path)
            })
            .collect()
    });

    let mut report = BatchReport::new(catalog);
    for (path, result) in files.into_iter().zip(results) {
        match result {
            Ok(r) => report.rows.push(BatchRow::new(image_id(&path), catalog, &r)),
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                warn!("skip {}: {}", path.display(), e);
                report.failures.push(BatchFailure { path, error: e });
            }
        }
    }
    info!(
        "batch done: {} rows, {} failures",
        report.rows.len(),
        report.failures.len()
    );
    Ok(report)
}
