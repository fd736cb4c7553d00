// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Path helpers and filename parsing shared by the library and punkii.

use lazy_static::lazy_static;
use regex::Regex;
use std::{
    env,
    ffi::OsStr,
    fs::read_dir,
    io::{self, ErrorKind},
    path::{Path, PathBuf, MAIN_SEPARATOR},
};

lazy_static! {
    static ref NON_DIGIT: Regex = Regex::new(r"\D+").unwrap();
}

/// Walks up from the current dir to the first directory holding `flag_file`
pub fn get_project_root(flag_file: &str) -> io::Result<PathBuf> {
    let path = env::current_dir()?;
    for p in path.ancestors() {
        let mut entries = read_dir(p)?;
        if entries.any(|e| e.map(|e| e.file_name() == *flag_file).unwrap_or(false)) {
            return Ok(PathBuf::from(p));
        }
    }
    Err(io::Error::new(
        ErrorKind::NotFound,
        "Ran out of places to find flag_file",
    ))
}

/// Root of the workspace, where Cargo.lock lives. Falls back to ".".
/// A deployed punkii finds its log dir the same way, so ship a Cargo.lock
/// next to the binary.
pub fn get_root_path() -> String {
    match get_project_root("Cargo.lock") {
        Ok(p) => p.display().to_string(),
        Err(_) => ".".to_string(),
    }
}

pub fn get_abs_path(fpath: &str) -> String {
    if Path::new(fpath).is_relative() {
        format!("{}{}{}", get_root_path(), MAIN_SEPARATOR, fpath)
    } else {
        fpath.to_string()
    }
}

pub fn get_file_stem<P: AsRef<Path>>(fpath: P) -> String {
    fpath
        .as_ref()
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_string()
}

/// Row key for batch output: the digits of the file name, in order.
/// `punk-0042.png` gives `0042`.
pub fn image_id<P: AsRef<Path>>(fpath: P) -> String {
    NON_DIGIT
        .replace_all(&get_file_stem(fpath), "")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id() {
        assert_eq!(image_id("punks/punk-0042.png"), "0042");
        assert_eq!(image_id("7.png"), "7");
        assert_eq!(image_id("a1b2c3.png"), "123");
        assert_eq!(image_id("cover.png"), "");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(get_file_stem("/tmp/x/9608.png"), "9608");
        assert_eq!(get_abs_path("/abs/path"), "/abs/path");
        assert!(get_abs_path("log/punkii.log").ends_with("log/punkii.log"));
    }
}
