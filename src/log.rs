// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Log module sets up file logging, reference
//! https://docs.rs/log4rs

use crate::error::{PunkError, Result};
use crate::util::get_abs_path;
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

/// init logs system, relative paths are taken from the workspace root
pub fn init_log(level: LevelFilter, file_path: &str) -> Result<()> {
    let fpstr = get_abs_path(file_path);
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l} {t} {m}{n}",
        )))
        .build(&fpstr)?;
    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("logfile", Box::new(logfile)),
        )
        .build(Root::builder().appender("logfile").build(level))
        .map_err(|e| PunkError::InvalidConfig(format!("log config: {}", e)))?;
    log4rs::init_config(config)
        .map_err(|e| PunkError::InvalidConfig(format!("logger: {}", e)))?;
    Ok(())
}
