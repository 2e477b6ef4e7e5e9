//! Diagnostic log file.
//!
//! Console output goes through the `info!`/`success!`/`warning!`/`error!`
//! macros. Everything else, including per-track resolution failures, is
//! recorded with `tracing` into a timestamped file under the data directory.
//! `RUST_LOG` overrides the default `tuneport=info` filter.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use chrono::Local;
use tracing_subscriber::EnvFilter;

use crate::{Res, config};

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

pub fn init() -> Res<PathBuf> {
    let dir = config::data_dir().join("log");
    fs::create_dir_all(&dir)?;

    let path = dir.join(format!(
        "tuneport-{}.log",
        Local::now().format("%Y-%m-%dT%H-%M-%S")
    ));
    let file = File::create(&path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tuneport=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()?;

    let _ = LOG_FILE.set(path.clone());
    Ok(path)
}

/// Path of the current run's log file, once [`init`] succeeded.
pub fn log_file() -> Option<&'static Path> {
    LOG_FILE.get().map(PathBuf::as_path)
}
