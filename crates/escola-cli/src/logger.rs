// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File-backed diagnostic log. The TUI owns the terminal, so everything
//! routed through the `log` facade lands in `escola.log` under the data
//! directory instead of stderr.

use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

static LOGGER: OnceLock<FileLogger> = OnceLock::new();

struct FileLogger {
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        if let Ok(mut file) = self.file.lock() {
            // A failed diagnostic write has nowhere left to report itself.
            let _ = writeln!(
                file,
                "{timestamp} {:5} {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

pub fn default_log_path() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set XDG_DATA_HOME or platform equivalent")
    })?;
    let app_dir = data_root.join(escola_store::APP_NAME);
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("escola.log"))
}

pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let logger = LOGGER.get_or_init(|| FileLogger {
        file: Mutex::new(file),
    });
    log::set_logger(logger).map_err(|_| anyhow!("logger already installed"))?;
    log::set_max_level(LevelFilter::Info);
    Ok(())
}
