// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SHOPDECK_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Headless runs write next to their output.
    Stderr,
    /// The TUI owns the terminal, so interactive runs append to a file.
    File(PathBuf),
}

/// `SHOPDECK_LOG` wins over the configured level when it parses.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(level: &str, target: &LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true);

    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| anyhow!("initialize logging: {error}"))?,
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|error| anyhow!("initialize logging: {error}"))?;
        }
    }

    tracing::debug!(log_level = level, ?target, "logging initialized");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}
