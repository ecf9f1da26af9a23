// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to `path` so the alternate screen stays clean.
/// `RUST_LOG` wins over `level`. Returns `false` when a subscriber was
/// already installed and this one was discarded.
pub fn init(level: &str, path: &Path) -> Result<bool> {
    let file = open_log_file(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(true),
        Err(error) => {
            debug!(%error, log = %path.display(), "tracing subscriber already installed");
            Ok(false)
        }
    }
}

fn open_log_file(path: &Path) -> Result<File> {
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
        .with_context(|| {
            format!(
                "open log file {}; set [logging].file to a writable path",
                path.display()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::{init, open_log_file};
    use anyhow::Result;

    #[test]
    fn log_file_and_parent_are_created() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("sesh.log");
        init("info", &path)?;
        assert!(path.is_file());
        Ok(())
    }

    #[test]
    fn second_init_reports_existing_subscriber() -> Result<()> {
        let temp = tempfile::tempdir()?;
        init("info", &temp.path().join("first.log"))?;
        let second = temp.path().join("second.log");
        assert!(!init("debug", &second)?);
        assert!(second.is_file());
        Ok(())
    }

    #[test]
    fn unwritable_log_path_is_actionable() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let error = open_log_file(temp.path()).expect_err("directory is not a log file");
        assert!(error.to_string().contains("[logging].file"));
        Ok(())
    }
}
