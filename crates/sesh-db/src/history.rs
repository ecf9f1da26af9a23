// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use serde_json::Value;
use sesh_app::StreamRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SAMPLE_SIZE: usize = 10;
const REQUIRED_FIELDS: [&str; 2] = ["ts", "ms_played"];
/// Share of sampled entries that must carry every required field.
const MIN_VALID_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLoad {
    pub records: Vec<StreamRecord>,
    pub files_read: Vec<PathBuf>,
    pub files_skipped: Vec<PathBuf>,
}

/// Reads every `*.json` export file in `dir`, skipping files that do not look
/// like streaming history.
pub fn load_history_dir(dir: &Path) -> Result<HistoryLoad> {
    if !dir.is_dir() {
        bail!(
            "history directory {} does not exist; pass --input or set history.input_dir",
            dir.display()
        );
    }

    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("read history directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "json")
        })
        .collect::<Vec<_>>();
    paths.sort();

    if paths.is_empty() {
        warn!(dir = %dir.display(), "no JSON files found in history directory");
    }

    let mut load = HistoryLoad::default();
    for path in paths {
        match read_history_file(&path) {
            Ok(Some(records)) => {
                debug!(file = %path.display(), entries = records.len(), "read history file");
                load.records.extend(records);
                load.files_read.push(path);
            }
            Ok(None) => {
                warn!(file = %path.display(), "file has invalid data structure, skipping");
                load.files_skipped.push(path);
            }
            Err(error) => {
                warn!(file = %path.display(), error = %format!("{error:#}"), "cannot read history file, skipping");
                load.files_skipped.push(path);
            }
        }
    }

    info!(
        files = load.files_read.len(),
        skipped = load.files_skipped.len(),
        entries = load.records.len(),
        "loaded listening history"
    );
    Ok(load)
}

/// `Ok(None)` when the file parses but fails the structure check.
pub fn read_history_file(path: &Path) -> Result<Option<Vec<StreamRecord>>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&raw).with_context(|| format!("parse JSON in {}", path.display()))?;
    let Value::Array(entries) = value else {
        bail!("{} must contain a JSON array of entries", path.display());
    };
    if !looks_like_history(&entries) {
        return Ok(None);
    }

    let decoded = decode_records(entries);
    if decoded.dropped > 0 {
        debug!(
            file = %path.display(),
            dropped = decoded.dropped,
            first_error = decoded.first_error.as_deref().unwrap_or_default(),
            "dropped entries that are not stream records"
        );
    }
    let records = decoded.records;
    Ok(Some(records))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedEntries {
    pub records: Vec<StreamRecord>,
    pub dropped: usize,
    /// Serde error of the first dropped entry, prefixed with its index.
    pub first_error: Option<String>,
}

pub fn decode_records(entries: Vec<Value>) -> DecodedEntries {
    let mut decoded = DecodedEntries::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StreamRecord>(entry) {
            Ok(record) => decoded.records.push(record),
            Err(error) => {
                decoded.dropped += 1;
                decoded
                    .first_error
                    .get_or_insert_with(|| format!("entry {index}: {error}"));
            }
        }
    }
    decoded
}

/// True when enough of the first entries are objects with `ts` and `ms_played`.
pub fn looks_like_history(entries: &[Value]) -> bool {
    if entries.is_empty() {
        return false;
    }
    let sample = &entries[..entries.len().min(SAMPLE_SIZE)];
    let valid = sample
        .iter()
        .filter(|entry| {
            entry
                .as_object()
                .is_some_and(|object| REQUIRED_FIELDS.iter().all(|field| object.contains_key(*field)))
        })
        .count();
    valid as f64 / sample.len() as f64 >= MIN_VALID_RATIO
}
