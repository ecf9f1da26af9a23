// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use sesh_app::{EntityKind, ListeningDataset, Mode, TableId, YearScope};
use sesh_db::{load_history_dir, read_history_file};
use sesh_testkit::{ListeningFaker, stream_record, temp_history_dir, write_history_file};
use std::fs;
use time::macros::date;

#[test]
fn missing_directory_is_an_error() {
    let error = load_history_dir(std::path::Path::new("/definitely/not/here"))
        .expect_err("missing dir should fail");
    assert!(error.to_string().contains("does not exist"));
}

#[test]
fn loads_every_json_file_in_name_order() -> Result<()> {
    let mut faker = ListeningFaker::new(11);
    let dir = tempfile::tempdir()?;
    let first = faker.history_in_year(2021, 12);
    let second = faker.history_in_year(2022, 8);
    write_history_file(dir.path(), "Streaming_History_Audio_2022.json", &second)?;
    write_history_file(dir.path(), "Streaming_History_Audio_2021.json", &first)?;
    fs::write(dir.path().join("notes.txt"), "not history")?;

    let load = load_history_dir(dir.path())?;
    assert_eq!(load.files_read.len(), 2);
    assert!(load.files_skipped.is_empty());
    assert_eq!(load.records.len(), 20);
    assert_eq!(load.records[..12], first[..]);
    Ok(())
}

#[test]
fn malformed_and_foreign_files_are_skipped() -> Result<()> {
    let mut faker = ListeningFaker::new(12);
    let good = faker.history_in_year(2023, 5);
    let dir = temp_history_dir(&good)?;

    fs::write(dir.path().join("broken.json"), "[{\"ts\": ")?;
    fs::write(dir.path().join("object.json"), "{\"ts\": \"2020-01-01T00:00:00Z\"}")?;
    let junk = (0..10).map(|_| faker.junk_entry()).collect::<Vec<_>>();
    fs::write(
        dir.path().join("podcasts.json"),
        serde_json::to_string(&junk)?,
    )?;

    let load = load_history_dir(dir.path())?;
    assert_eq!(load.records, good);
    assert_eq!(load.files_read.len(), 1);
    assert_eq!(load.files_skipped.len(), 3);
    Ok(())
}

#[test]
fn structure_check_tolerates_a_few_foreign_entries() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut entries = (0..8)
        .map(|hour| {
            serde_json::to_value(stream_record(
                &format!("2020-02-02T{hour:02}:00:00Z"),
                "Air",
                "Sexy Boy",
                60_000,
            ))
        })
        .collect::<serde_json::Result<Vec<_>>>()?;
    entries.push(serde_json::json!({ "platform": "web" }));
    entries.push(serde_json::json!("noise"));
    let path = dir.path().join("mixed.json");
    fs::write(&path, serde_json::to_string(&entries)?)?;

    let records = read_history_file(&path)?.unwrap_or_default();
    // The object without fields still deserializes; the bare string does not.
    assert_eq!(records.len(), 9);
    Ok(())
}

#[test]
fn loaded_history_feeds_dataset_tables() -> Result<()> {
    let mut faker = ListeningFaker::new(13);
    let mut records = faker.history_in_year(2024, 60);
    records.extend(faker.repeat_play(date!(2023 - 08 - 15), "Tricky", "Overcome", 3));
    let dir = temp_history_dir(&records)?;

    let load = load_history_dir(dir.path())?;
    let dataset = ListeningDataset::from_records(&load.records, 20_000);
    assert_eq!(dataset.years(), vec![2023, 2024]);

    let rows = dataset.ranked_rows(
        TableId::new(EntityKind::Track, YearScope::Year(2023)),
        Mode::Playcount,
    )?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cells()[1], "Overcome - Tricky");
    assert_eq!(rows[0].cells()[2], "3");

    let entries = dataset.on_this_day().get("08-15").cloned().unwrap_or_default();
    assert_eq!(entries.len(), 1);
    Ok(())
}
