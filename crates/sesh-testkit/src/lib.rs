// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use sesh_app::StreamRecord;
use std::fs;
use std::path::{Path, PathBuf};
use time::{Date, Duration, Month};

/// (artist, album, tracks) triples the faker draws from.
const CATALOG: [(&str, &str, &[&str]); 8] = [
    ("Radiohead", "OK Computer", &["Airbag", "Paranoid Android", "Karma Police", "No Surprises"]),
    ("Portishead", "Dummy", &["Mysterons", "Sour Times", "Roads", "Glory Box"]),
    ("Massive Attack", "Mezzanine", &["Angel", "Teardrop", "Inertia Creeps"]),
    ("Bjork", "Homogenic", &["Hunter", "Joga", "Bachelorette"]),
    ("Air", "Moon Safari", &["La Femme d'Argent", "Sexy Boy", "Kelly Watch the Stars"]),
    ("Moby", "Play", &["Honey", "Porcelain", "Natural Blues", "Why Does My Heart Feel So Bad?"]),
    ("Tricky", "Maxinquaye", &["Overcome", "Hell Is Round the Corner", "Aftermath"]),
    ("Boards of Canada", "Music Has the Right to Children", &["Wildlife Analysis", "Roygbiv", "Aquarius"]),
];

/// Plays shorter than this never count toward play counts.
const SHORT_PLAY_MS: i64 = 5_000;
const MIN_FULL_PLAY_MS: i64 = 45_000;
const MAX_FULL_PLAY_MS: i64 = 420_000;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Deterministic streaming-history generator for tests.
#[derive(Debug, Clone)]
pub struct ListeningFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl ListeningFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// One play of a random catalog track on `date`. Roughly one in eight
    /// plays is a short skip.
    pub fn play_on(&mut self, date: Date) -> StreamRecord {
        let (artist, album, tracks) = CATALOG[self.rng.int_n(CATALOG.len())];
        let track = tracks[self.rng.int_n(tracks.len())];
        let skipped = self.rng.int_n(8) == 0;
        let ms_played = if skipped {
            self.int_range_i64(1, SHORT_PLAY_MS)
        } else {
            self.int_range_i64(MIN_FULL_PLAY_MS, MAX_FULL_PLAY_MS)
        };
        let mut record = stream_record(&self.timestamp_on(date), artist, track, ms_played);
        record.master_metadata_album_album_name = Some(album.to_owned());
        record.skipped = Some(skipped);
        record.offline = Some(self.rng.int_n(10) == 0);
        record
    }

    /// `count` plays spread over the calendar days of `year`.
    pub fn history_in_year(&mut self, year: i32, count: usize) -> Vec<StreamRecord> {
        let start = calendar_date(year, Month::January, 1);
        let days = if time::util::is_leap_year(year) { 366 } else { 365 };
        self.history_between(start, days, count)
    }

    pub fn history_between(&mut self, start: Date, days: usize, count: usize) -> Vec<StreamRecord> {
        (0..count)
            .map(|_| {
                let offset = self.rng.int_n(days.max(1)) as i64;
                self.play_on(start + Duration::days(offset))
            })
            .collect()
    }

    /// `times` full-length plays of the same track on one day.
    pub fn repeat_play(
        &mut self,
        date: Date,
        artist: &str,
        track: &str,
        times: usize,
    ) -> Vec<StreamRecord> {
        (0..times)
            .map(|_| {
                let ms = self.int_range_i64(MIN_FULL_PLAY_MS, MAX_FULL_PLAY_MS);
                stream_record(&self.timestamp_on(date), artist, track, ms)
            })
            .collect()
    }

    /// A record that lacks the fields the loader samples for.
    pub fn junk_entry(&mut self) -> serde_json::Value {
        if self.rng.bool() {
            serde_json::json!({ "platform": "web", "conn_country": "US" })
        } else {
            serde_json::json!({ "episode_name": "Untitled", "ms_played": 1200 })
        }
    }

    fn timestamp_on(&mut self, date: Date) -> String {
        let hour = self.rng.int_n(24);
        let minute = self.rng.int_n(60);
        let second = self.rng.int_n(60);
        format!(
            "{:04}-{:02}-{:02}T{hour:02}:{minute:02}:{second:02}Z",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

pub fn stream_record(ts: &str, artist: &str, track: &str, ms_played: i64) -> StreamRecord {
    StreamRecord {
        ts: Some(ts.to_owned()),
        ms_played: Some(ms_played),
        master_metadata_album_artist_name: Some(artist.to_owned()),
        master_metadata_track_name: Some(track.to_owned()),
        master_metadata_album_album_name: Some(format!("{track} (Single)")),
        skipped: Some(false),
        offline: Some(false),
    }
}

pub fn write_history_file(dir: &Path, name: &str, records: &[StreamRecord]) -> Result<PathBuf> {
    let path = dir.join(name);
    let body = serde_json::to_string_pretty(records).context("serialize history records")?;
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Temp directory holding `records` as a single export file.
pub fn temp_history_dir(records: &[StreamRecord]) -> Result<tempfile::TempDir> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    write_history_file(dir.path(), "Streaming_History_Audio_0.json", records)?;
    Ok(dir)
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("sesh.db");
    Ok((dir, db_path))
}

pub fn catalog_artists() -> Vec<&'static str> {
    CATALOG.iter().map(|(artist, _, _)| *artist).collect()
}

fn calendar_date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).expect("valid calendar date")
}

#[cfg(test)]
mod tests {
    use super::{ListeningFaker, catalog_artists, temp_history_dir};
    use sesh_app::StreamRecord;
    use std::collections::BTreeSet;
    use time::macros::date;

    #[test]
    fn new_deterministic_seed() {
        let mut left = ListeningFaker::new(42);
        let mut right = ListeningFaker::new(42);
        assert_eq!(left.history_in_year(2023, 20), right.history_in_year(2023, 20));
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(ListeningFaker::new(0).seed(), 1);
    }

    #[test]
    fn plays_stay_inside_the_year() {
        let mut faker = ListeningFaker::new(7);
        for record in faker.history_in_year(2024, 200) {
            let ts = record.ts.unwrap_or_default();
            assert!(ts.starts_with("2024-"), "{ts}");
            assert!(record.ms_played.unwrap_or_default() > 0);
        }
    }

    #[test]
    fn plays_cover_several_artists() {
        let mut faker = ListeningFaker::new(3);
        let artists = faker
            .history_in_year(2022, 100)
            .into_iter()
            .filter_map(|record| record.master_metadata_album_artist_name)
            .collect::<BTreeSet<_>>();
        assert!(artists.len() > 3);
        assert!(artists.iter().all(|artist| catalog_artists().contains(&artist.as_str())));
    }

    #[test]
    fn repeat_play_uses_one_day_and_track() {
        let mut faker = ListeningFaker::new(9);
        let plays = faker.repeat_play(date!(2021 - 06 - 21), "Air", "Sexy Boy", 4);
        assert_eq!(plays.len(), 4);
        assert!(plays.iter().all(|record| {
            record.ts.as_deref().is_some_and(|ts| ts.starts_with("2021-06-21T"))
                && record.master_metadata_track_name.as_deref() == Some("Sexy Boy")
        }));
    }

    #[test]
    fn temp_history_dir_round_trips_through_json() -> anyhow::Result<()> {
        let mut faker = ListeningFaker::new(5);
        let records = faker.history_in_year(2020, 5);
        let dir = temp_history_dir(&records)?;
        let raw = std::fs::read_to_string(dir.path().join("Streaming_History_Audio_0.json"))?;
        let parsed: Vec<StreamRecord> = serde_json::from_str(&raw)?;
        assert_eq!(parsed, records);
        Ok(())
    }
}
