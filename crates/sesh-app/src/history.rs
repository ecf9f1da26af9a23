// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::heatmap::DayCounts;
use crate::model::{EntityKind, Mode, TableId, YearScope};
use crate::on_this_day::{OnThisDayEntry, OnThisDayIndex, month_day_key};
use crate::projection::{Row, RowSource, TableData};
use crate::stats::{ListeningStats, PlayObservation, StatsCollector, StatsTotals};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};
use tracing::{debug, warn};

pub const DEFAULT_MIN_MILLISECONDS: u64 = 20_000;
/// Plays on one day above which a track enters the on-this-day index.
pub const ON_THIS_DAY_MIN_PLAYS: u32 = 2;

const UNKNOWN_TRACK: &str = "Unknown Track";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// One entry of an extended streaming history export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub ts: Option<String>,
    pub ms_played: Option<i64>,
    pub master_metadata_album_artist_name: Option<String>,
    pub master_metadata_track_name: Option<String>,
    pub master_metadata_album_album_name: Option<String>,
    pub skipped: Option<bool>,
    pub offline: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tally {
    plays: HashMap<String, u64>,
    time_ms: HashMap<String, u64>,
}

impl Tally {
    fn record(&mut self, name: &str, ms_played: u64, counted: bool) {
        *self.time_ms.entry(name.to_owned()).or_default() += ms_played;
        if counted {
            *self.plays.entry(name.to_owned()).or_default() += 1;
        }
    }

    fn merge(&mut self, other: &Self) {
        for (name, plays) in &other.plays {
            *self.plays.entry(name.clone()).or_default() += plays;
        }
        for (name, time_ms) in &other.time_ms {
            *self.time_ms.entry(name.clone()).or_default() += time_ms;
        }
    }

    fn values(&self, mode: Mode) -> &HashMap<String, u64> {
        match mode {
            Mode::Playcount => &self.plays,
            Mode::Playtime => &self.time_ms,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ScopeTallies {
    artists: Tally,
    tracks: Tally,
    albums: Tally,
}

impl ScopeTallies {
    fn entity(&self, entity: EntityKind) -> &Tally {
        match entity {
            EntityKind::Artist => &self.artists,
            EntityKind::Track => &self.tracks,
            EntityKind::Album => &self.albums,
        }
    }

    fn merge(&mut self, other: &Self) {
        self.artists.merge(&other.artists);
        self.tracks.merge(&other.tracks);
        self.albums.merge(&other.albums);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub entries: usize,
    pub ignored: usize,
    pub counted_plays: u64,
    pub skips: u64,
    pub offline_plays: u64,
    pub artists: usize,
    pub tracks: usize,
    pub albums: usize,
}

/// Aggregated listening history, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListeningDataset {
    years: BTreeMap<i32, ScopeTallies>,
    all: ScopeTallies,
    day_counts: DayCounts,
    on_this_day: OnThisDayIndex,
    first_played: Option<Date>,
    last_played: Option<Date>,
    summary: DatasetSummary,
    stats: ListeningStats,
}

impl ListeningDataset {
    pub fn from_records(records: &[StreamRecord], min_milliseconds: u64) -> Self {
        let mut dataset = Self::default();
        let mut daily_tracks: BTreeMap<(Date, String), u32> = BTreeMap::new();
        let mut collector = StatsCollector::default();
        dataset.summary.entries = records.len();

        for record in records {
            let Some(ms_played) = record.ms_played.filter(|ms| *ms > 0) else {
                dataset.summary.ignored += 1;
                continue;
            };
            let ms_played = ms_played.unsigned_abs();
            let Some(ts) = record.ts.as_deref() else {
                warn!(
                    track = record
                        .master_metadata_track_name
                        .as_deref()
                        .unwrap_or(UNKNOWN_TRACK),
                    "entry missing timestamp, skipping"
                );
                dataset.summary.ignored += 1;
                continue;
            };
            let Some(artist) = record
                .master_metadata_album_artist_name
                .as_deref()
                .filter(|name| !name.is_empty())
            else {
                dataset.summary.ignored += 1;
                continue;
            };
            let played_at = match OffsetDateTime::parse(ts, &Rfc3339) {
                Ok(played_at) => played_at,
                Err(error) => {
                    warn!(ts, %error, "unparseable timestamp, skipping entry");
                    dataset.summary.ignored += 1;
                    continue;
                }
            };

            let day = played_at.date();
            let track_name = record
                .master_metadata_track_name
                .as_deref()
                .unwrap_or(UNKNOWN_TRACK);
            let track = format!("{track_name} - {artist}");
            let album = format!(
                "{} - {artist}",
                record
                    .master_metadata_album_album_name
                    .as_deref()
                    .unwrap_or(UNKNOWN_ALBUM)
            );
            let counted = ms_played > min_milliseconds;

            dataset.first_played = Some(dataset.first_played.map_or(day, |first| first.min(day)));
            dataset.last_played = Some(dataset.last_played.map_or(day, |last| last.max(day)));

            if counted {
                *dataset.day_counts.entry(day).or_default() += 1;
                *daily_tracks.entry((day, track.clone())).or_default() += 1;
                dataset.summary.counted_plays += 1;
                if record.offline == Some(true) {
                    dataset.summary.offline_plays += 1;
                }
            }
            if record.skipped == Some(true) {
                dataset.summary.skips += 1;
            }
            collector.observe(PlayObservation {
                played_at,
                artist,
                track_name,
                track: &track,
                ms_played,
                counted,
                skipped: record.skipped == Some(true),
            });

            let year = dataset.years.entry(day.year()).or_default();
            year.artists.record(artist, ms_played, counted);
            year.tracks.record(&track, ms_played, counted);
            year.albums.record(&album, ms_played, counted);
        }

        for tallies in dataset.years.values() {
            dataset.all.merge(tallies);
        }
        dataset.summary.artists = dataset.all.artists.time_ms.len();
        dataset.summary.tracks = dataset.all.tracks.time_ms.len();
        dataset.summary.albums = dataset.all.albums.time_ms.len();

        dataset.stats = collector.finish(
            StatsTotals {
                artists: dataset.summary.artists,
                albums: dataset.summary.albums,
                tracks: dataset.summary.tracks,
                year_plays: dataset
                    .years
                    .iter()
                    .map(|(year, tallies)| (*year, tallies.tracks.plays.values().sum()))
                    .collect(),
                year_artists: dataset
                    .years
                    .values()
                    .map(|tallies| tallies.artists.plays.keys().map(String::as_str).collect())
                    .collect(),
            },
            &dataset.day_counts,
        );

        for ((date, track), count) in daily_tracks {
            if count > ON_THIS_DAY_MIN_PLAYS {
                dataset
                    .on_this_day
                    .entry(month_day_key(date))
                    .or_default()
                    .push(OnThisDayEntry { track, date, count });
            }
        }

        debug!(
            entries = dataset.summary.entries,
            counted = dataset.summary.counted_plays,
            years = dataset.years.len(),
            "aggregated listening history"
        );
        dataset
    }

    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    pub fn year_scopes(&self) -> Vec<YearScope> {
        std::iter::once(YearScope::All)
            .chain(self.years.keys().copied().map(YearScope::Year))
            .collect()
    }

    pub fn day_counts(&self) -> &DayCounts {
        &self.day_counts
    }

    pub fn on_this_day(&self) -> &OnThisDayIndex {
        &self.on_this_day
    }

    pub fn summary(&self) -> DatasetSummary {
        self.summary
    }

    pub fn stats(&self) -> &ListeningStats {
        &self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// First and last day with any play, narrowed to one year when asked.
    pub fn date_range(&self, scope: YearScope) -> Option<(Date, Date)> {
        let (first, last) = (self.first_played?, self.last_played?);
        match scope {
            YearScope::All => Some((first, last)),
            YearScope::Year(year) => {
                let jan1 = Date::from_calendar_date(year, Month::January, 1).ok()?;
                let dec31 = Date::from_calendar_date(year, Month::December, 31).ok()?;
                let start = first.max(jan1);
                let end = last.min(dec31);
                (start <= end).then_some((start, end))
            }
        }
    }

    /// Ranked `[rank, name, value]` rows for one table.
    pub fn ranked_rows(&self, table: TableId, mode: Mode) -> Result<Vec<Row>> {
        let tallies = match table.scope {
            YearScope::All => &self.all,
            YearScope::Year(year) => self
                .years
                .get(&year)
                .ok_or_else(|| anyhow!("no listening data for table {table}"))?,
        };

        let mut ranked = tallies
            .entity(table.entity)
            .values(mode)
            .iter()
            .collect::<Vec<_>>();
        ranked.sort_by(|(left_name, left), (right_name, right)| {
            right.cmp(left).then_with(|| left_name.cmp(right_name))
        });

        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(index, (name, value))| {
                let value = match mode {
                    Mode::Playcount => value.to_string(),
                    Mode::Playtime => ms_to_hms(*value),
                };
                Row::new(vec![(index + 1).to_string(), name.clone(), value])
            })
            .collect())
    }
}

impl RowSource for ListeningDataset {
    fn load_table(&self, table: TableId, mode: Mode) -> Result<TableData> {
        Ok(TableData {
            columns: table_columns(table.entity, mode),
            rows: self.ranked_rows(table, mode)?,
        })
    }
}

pub fn table_columns(entity: EntityKind, mode: Mode) -> Vec<String> {
    vec![
        "Rank".to_owned(),
        entity.column_label().to_owned(),
        mode.value_column_label().to_owned(),
    ]
}

/// Formats milliseconds as `HH:MM:SS MMMms`; hours grow past two digits.
pub fn ms_to_hms(ms: u64) -> String {
    let millis = ms % 1000;
    let seconds = ms / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02} {millis:03}ms")
}

#[cfg(test)]
mod tests {
    use super::{ListeningDataset, StreamRecord, ms_to_hms};
    use crate::model::{EntityKind, Mode, TableId, YearScope};
    use crate::projection::RowSource;
    use anyhow::Result;
    use time::macros::date;

    fn play(ts: &str, artist: &str, track: &str, ms: i64) -> StreamRecord {
        StreamRecord {
            ts: Some(ts.to_owned()),
            ms_played: Some(ms),
            master_metadata_album_artist_name: Some(artist.to_owned()),
            master_metadata_track_name: Some(track.to_owned()),
            master_metadata_album_album_name: Some(format!("{track} LP")),
            ..StreamRecord::default()
        }
    }

    fn cells(dataset: &ListeningDataset, table: TableId, mode: Mode) -> Result<Vec<Vec<String>>> {
        Ok(dataset
            .ranked_rows(table, mode)?
            .into_iter()
            .map(|row| row.cells().to_vec())
            .collect())
    }

    #[test]
    fn ms_to_hms_pads_each_component() {
        assert_eq!(ms_to_hms(0), "00:00:00 000ms");
        assert_eq!(ms_to_hms(3_723_004), "01:02:03 004ms");
        assert_eq!(ms_to_hms(360_000_000), "100:00:00 000ms");
    }

    #[test]
    fn short_plays_add_time_but_not_counts() -> Result<()> {
        let records = vec![
            play("2023-01-01T10:00:00Z", "Air", "La Femme", 30_000),
            play("2023-01-01T11:00:00Z", "Air", "La Femme", 5_000),
        ];
        let dataset = ListeningDataset::from_records(&records, 20_000);
        let artists = TableId::new(EntityKind::Artist, YearScope::Year(2023));
        assert_eq!(
            cells(&dataset, artists, Mode::Playcount)?,
            vec![vec!["1".to_owned(), "Air".to_owned(), "1".to_owned()]]
        );
        assert_eq!(
            cells(&dataset, artists, Mode::Playtime)?,
            vec![vec![
                "1".to_owned(),
                "Air".to_owned(),
                "00:00:35 000ms".to_owned()
            ]]
        );
        Ok(())
    }

    #[test]
    fn playcount_table_omits_names_without_counted_plays() -> Result<()> {
        let records = vec![
            play("2023-01-01T10:00:00Z", "Air", "La Femme", 30_000),
            play("2023-01-01T11:00:00Z", "Moby", "Porcelain", 1_000),
        ];
        let dataset = ListeningDataset::from_records(&records, 20_000);
        let artists = TableId::new(EntityKind::Artist, YearScope::All);
        assert_eq!(dataset.ranked_rows(artists, Mode::Playcount)?.len(), 1);
        assert_eq!(dataset.ranked_rows(artists, Mode::Playtime)?.len(), 2);
        Ok(())
    }

    #[test]
    fn identities_combine_name_and_artist() -> Result<()> {
        let mut untitled = play("2022-06-01T08:00:00Z", "Tricky", "x", 60_000);
        untitled.master_metadata_track_name = None;
        untitled.master_metadata_album_album_name = None;
        let dataset = ListeningDataset::from_records(&[untitled], 20_000);

        let tracks = cells(&dataset, TableId::new(EntityKind::Track, YearScope::All), Mode::Playcount)?;
        assert_eq!(tracks[0][1], "Unknown Track - Tricky");
        let albums = cells(&dataset, TableId::new(EntityKind::Album, YearScope::All), Mode::Playcount)?;
        assert_eq!(albums[0][1], "Unknown Album - Tricky");
        Ok(())
    }

    #[test]
    fn ranks_by_value_then_name() -> Result<()> {
        let records = vec![
            play("2021-03-01T10:00:00Z", "Moby", "Porcelain", 40_000),
            play("2021-03-01T11:00:00Z", "Air", "La Femme", 40_000),
            play("2021-03-02T11:00:00Z", "Bjork", "Joga", 40_000),
            play("2021-03-03T11:00:00Z", "Bjork", "Hyperballad", 40_000),
        ];
        let dataset = ListeningDataset::from_records(&records, 20_000);
        let names = cells(&dataset, TableId::new(EntityKind::Artist, YearScope::All), Mode::Playcount)?
            .into_iter()
            .map(|row| row[1].clone())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Bjork", "Air", "Moby"]);
        Ok(())
    }

    #[test]
    fn all_scope_sums_years() -> Result<()> {
        let records = vec![
            play("2021-12-31T23:00:00Z", "Air", "La Femme", 30_000),
            play("2022-01-01T01:00:00Z", "Air", "La Femme", 30_000),
        ];
        let dataset = ListeningDataset::from_records(&records, 20_000);
        assert_eq!(dataset.years(), vec![2021, 2022]);
        assert_eq!(
            dataset.year_scopes(),
            vec![YearScope::All, YearScope::Year(2021), YearScope::Year(2022)]
        );
        let all = cells(&dataset, TableId::new(EntityKind::Artist, YearScope::All), Mode::Playcount)?;
        assert_eq!(all[0][2], "2");
        Ok(())
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let mut no_ts = play("2021-01-01T00:00:00Z", "Air", "x", 30_000);
        no_ts.ts = None;
        let bad_ts = play("yesterday", "Air", "x", 30_000);
        let no_artist = StreamRecord {
            ts: Some("2021-01-01T00:00:00Z".to_owned()),
            ms_played: Some(30_000),
            ..StreamRecord::default()
        };
        let zero = play("2021-01-01T00:00:00Z", "Air", "x", 0);
        let dataset = ListeningDataset::from_records(&[no_ts, bad_ts, no_artist, zero], 20_000);
        assert!(dataset.is_empty());
        assert_eq!(dataset.summary().ignored, 4);
        assert_eq!(dataset.date_range(YearScope::All), None);
    }

    #[test]
    fn day_counts_and_on_this_day_index() {
        let mut records = Vec::new();
        for hour in 10..13 {
            records.push(play(&format!("2020-07-04T{hour}:00:00Z"), "Air", "Sexy Boy", 30_000));
        }
        for hour in 10..12 {
            records.push(play(&format!("2020-07-04T{hour}:30:00Z"), "Moby", "Porcelain", 30_000));
        }
        records.push(play("2020-07-04T20:00:00Z", "Moby", "Porcelain", 1_000));
        let dataset = ListeningDataset::from_records(&records, 20_000);

        assert_eq!(dataset.day_counts().get(&date!(2020 - 07 - 04)), Some(&5));
        let entries = dataset.on_this_day().get("07-04").cloned().unwrap_or_default();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].track, "Sexy Boy - Air");
        assert_eq!(entries[0].count, 3);
        assert_eq!(entries[0].date, date!(2020 - 07 - 04));
    }

    #[test]
    fn stats_cover_every_year_artists_and_busiest_year() {
        let records = vec![
            play("2021-05-10T10:00:00Z", "Air", "La Femme", 30_000),
            play("2021-05-11T10:00:00Z", "Moby", "Porcelain", 30_000),
            play("2022-02-01T22:00:00Z", "Air", "Playground", 30_000),
            play("2022-02-01T22:30:00Z", "Air", "La Femme", 30_000),
            play("2022-02-02T09:00:00Z", "Moby", "Porcelain", 5_000),
            play("2022-02-03T22:10:00Z", "Air", "Playground", 30_000),
        ];
        let dataset = ListeningDataset::from_records(&records, 20_000);
        let stats = dataset.stats();

        assert_eq!(stats.every_year_artists, vec!["Air"]);
        assert_eq!(stats.one_hit_wonders, 1);
        assert_eq!(stats.busiest_year.map(|peak| (peak.key, peak.plays)), Some((2022, 3)));
        assert_eq!(stats.peak_hour.map(|peak| (peak.key, peak.plays)), Some((22, 3)));
        assert_eq!(stats.counted_plays, dataset.summary().counted_plays);
        assert_eq!(stats.total_time_ms, 155_000);
        assert_eq!(stats.days_played, 5);
        assert_eq!(
            stats.first_play.as_ref().map(|first| first.track.as_str()),
            Some("La Femme")
        );
        assert_eq!(stats.artists, 2);
    }

    #[test]
    fn date_range_narrows_to_year() {
        let records = vec![
            play("2021-05-10T10:00:00Z", "Air", "x", 30_000),
            play("2022-02-01T10:00:00Z", "Air", "x", 30_000),
        ];
        let dataset = ListeningDataset::from_records(&records, 20_000);
        assert_eq!(
            dataset.date_range(YearScope::All),
            Some((date!(2021 - 05 - 10), date!(2022 - 02 - 01)))
        );
        assert_eq!(
            dataset.date_range(YearScope::Year(2021)),
            Some((date!(2021 - 05 - 10), date!(2021 - 12 - 31)))
        );
        assert_eq!(dataset.date_range(YearScope::Year(2019)), None);
    }

    #[test]
    fn missing_year_table_fails_with_table_name() {
        let dataset = ListeningDataset::default();
        let error = dataset
            .load_table(
                TableId::new(EntityKind::Track, YearScope::Year(2020)),
                Mode::Playcount,
            )
            .expect_err("missing year");
        assert!(error.to_string().contains("track-table-2020"));
    }
}
