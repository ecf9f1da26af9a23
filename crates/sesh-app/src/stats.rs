// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::heatmap::DayCounts;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use time::{Date, Month, OffsetDateTime, Weekday};

/// A record holder: the key with the most plays and how many it had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak<T> {
    pub key: T,
    pub plays: u64,
}

/// Inclusive run of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: Date,
    pub end: Date,
}

impl DateSpan {
    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }
}

/// The earliest or latest play in the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayMark {
    pub date: Date,
    pub artist: String,
    pub track: String,
}

/// Year-in-review figures derived from the whole history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListeningStats {
    pub first_play: Option<PlayMark>,
    pub last_play: Option<PlayMark>,
    /// Distinct days with any play, short ones included.
    pub days_played: usize,
    pub counted_plays: u64,
    pub total_time_ms: u64,
    pub artists: usize,
    pub albums: usize,
    pub tracks: usize,
    /// Artists heard with exactly one distinct track.
    pub one_hit_wonders: usize,
    /// Artists with a counted play in every year of the history, sorted.
    pub every_year_artists: Vec<String>,
    pub busiest_year: Option<Peak<i32>>,
    pub busiest_month: Option<Peak<(i32, Month)>>,
    pub busiest_day: Option<Peak<Date>>,
    pub most_skipped: Option<Peak<String>>,
    pub longest_streak: Option<DateSpan>,
    pub longest_hiatus: Option<DateSpan>,
    pub busiest_weekday: Option<Peak<Weekday>>,
    /// Hour of day in UTC, 0..24.
    pub peak_hour: Option<Peak<u8>>,
}

impl ListeningStats {
    /// Whole days from the first play to `today`, zero without history.
    pub fn days_since_first(&self, today: Date) -> i64 {
        self.first_play
            .as_ref()
            .map_or(0, |first| (today - first.date).whole_days().max(0))
    }

    pub fn pct_days_played(&self, today: Date) -> f64 {
        percent(self.days_played as f64, self.days_since_first(today) as f64)
    }

    /// Total listening time spread over counted plays.
    pub fn avg_play_ms(&self) -> u64 {
        self.total_time_ms
            .checked_div(self.counted_plays)
            .unwrap_or_default()
    }

    pub fn pct_one_hit_wonders(&self) -> f64 {
        percent(self.one_hit_wonders as f64, self.artists as f64)
    }

    pub fn albums_per_artist(&self) -> f64 {
        ratio(self.albums as f64, self.artists as f64)
    }

    pub fn avg_plays_per_active_day(&self) -> f64 {
        ratio(self.counted_plays as f64, self.days_played as f64)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn percent(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// `0` → `12AM`, `13` → `1PM`.
pub fn hour_label(hour: u8) -> String {
    let twelve = match hour % 12 {
        0 => 12,
        other => other,
    };
    let suffix = if hour < 12 { "AM" } else { "PM" };
    format!("{twelve}{suffix}")
}

/// One play as seen by the aggregation loop.
#[derive(Debug, Clone, Copy)]
pub struct PlayObservation<'a> {
    pub played_at: OffsetDateTime,
    pub artist: &'a str,
    pub track_name: &'a str,
    pub track: &'a str,
    pub ms_played: u64,
    pub counted: bool,
    pub skipped: bool,
}

/// Per-play accumulators; everything else is derived in [`StatsCollector::finish`].
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    first: Option<(OffsetDateTime, PlayMark)>,
    last: Option<(OffsetDateTime, PlayMark)>,
    dates: BTreeSet<Date>,
    monthly: BTreeMap<(i32, u8), u64>,
    weekdays: [u64; 7],
    hours: [u64; 24],
    skips: BTreeMap<String, u64>,
    artist_tracks: HashMap<String, HashSet<String>>,
    counted_plays: u64,
    total_time_ms: u64,
}

/// Aggregates the collector cannot see on its own.
#[derive(Debug, Clone, Default)]
pub struct StatsTotals<'a> {
    pub artists: usize,
    pub albums: usize,
    pub tracks: usize,
    /// Counted plays per year.
    pub year_plays: BTreeMap<i32, u64>,
    /// Artists with a counted play, one set per year.
    pub year_artists: Vec<HashSet<&'a str>>,
}

impl StatsCollector {
    pub fn observe(&mut self, play: PlayObservation<'_>) {
        let day = play.played_at.date();
        self.dates.insert(day);
        self.total_time_ms += play.ms_played;
        self.artist_tracks
            .entry(play.artist.to_owned())
            .or_default()
            .insert(play.track.to_owned());

        let mark = || PlayMark {
            date: day,
            artist: play.artist.to_owned(),
            track: play.track_name.to_owned(),
        };
        if self.first.as_ref().is_none_or(|(at, _)| play.played_at < *at) {
            self.first = Some((play.played_at, mark()));
        }
        if self.last.as_ref().is_none_or(|(at, _)| play.played_at > *at) {
            self.last = Some((play.played_at, mark()));
        }

        if play.counted {
            self.counted_plays += 1;
            *self
                .monthly
                .entry((day.year(), u8::from(day.month())))
                .or_default() += 1;
            self.weekdays[usize::from(day.weekday().number_days_from_monday())] += 1;
            self.hours[usize::from(play.played_at.hour())] += 1;
        }
        if play.skipped {
            *self.skips.entry(play.track.to_owned()).or_default() += 1;
        }
    }

    pub fn finish(self, totals: StatsTotals<'_>, day_counts: &DayCounts) -> ListeningStats {
        let one_hit_wonders = self
            .artist_tracks
            .values()
            .filter(|tracks| tracks.len() == 1)
            .count();

        let mut every_year = totals.year_artists.split_first().map_or_else(
            Vec::new,
            |(first, rest)| {
                first
                    .iter()
                    .filter(|artist| rest.iter().all(|year| year.contains(*artist)))
                    .map(|artist| (*artist).to_owned())
                    .collect::<Vec<_>>()
            },
        );
        every_year.sort();

        let sorted_dates = self.dates.iter().copied().collect::<Vec<_>>();

        ListeningStats {
            first_play: self.first.map(|(_, mark)| mark),
            last_play: self.last.map(|(_, mark)| mark),
            days_played: self.dates.len(),
            counted_plays: self.counted_plays,
            total_time_ms: self.total_time_ms,
            artists: totals.artists,
            albums: totals.albums,
            tracks: totals.tracks,
            one_hit_wonders,
            every_year_artists: every_year,
            busiest_year: peak(totals.year_plays.iter().map(|(year, plays)| (*year, *plays))),
            busiest_month: peak(self.monthly.iter().filter_map(|((year, month), plays)| {
                Month::try_from(*month).ok().map(|month| ((*year, month), *plays))
            })),
            busiest_day: peak(
                day_counts
                    .iter()
                    .map(|(date, count)| (*date, u64::from(*count))),
            ),
            most_skipped: peak(self.skips.into_iter()),
            longest_streak: longest_streak(&sorted_dates),
            longest_hiatus: longest_hiatus(&sorted_dates),
            busiest_weekday: peak(
                self.weekdays
                    .iter()
                    .enumerate()
                    .map(|(index, plays)| (weekday_from_monday(index), *plays)),
            ),
            peak_hour: peak(
                self.hours
                    .iter()
                    .zip(0_u8..)
                    .map(|(plays, hour)| (hour, *plays)),
            ),
        }
    }
}

/// Highest count wins; the first key in iteration order breaks ties. Zero counts never win.
fn peak<T>(items: impl Iterator<Item = (T, u64)>) -> Option<Peak<T>> {
    let mut best: Option<Peak<T>> = None;
    for (key, plays) in items {
        if plays > 0 && best.as_ref().is_none_or(|current| plays > current.plays) {
            best = Some(Peak { key, plays });
        }
    }
    best
}

fn weekday_from_monday(index: usize) -> Weekday {
    match index {
        0 => Weekday::Monday,
        1 => Weekday::Tuesday,
        2 => Weekday::Wednesday,
        3 => Weekday::Thursday,
        4 => Weekday::Friday,
        5 => Weekday::Saturday,
        _ => Weekday::Sunday,
    }
}

/// Longest run of consecutive dates; the earliest run wins a tie.
fn longest_streak(sorted_dates: &[Date]) -> Option<DateSpan> {
    let first = *sorted_dates.first()?;
    let mut best = DateSpan {
        start: first,
        end: first,
    };
    let mut current = best;
    for pair in sorted_dates.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.next_day() == Some(next) {
            current.end = next;
        } else {
            current = DateSpan {
                start: next,
                end: next,
            };
        }
        if current.days() > best.days() {
            best = current;
        }
    }
    Some(best)
}

/// Longest run of silent days strictly between two played days.
fn longest_hiatus(sorted_dates: &[Date]) -> Option<DateSpan> {
    let mut best: Option<DateSpan> = None;
    for pair in sorted_dates.windows(2) {
        let (Some(start), Some(end)) = (pair[0].next_day(), pair[1].previous_day()) else {
            continue;
        };
        if start > end {
            continue;
        }
        let gap = DateSpan { start, end };
        if best.is_none_or(|current| gap.days() > current.days()) {
            best = Some(gap);
        }
    }
    best
}
