// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use time::macros::format_description;
use time::{Date, Duration, Month};

pub const MAX_LEVEL: u8 = 4;
pub const PLAYS_PER_LEVEL: u32 = 10;

/// Play counts keyed by calendar day.
pub type DayCounts = BTreeMap<Date, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapCell {
    pub date: Date,
    pub count: u32,
    pub level: u8,
    pub week: u8,
    /// Week index counted from the Monday on or before the range start.
    pub column: usize,
    /// Weekday, Monday = 0.
    pub row: usize,
}

impl HeatmapCell {
    pub fn label(&self) -> String {
        format!(
            "{} (Week {}): {} plays",
            format_date(self.date),
            self.week,
            self.count
        )
    }

    pub fn detail(&self) -> String {
        format!(
            "Date: {}\nWeek: {}\nPlays: {}",
            format_date(self.date),
            self.week,
            self.count
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heatmap {
    cells: Vec<HeatmapCell>,
}

impl Heatmap {
    /// One cell per day of `[start, end]`; empty when `start > end`.
    pub fn build(start: Date, end: Date, counts: &DayCounts) -> Self {
        if start > end {
            return Self { cells: Vec::new() };
        }

        let origin = week_start(start);
        let days = (end - start).whole_days();
        let cells = (0..=days)
            .map(|offset| {
                let date = start + Duration::days(offset);
                let count = counts.get(&date).copied().unwrap_or(0);
                HeatmapCell {
                    date,
                    count,
                    level: intensity_level(count),
                    week: iso_week_number(date),
                    column: ((date - origin).whole_days() / 7) as usize,
                    row: usize::from(date.weekday().number_days_from_monday()),
                }
            })
            .collect();
        Self { cells }
    }

    pub fn cells(&self) -> &[HeatmapCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.cells.first().map(|cell| cell.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.cells.last().map(|cell| cell.date)
    }

    pub fn columns(&self) -> usize {
        self.cells.last().map_or(0, |cell| cell.column + 1)
    }

    pub fn cell(&self, date: Date) -> Option<&HeatmapCell> {
        let first = self.first_date()?;
        let offset = usize::try_from((date - first).whole_days()).ok()?;
        self.cells.get(offset)
    }

    pub fn cell_at(&self, column: usize, row: usize) -> Option<&HeatmapCell> {
        if row >= 7 {
            return None;
        }
        let first = self.cells.first()?;
        let index = (column * 7 + row).checked_sub(first.row)?;
        self.cells.get(index)
    }

    /// Moves `cursor` by `days`, clamped to the rendered range.
    pub fn step_cursor(&self, cursor: Date, days: i64) -> Option<Date> {
        let (first, last) = (self.first_date()?, self.last_date()?);
        let moved = cursor
            .checked_add(Duration::days(days))
            .unwrap_or(if days < 0 { first } else { last });
        Some(moved.clamp(first, last))
    }

    /// Sum of plays and number of days with any play, for the legend.
    pub fn totals(&self) -> (u64, usize) {
        self.cells.iter().fold((0, 0), |(plays, active), cell| {
            (
                plays + u64::from(cell.count),
                active + usize::from(cell.count > 0),
            )
        })
    }

    /// Column of the first day of every month in range, for axis labels.
    pub fn month_starts(&self) -> Vec<(usize, Month)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(index, cell)| *index == 0 || cell.date.day() == 1)
            .map(|(_, cell)| (cell.column, cell.date.month()))
            .collect()
    }
}

pub fn intensity_level(count: u32) -> u8 {
    u8::try_from(count / PLAYS_PER_LEVEL).map_or(MAX_LEVEL, |level| level.min(MAX_LEVEL))
}

/// ISO-8601 week: shift to the Thursday of the date's week and count whole
/// weeks from the first Thursday of that Thursday's year.
pub fn iso_week_number(date: Date) -> u8 {
    let thursday = date + Duration::days(3 - i64::from(date.weekday().number_days_from_monday()));
    let Ok(jan4) = Date::from_calendar_date(thursday.year(), Month::January, 4) else {
        return date.iso_week();
    };
    let first_thursday =
        jan4 + Duration::days(3 - i64::from(jan4.weekday().number_days_from_monday()));
    let week = 1 + (thursday - first_thursday).whole_days() / 7;
    u8::try_from(week).unwrap_or_else(|_| date.iso_week())
}

pub fn week_start(date: Date) -> Date {
    date - Duration::days(i64::from(date.weekday().number_days_from_monday()))
}

pub fn format_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::{DayCounts, Heatmap, format_date, intensity_level, iso_week_number};
    use time::{Date, Duration, Month, macros::date};

    #[test]
    fn dates_format_as_zero_padded_iso() -> anyhow::Result<()> {
        assert_eq!(format_date(date!(2024 - 03 - 07)), "2024-03-07");
        let early = Date::from_calendar_date(987, Month::December, 31)?;
        assert_eq!(format_date(early), "0987-12-31");
        Ok(())
    }

    #[test]
    fn january_2024_has_thirty_one_cells() {
        let map = Heatmap::build(date!(2024 - 01 - 01), date!(2024 - 01 - 31), &DayCounts::new());
        assert_eq!(map.len(), 31);
        assert_eq!(map.first_date(), Some(date!(2024 - 01 - 01)));
        assert_eq!(map.last_date(), Some(date!(2024 - 01 - 31)));
    }

    #[test]
    fn range_across_dst_transitions_counts_calendar_days() {
        let map = Heatmap::build(date!(2024 - 03 - 01), date!(2024 - 11 - 30), &DayCounts::new());
        let expected = (date!(2024 - 11 - 30) - date!(2024 - 03 - 01)).whole_days() + 1;
        assert_eq!(map.len() as i64, expected);
    }

    #[test]
    fn inverted_range_is_empty() {
        let map = Heatmap::build(date!(2024 - 02 - 01), date!(2024 - 01 - 01), &DayCounts::new());
        assert!(map.is_empty());
        assert_eq!(map.columns(), 0);
        assert_eq!(map.step_cursor(date!(2024 - 01 - 15), 1), None);
    }

    #[test]
    fn iso_week_matches_known_dates() {
        assert_eq!(iso_week_number(date!(2024 - 01 - 01)), 1);
        assert_eq!(iso_week_number(date!(2021 - 01 - 03)), 53);
        assert_eq!(iso_week_number(date!(2020 - 12 - 31)), 53);
        assert_eq!(iso_week_number(date!(2019 - 12 - 30)), 1);
    }

    #[test]
    fn iso_week_agrees_with_calendar_library() -> anyhow::Result<()> {
        let mut day = Date::from_calendar_date(2015, Month::January, 1)?;
        let end = Date::from_calendar_date(2027, Month::January, 1)?;
        while day < end {
            assert_eq!(iso_week_number(day), day.iso_week(), "{day}");
            day += Duration::days(1);
        }
        Ok(())
    }

    #[test]
    fn levels_bucket_by_ten_and_cap_at_four() {
        assert_eq!(intensity_level(0), 0);
        assert_eq!(intensity_level(9), 0);
        assert_eq!(intensity_level(10), 1);
        assert_eq!(intensity_level(39), 3);
        assert_eq!(intensity_level(40), 4);
        assert_eq!(intensity_level(u32::MAX), 4);
    }

    #[test]
    fn labels_and_detail_use_iso_date_week_and_count() {
        let mut counts = DayCounts::new();
        counts.insert(date!(2024 - 01 - 02), 23);
        let map = Heatmap::build(date!(2024 - 01 - 01), date!(2024 - 01 - 07), &counts);
        let cell = map.cell(date!(2024 - 01 - 02)).copied();
        let cell = cell.expect("cell for Jan 2");
        assert_eq!(cell.label(), "2024-01-02 (Week 1): 23 plays");
        assert_eq!(cell.detail(), "Date: 2024-01-02\nWeek: 1\nPlays: 23");
        assert_eq!(cell.level, 2);

        let quiet = map.cell(date!(2024 - 01 - 05)).expect("cell for Jan 5");
        assert_eq!(quiet.label(), "2024-01-05 (Week 1): 0 plays");
    }

    #[test]
    fn grid_places_days_by_week_and_weekday() {
        // 2024-01-03 is a Wednesday.
        let map = Heatmap::build(date!(2024 - 01 - 03), date!(2024 - 01 - 15), &DayCounts::new());
        let first = map.cells()[0];
        assert_eq!((first.column, first.row), (0, 2));
        let monday = map.cell(date!(2024 - 01 - 08)).expect("second monday");
        assert_eq!((monday.column, monday.row), (1, 0));
        assert_eq!(map.columns(), 3);
        assert_eq!(
            map.cell_at(2, 0).map(|cell| cell.date),
            Some(date!(2024 - 01 - 15))
        );
    }

    #[test]
    fn cursor_steps_are_clamped_to_range() {
        let map = Heatmap::build(date!(2024 - 01 - 01), date!(2024 - 01 - 31), &DayCounts::new());
        assert_eq!(
            map.step_cursor(date!(2024 - 01 - 10), 7),
            Some(date!(2024 - 01 - 17))
        );
        assert_eq!(
            map.step_cursor(date!(2024 - 01 - 03), -7),
            Some(date!(2024 - 01 - 01))
        );
        assert_eq!(
            map.step_cursor(date!(2024 - 01 - 31), 1),
            Some(date!(2024 - 01 - 31))
        );
    }

    #[test]
    fn totals_and_month_starts() {
        let mut counts = DayCounts::new();
        counts.insert(date!(2024 - 01 - 30), 4);
        counts.insert(date!(2024 - 02 - 02), 6);
        let map = Heatmap::build(date!(2024 - 01 - 29), date!(2024 - 02 - 04), &counts);
        assert_eq!(map.totals(), (10, 2));
        assert_eq!(
            map.month_starts(),
            vec![(0, Month::January), (0, Month::February)]
        );
    }
}
