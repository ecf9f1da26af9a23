// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::heatmap::format_date;
use std::collections::BTreeMap;
use time::Date;

pub const TRACKS_PER_PAGE: usize = 5;
pub const EMPTY_MESSAGE: &str = "No songs were played more than 2x on this day in past years.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnThisDayEntry {
    pub track: String,
    pub date: Date,
    pub count: u32,
}

impl OnThisDayEntry {
    pub fn meta(&self) -> String {
        format!("{}× on {}", self.count, format_date(self.date))
    }
}

/// Entries grouped by `MM-DD`, each group in date then track order.
pub type OnThisDayIndex = BTreeMap<String, Vec<OnThisDayEntry>>;

pub fn month_day_key(date: Date) -> String {
    format!("{:02}-{:02}", u8::from(date.month()), date.day())
}

/// Paged list of the tracks replayed on one calendar day across years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnThisDayView {
    per_page: usize,
    page: usize,
    date: Option<Date>,
    entries: Vec<OnThisDayEntry>,
}

impl Default for OnThisDayView {
    fn default() -> Self {
        Self::new(TRACKS_PER_PAGE)
    }
}

impl OnThisDayView {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
            page: 1,
            date: None,
            entries: Vec::new(),
        }
    }

    /// Replaces the list with every entry sharing `date`'s month and day.
    pub fn lookup(&mut self, date: Date, index: &OnThisDayIndex) {
        let mut entries = index
            .get(&month_day_key(date))
            .cloned()
            .unwrap_or_default();
        entries.sort_by(|left, right| right.count.cmp(&left.count));
        self.entries = entries;
        self.date = Some(date);
        self.page = 1;
    }

    pub fn date(&self) -> Option<Date> {
        self.date
    }

    pub fn entries(&self) -> &[OnThisDayEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_MESSAGE)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.entries.len().div_ceil(self.per_page)
    }

    pub fn page_entries(&self) -> &[OnThisDayEntry] {
        let start = ((self.page - 1) * self.per_page).min(self.entries.len());
        let end = (start + self.per_page).min(self.entries.len());
        &self.entries[start..end]
    }

    pub fn pagination_visible(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn prev_disabled(&self) -> bool {
        self.page <= 1
    }

    pub fn next_disabled(&self) -> bool {
        self.page >= self.total_pages()
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages())
    }

    pub fn next_page(&mut self) -> bool {
        if self.next_disabled() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.prev_disabled() {
            return false;
        }
        self.page -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{EMPTY_MESSAGE, OnThisDayEntry, OnThisDayIndex, OnThisDayView, month_day_key};
    use time::{Date, macros::date};

    fn entry(track: &str, date: Date, count: u32) -> OnThisDayEntry {
        OnThisDayEntry {
            track: track.to_owned(),
            date,
            count,
        }
    }

    fn index_with(entries: Vec<OnThisDayEntry>) -> OnThisDayIndex {
        let mut index = OnThisDayIndex::new();
        for entry in entries {
            index
                .entry(month_day_key(entry.date))
                .or_default()
                .push(entry);
        }
        index
    }

    #[test]
    fn sorts_by_count_descending() {
        let index = index_with(vec![
            entry("A", date!(2021 - 03 - 14), 5),
            entry("B", date!(2022 - 03 - 14), 9),
        ]);
        let mut view = OnThisDayView::default();
        view.lookup(date!(2025 - 03 - 14), &index);
        let tracks = view
            .page_entries()
            .iter()
            .map(|entry| entry.track.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tracks, vec!["B", "A"]);
        assert!(!view.pagination_visible());
    }

    #[test]
    fn ties_keep_index_order() {
        let index = index_with(vec![
            entry("Early", date!(2019 - 07 - 01), 4),
            entry("Late", date!(2023 - 07 - 01), 4),
            entry("Top", date!(2020 - 07 - 01), 8),
        ]);
        let mut view = OnThisDayView::default();
        view.lookup(date!(2024 - 07 - 01), &index);
        let tracks = view
            .entries()
            .iter()
            .map(|entry| entry.track.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tracks, vec!["Top", "Early", "Late"]);
    }

    #[test]
    fn empty_day_shows_message_and_hides_pagination() {
        let mut view = OnThisDayView::default();
        view.lookup(date!(2024 - 02 - 29), &OnThisDayIndex::new());
        assert_eq!(view.message(), Some(EMPTY_MESSAGE));
        assert!(view.page_entries().is_empty());
        assert!(!view.pagination_visible());
    }

    #[test]
    fn pages_in_fives_with_prev_next_bounds() {
        let entries = (0..12)
            .map(|offset| entry(&format!("T{offset}"), date!(2020 - 05 - 05), 20 - offset))
            .collect();
        let index = index_with(entries);
        let mut view = OnThisDayView::default();
        view.lookup(date!(2024 - 05 - 05), &index);

        assert!(view.pagination_visible());
        assert_eq!(view.page_label(), "Page 1 of 3");
        assert!(view.prev_disabled());
        assert!(!view.prev_page());

        assert!(view.next_page());
        assert!(view.next_page());
        assert_eq!(view.page_entries().len(), 2);
        assert!(view.next_disabled());
        assert!(!view.next_page());
        assert_eq!(view.page_label(), "Page 3 of 3");
    }

    #[test]
    fn lookup_resets_to_first_page() {
        let entries = (0..7)
            .map(|offset| entry(&format!("T{offset}"), date!(2021 - 09 - 09), 3 + offset))
            .collect();
        let index = index_with(entries);
        let mut view = OnThisDayView::default();
        view.lookup(date!(2024 - 09 - 09), &index);
        view.next_page();
        assert_eq!(view.page(), 2);
        view.lookup(date!(2025 - 09 - 09), &index);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn meta_text_shows_count_and_date() {
        let item = entry("Song - Band", date!(2022 - 12 - 25), 6);
        assert_eq!(item.meta(), "6× on 2022-12-25");
        assert_eq!(month_day_key(date!(2022 - 12 - 25)), "12-25");
    }
}
