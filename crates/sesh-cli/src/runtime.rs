// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use sesh_app::{
    DatasetSummary, DayCounts, ListeningDataset, ListeningStats, Mode, OnThisDayIndex, RowSource,
    TableData, TableId, Theme, YearScope,
};
use sesh_db::Store;
use time::{Date, OffsetDateTime};
use tracing::debug;

/// Serves the loaded history to the TUI and persists the theme to `store`.
pub struct DbRuntime<'a> {
    store: &'a Store,
    dataset: ListeningDataset,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store, dataset: ListeningDataset) -> Self {
        Self { store, dataset }
    }
}

impl RowSource for DbRuntime<'_> {
    fn load_table(&self, table: TableId, mode: Mode) -> Result<TableData> {
        self.dataset.load_table(table, mode)
    }
}

impl sesh_tui::AppRuntime for DbRuntime<'_> {
    fn day_counts(&self) -> &DayCounts {
        self.dataset.day_counts()
    }

    fn date_range(&self, scope: YearScope) -> Option<(Date, Date)> {
        self.dataset.date_range(scope)
    }

    fn on_this_day_index(&self) -> &OnThisDayIndex {
        self.dataset.on_this_day()
    }

    fn summary(&self) -> DatasetSummary {
        self.dataset.summary()
    }

    fn stats(&self) -> &ListeningStats {
        self.dataset.stats()
    }

    fn save_theme(&mut self, theme: Theme) -> Result<()> {
        self.store.put_theme(theme)?;
        debug!(theme = theme.as_str(), "saved theme preference");
        Ok(())
    }

    // Play dates are bucketed in UTC, so "today" is too.
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}
