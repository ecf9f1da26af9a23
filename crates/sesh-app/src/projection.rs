// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Mode, ScopeKey, TableId};
use crate::pagination::{PageWindow, PaginationControls, derive_pagination_controls};
use crate::search::{SearchPattern, Segment, highlight_segments};
use anyhow::{Result, anyhow, bail};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const NO_RESULTS_TEXT: &str = "No results found.";

/// One table row as the data provider hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell texts joined without a separator.
    pub fn searchable_text(&self) -> String {
        self.cells.concat()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Supplies the origin rows of a table for one mode.
pub trait RowSource {
    fn load_table(&self, table: TableId, mode: Mode) -> Result<TableData>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilteredSet {
    Rows(Vec<usize>),
    NoResults,
}

impl FilteredSet {
    fn all(len: usize) -> Self {
        Self::Rows((0..len).collect())
    }

    fn len(&self) -> usize {
        match self {
            Self::Rows(indices) => indices.len(),
            Self::NoResults => 0,
        }
    }
}

#[derive(Debug, Clone)]
struct TableView {
    origin: Arc<TableData>,
    mode: Mode,
    page_size: usize,
    page: usize,
    filtered: FilteredSet,
    term: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedRow {
    Data { cells: Vec<Vec<Segment>> },
    Placeholder { text: String, column_span: usize },
}

impl RenderedRow {
    pub fn plain_cells(&self) -> Vec<String> {
        match self {
            Self::Data { cells } => cells
                .iter()
                .map(|segments| segments.iter().map(|seg| seg.text.as_str()).collect())
                .collect(),
            Self::Placeholder { text, .. } => vec![text.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub table: TableId,
    pub mode: Mode,
    pub columns: Vec<String>,
    pub rows: Vec<RenderedRow>,
    pub page: usize,
    pub total_pages: usize,
    pub controls: PaginationControls,
    pub search_term: String,
    pub matched: usize,
    pub total: usize,
}

impl RenderedTable {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.rows.as_slice(), [RenderedRow::Placeholder { .. }])
    }
}

/// Owns every table's origin cache, filtered set, and stored search term.
#[derive(Debug, Default)]
pub struct ProjectionEngine {
    origins: HashMap<ScopeKey, Arc<TableData>>,
    search_terms: HashMap<String, String>,
    views: HashMap<TableId, TableView>,
}

impl ProjectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(
        &mut self,
        table: TableId,
        page_size: usize,
        mode: Mode,
        source: &dyn RowSource,
    ) -> Result<RenderedTable> {
        if page_size == 0 {
            bail!("page size for {table} must be at least 1");
        }

        let key = ScopeKey { table, mode };
        let origin = match self.origins.get(&key) {
            Some(origin) => Arc::clone(origin),
            None => {
                let data = Arc::new(source.load_table(table, mode)?);
                debug!(
                    table = %table,
                    mode = mode.as_str(),
                    rows = data.rows.len(),
                    "captured origin rows"
                );
                self.origins.insert(key, Arc::clone(&data));
                data
            }
        };

        let filtered = FilteredSet::all(origin.rows.len());
        self.views.insert(
            table,
            TableView {
                origin,
                mode,
                page_size,
                page: 1,
                filtered,
                term: String::new(),
            },
        );

        if let Some(term) = self.search_terms.get(&table.scope_prefix()).cloned()
            && !term.is_empty()
        {
            return self.search(table, &term);
        }
        self.render(table, 1)
    }

    pub fn search(&mut self, table: TableId, term: &str) -> Result<RenderedTable> {
        let view = self.view_mut(table)?;
        let pattern = SearchPattern::new(term);
        view.filtered = if pattern.is_empty() {
            FilteredSet::all(view.origin.rows.len())
        } else {
            let hits = view
                .origin
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| pattern.is_match(&row.searchable_text()))
                .map(|(index, _)| index)
                .collect::<Vec<_>>();
            if hits.is_empty() {
                FilteredSet::NoResults
            } else {
                FilteredSet::Rows(hits)
            }
        };
        view.page = 1;
        view.term = term.to_owned();
        self.search_terms
            .insert(table.scope_prefix(), term.to_owned());
        self.render(table, 1)
    }

    pub fn render(&mut self, table: TableId, page: usize) -> Result<RenderedTable> {
        let view = self.view_mut(table)?;
        let window = PageWindow::new(view.filtered.len(), view.page_size, page);
        view.page = window.current;

        let pattern = SearchPattern::new(&view.term);
        let rows = match &view.filtered {
            FilteredSet::NoResults => vec![RenderedRow::Placeholder {
                text: NO_RESULTS_TEXT.to_owned(),
                column_span: view.origin.columns.len(),
            }],
            FilteredSet::Rows(indices) => indices[window.slice_range(indices.len())]
                .iter()
                .filter_map(|index| view.origin.rows.get(*index))
                .map(|row| RenderedRow::Data {
                    cells: row
                        .cells()
                        .iter()
                        .map(|cell| highlight_segments(cell, &pattern))
                        .collect(),
                })
                .collect(),
        };

        Ok(RenderedTable {
            table,
            mode: view.mode,
            columns: view.origin.columns.clone(),
            rows,
            page: window.current,
            total_pages: window.total_pages,
            controls: derive_pagination_controls(
                view.filtered.len(),
                view.page_size,
                window.current,
            ),
            search_term: view.term.clone(),
            matched: view.filtered.len(),
            total: view.origin.rows.len(),
        })
    }

    pub fn search_term(&self, table: TableId) -> &str {
        self.search_terms
            .get(&table.scope_prefix())
            .map_or("", String::as_str)
    }

    pub fn is_cached(&self, key: ScopeKey) -> bool {
        self.origins.contains_key(&key)
    }

    fn view_mut(&mut self, table: TableId) -> Result<&mut TableView> {
        self.views.get_mut(&table).ok_or_else(|| uninitialized(table))
    }
}

fn uninitialized(table: TableId) -> anyhow::Error {
    anyhow!("table {table} has not been initialized; initialize it before searching or paging")
}
