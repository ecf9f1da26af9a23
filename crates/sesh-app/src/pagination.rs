// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

/// Numbered buttons shown on each side of the current page.
pub const PAGE_WINDOW_RADIUS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub current: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl PageWindow {
    /// Clamps `requested` into `[1, total_pages]`; an empty set still has one page.
    pub fn new(len: usize, page_size: usize, requested: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = len.div_ceil(page_size).max(1);
        Self {
            current: requested.clamp(1, total_pages),
            page_size,
            total_pages,
        }
    }

    pub fn slice_range(&self, len: usize) -> Range<usize> {
        let start = (self.current - 1).saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        start..end
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total_pages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationItem {
    Prev { target: usize, disabled: bool },
    Shortcut { page: usize },
    Gap,
    Page { page: usize, active: bool },
    Next { target: usize, disabled: bool },
}

impl PaginationItem {
    pub fn label(&self) -> String {
        match self {
            Self::Prev { .. } => "Prev".to_owned(),
            Self::Shortcut { page } | Self::Page { page, .. } => page.to_string(),
            Self::Gap => "...".to_owned(),
            Self::Next { .. } => "Next".to_owned(),
        }
    }

    /// Page to render when the control is activated, `None` for inert items.
    pub fn target(&self) -> Option<usize> {
        match *self {
            Self::Prev { target, disabled } | Self::Next { target, disabled } => {
                (!disabled).then_some(target)
            }
            Self::Shortcut { page } | Self::Page { page, .. } => Some(page),
            Self::Gap => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    pub window: PageWindow,
    pub items: Vec<PaginationItem>,
}

impl PaginationControls {
    pub fn window_pages(&self) -> Vec<usize> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PaginationItem::Page { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    pub fn shortcuts(&self) -> Vec<usize> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PaginationItem::Shortcut { page } => Some(*page),
                _ => None,
            })
            .collect()
    }

    pub fn active_page(&self) -> Option<usize> {
        self.items.iter().find_map(|item| match item {
            PaginationItem::Page { page, active: true } => Some(*page),
            _ => None,
        })
    }

    pub fn prev_target(&self) -> Option<usize> {
        self.items
            .iter()
            .find(|item| matches!(item, PaginationItem::Prev { .. }))
            .and_then(PaginationItem::target)
    }

    pub fn next_target(&self) -> Option<usize> {
        self.items
            .iter()
            .find(|item| matches!(item, PaginationItem::Next { .. }))
            .and_then(PaginationItem::target)
    }

    pub fn prev_disabled(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, PaginationItem::Prev { disabled: true, .. }))
    }

    pub fn next_disabled(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, PaginationItem::Next { disabled: true, .. }))
    }
}

/// Builds the pager for a filtered set of `len` rows. Depends on nothing else.
pub fn derive_pagination_controls(
    len: usize,
    page_size: usize,
    current_page: usize,
) -> PaginationControls {
    let window = PageWindow::new(len, page_size, current_page);
    let current = window.current;
    let total = window.total_pages;

    let mut items = vec![PaginationItem::Prev {
        target: current.saturating_sub(1).max(1),
        disabled: window.is_first(),
    }];

    if len > 0 {
        let start = current.saturating_sub(PAGE_WINDOW_RADIUS).max(1);
        let end = (current + PAGE_WINDOW_RADIUS).min(total);

        if start > 1 {
            items.push(PaginationItem::Shortcut { page: 1 });
            if start > 2 {
                items.push(PaginationItem::Gap);
            }
        }

        items.extend((start..=end).map(|page| PaginationItem::Page {
            page,
            active: page == current,
        }));

        if end < total {
            if end + 1 < total {
                items.push(PaginationItem::Gap);
            }
            items.push(PaginationItem::Shortcut { page: total });
        }
    }

    items.push(PaginationItem::Next {
        target: (current + 1).min(total),
        disabled: window.is_last(),
    });

    PaginationControls { window, items }
}
