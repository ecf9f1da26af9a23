// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::TableId;
use crate::state::AppEvent;
use std::collections::BTreeSet;

/// Render requests collected between two frames.
///
/// Several events may ask for the same table before the next draw; the queue
/// keeps one entry per table and the front end drains it once per frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderQueue {
    pending: BTreeSet<TableId>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, table: TableId) {
        self.pending.insert(table);
    }

    /// Queues every `RenderRequested` event and returns the rest untouched.
    pub fn absorb(&mut self, events: Vec<AppEvent>) -> Vec<AppEvent> {
        events
            .into_iter()
            .filter(|event| match event {
                AppEvent::RenderRequested(table) => {
                    self.pending.insert(*table);
                    false
                }
                _ => true,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn drain(&mut self) -> Vec<TableId> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::RenderQueue;
    use crate::model::{EntityKind, Mode, TableId, YearScope};
    use crate::state::AppEvent;

    #[test]
    fn duplicate_requests_coalesce() {
        let table = TableId::new(EntityKind::Artist, YearScope::All);
        let mut queue = RenderQueue::new();
        queue.request(table);
        queue.request(table);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain(), vec![table]);
        assert!(queue.is_empty());
    }

    #[test]
    fn absorb_keeps_non_render_events() {
        let table = TableId::new(EntityKind::Track, YearScope::Year(2022));
        let mut queue = RenderQueue::new();
        let rest = queue.absorb(vec![
            AppEvent::ModeChanged(Mode::Playtime),
            AppEvent::RenderRequested(table),
            AppEvent::RenderRequested(table),
        ]);
        assert_eq!(rest, vec![AppEvent::ModeChanged(Mode::Playtime)]);
        assert_eq!(queue.drain(), vec![table]);
    }
}
