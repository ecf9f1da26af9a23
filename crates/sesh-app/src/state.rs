// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{EntityKind, ModalControl, ModalKind, Mode, Panel, TableId, Theme, YearScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalState {
    pub kind: ModalKind,
    pub focus: usize,
    /// Panel that held focus before the modal opened.
    pub return_focus: Panel,
}

impl ModalState {
    pub fn focused_control(&self) -> Option<ModalControl> {
        self.kind.focusables().get(self.focus).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub theme: Theme,
    pub mode: Mode,
    pub years: Vec<YearScope>,
    pub active_year: YearScope,
    pub panel: Panel,
    pub modal: Option<ModalState>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            mode: Mode::Playcount,
            years: vec![YearScope::All],
            active_year: YearScope::All,
            panel: Panel::Artists,
            modal: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    ToggleTheme,
    SetTheme(Theme),
    ToggleMode,
    SetMode(Mode),
    SelectYear(YearScope),
    NextYear,
    PrevYear,
    OpenModal(ModalKind),
    CloseModal,
    FocusNext,
    FocusPrev,
    FocusPanel(Panel),
    NextPanel,
    PrevPanel,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ThemeChanged(Theme),
    ModeChanged(Mode),
    YearChanged(YearScope),
    ModalOpened(ModalKind),
    ModalClosed(ModalKind),
    FocusMoved(ModalControl),
    PanelChanged(Panel),
    RenderRequested(TableId),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    /// Year tabs are sorted with `All` first and deduplicated.
    pub fn new(mut years: Vec<YearScope>, theme: Theme, mode: Mode) -> Self {
        years.push(YearScope::All);
        years.sort();
        years.dedup();
        Self {
            theme,
            mode,
            years,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::ToggleTheme => self.apply_theme(self.theme.toggled()),
            AppCommand::SetTheme(theme) => self.apply_theme(theme),
            AppCommand::ToggleMode => self.apply_mode(self.mode.toggled()),
            AppCommand::SetMode(mode) => self.apply_mode(mode),
            AppCommand::SelectYear(year) => self.select_year(year),
            AppCommand::NextYear => self.rotate_year(1),
            AppCommand::PrevYear => self.rotate_year(-1),
            AppCommand::OpenModal(kind) => self.open_modal(kind),
            AppCommand::CloseModal => self.close_modal(),
            AppCommand::FocusNext => self.rotate_focus(1),
            AppCommand::FocusPrev => self.rotate_focus(-1),
            AppCommand::FocusPanel(panel) => self.focus_panel(panel),
            AppCommand::NextPanel => self.rotate_panel(1),
            AppCommand::PrevPanel => self.rotate_panel(-1),
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// The three entity tables of the active year tab.
    pub fn visible_tables(&self) -> Vec<TableId> {
        EntityKind::ALL
            .iter()
            .map(|entity| TableId::new(*entity, self.active_year))
            .collect()
    }

    pub fn active_table(&self) -> Option<TableId> {
        self.panel
            .entity()
            .map(|entity| TableId::new(entity, self.active_year))
    }

    pub fn aria_selected(&self, year: YearScope) -> bool {
        self.active_year == year
    }

    pub fn aria_hidden(&self, kind: ModalKind) -> bool {
        self.modal.is_none_or(|modal| modal.kind != kind)
    }

    pub fn focused_control(&self) -> Option<ModalControl> {
        self.modal.and_then(|modal| modal.focused_control())
    }

    fn apply_theme(&mut self, theme: Theme) -> Vec<AppEvent> {
        self.theme = theme;
        let label = format!("{} theme", theme.as_str());
        vec![AppEvent::ThemeChanged(theme), self.set_status(&label)]
    }

    fn apply_mode(&mut self, mode: Mode) -> Vec<AppEvent> {
        self.mode = mode;
        let mut events = vec![AppEvent::ModeChanged(mode)];
        events.extend(self.render_visible());
        events.push(self.set_status(&format!("ranking by {}", mode.as_str())));
        events
    }

    fn select_year(&mut self, year: YearScope) -> Vec<AppEvent> {
        if !self.years.contains(&year) {
            return vec![self.set_status(&format!("no listening data for {}", year.label()))];
        }
        self.active_year = year;
        let mut events = vec![AppEvent::YearChanged(year)];
        events.extend(self.render_visible());
        events
    }

    fn rotate_year(&mut self, delta: isize) -> Vec<AppEvent> {
        let current = self
            .years
            .iter()
            .position(|year| *year == self.active_year)
            .unwrap_or(0) as isize;
        let len = self.years.len().max(1) as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        match self.years.get(next).copied() {
            Some(year) => self.select_year(year),
            None => Vec::new(),
        }
    }

    fn open_modal(&mut self, kind: ModalKind) -> Vec<AppEvent> {
        let return_focus = self.modal.map_or(self.panel, |modal| modal.return_focus);
        let mut events = Vec::new();
        if let Some(previous) = self.modal
            && previous.kind != kind
        {
            events.push(AppEvent::ModalClosed(previous.kind));
        }
        let modal = ModalState {
            kind,
            focus: 0,
            return_focus,
        };
        self.modal = Some(modal);
        events.push(AppEvent::ModalOpened(kind));
        if let Some(control) = modal.focused_control() {
            events.push(AppEvent::FocusMoved(control));
        }
        events
    }

    fn close_modal(&mut self) -> Vec<AppEvent> {
        let Some(modal) = self.modal.take() else {
            return Vec::new();
        };
        self.panel = modal.return_focus;
        vec![
            AppEvent::ModalClosed(modal.kind),
            AppEvent::PanelChanged(self.panel),
        ]
    }

    /// Cycles focus inside the open modal, wrapping at both ends.
    fn rotate_focus(&mut self, delta: isize) -> Vec<AppEvent> {
        let Some(modal) = self.modal.as_mut() else {
            return self.rotate_panel(delta);
        };
        let len = modal.kind.focusables().len() as isize;
        if len == 0 {
            return Vec::new();
        }
        modal.focus = (modal.focus as isize + delta).rem_euclid(len) as usize;
        modal
            .focused_control()
            .map(AppEvent::FocusMoved)
            .into_iter()
            .collect()
    }

    fn focus_panel(&mut self, panel: Panel) -> Vec<AppEvent> {
        if self.modal.is_some() {
            return Vec::new();
        }
        self.panel = panel;
        vec![AppEvent::PanelChanged(panel)]
    }

    fn rotate_panel(&mut self, delta: isize) -> Vec<AppEvent> {
        if self.modal.is_some() {
            return self.rotate_focus(delta);
        }
        let panels = Panel::ALL;
        let current = panels
            .iter()
            .position(|panel| *panel == self.panel)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(panels.len() as isize) as usize;
        self.focus_panel(panels[next])
    }

    fn render_visible(&self) -> Vec<AppEvent> {
        self.visible_tables()
            .into_iter()
            .map(AppEvent::RenderRequested)
            .collect()
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::model::{
        EntityKind, ModalControl, ModalKind, Mode, Panel, TableId, Theme, YearScope,
    };

    fn state_with_years() -> AppState {
        AppState::new(
            vec![YearScope::Year(2023), YearScope::Year(2021), YearScope::Year(2023)],
            Theme::Dark,
            Mode::Playcount,
        )
    }

    #[test]
    fn years_are_sorted_with_all_first() {
        let state = state_with_years();
        assert_eq!(
            state.years,
            vec![YearScope::All, YearScope::Year(2021), YearScope::Year(2023)]
        );
        assert!(state.aria_selected(YearScope::All));
        assert!(!state.aria_selected(YearScope::Year(2021)));
    }

    #[test]
    fn theme_toggle_reports_change() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::ToggleTheme);
        assert_eq!(state.theme, Theme::Light);
        assert_eq!(
            events,
            vec![
                AppEvent::ThemeChanged(Theme::Light),
                AppEvent::StatusUpdated("light theme".to_owned()),
            ]
        );
    }

    #[test]
    fn mode_switch_requests_visible_tables() {
        let mut state = state_with_years();
        state.dispatch(AppCommand::SelectYear(YearScope::Year(2021)));
        let events = state.dispatch(AppCommand::ToggleMode);
        assert_eq!(state.mode, Mode::Playtime);
        assert_eq!(events[0], AppEvent::ModeChanged(Mode::Playtime));
        let requested = events
            .iter()
            .filter_map(|event| match event {
                AppEvent::RenderRequested(table) => Some(*table),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            requested,
            EntityKind::ALL
                .iter()
                .map(|entity| TableId::new(*entity, YearScope::Year(2021)))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn year_rotation_wraps_and_ignores_unknown_years() {
        let mut state = state_with_years();
        state.dispatch(AppCommand::PrevYear);
        assert_eq!(state.active_year, YearScope::Year(2023));
        state.dispatch(AppCommand::NextYear);
        assert_eq!(state.active_year, YearScope::All);

        let events = state.dispatch(AppCommand::SelectYear(YearScope::Year(1999)));
        assert_eq!(state.active_year, YearScope::All);
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated(
                "no listening data for 1999".to_owned()
            )]
        );
    }

    #[test]
    fn modal_traps_focus_and_restores_panel() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::FocusPanel(Panel::Heatmap));

        let opened = state.dispatch(AppCommand::OpenModal(ModalKind::Settings));
        assert_eq!(
            opened,
            vec![
                AppEvent::ModalOpened(ModalKind::Settings),
                AppEvent::FocusMoved(ModalControl::ThemeToggle),
            ]
        );
        assert!(!state.aria_hidden(ModalKind::Settings));
        assert!(state.aria_hidden(ModalKind::Help));

        state.dispatch(AppCommand::FocusPrev);
        assert_eq!(state.focused_control(), Some(ModalControl::Close));
        state.dispatch(AppCommand::FocusNext);
        assert_eq!(state.focused_control(), Some(ModalControl::ThemeToggle));

        // Panel navigation stays inside the modal.
        state.dispatch(AppCommand::NextPanel);
        assert_eq!(state.focused_control(), Some(ModalControl::ModeToggle));
        assert!(state.dispatch(AppCommand::FocusPanel(Panel::Albums)).is_empty());
        assert_eq!(state.panel, Panel::Heatmap);

        let closed = state.dispatch(AppCommand::CloseModal);
        assert_eq!(
            closed,
            vec![
                AppEvent::ModalClosed(ModalKind::Settings),
                AppEvent::PanelChanged(Panel::Heatmap),
            ]
        );
        assert!(state.aria_hidden(ModalKind::Settings));
        assert!(state.dispatch(AppCommand::CloseModal).is_empty());
    }

    #[test]
    fn switching_modals_keeps_original_return_focus() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::FocusPanel(Panel::Tracks));
        state.dispatch(AppCommand::OpenModal(ModalKind::Help));
        let events = state.dispatch(AppCommand::OpenModal(ModalKind::Info));
        assert_eq!(events[0], AppEvent::ModalClosed(ModalKind::Help));
        state.dispatch(AppCommand::CloseModal);
        assert_eq!(state.panel, Panel::Tracks);
    }

    #[test]
    fn panel_rotation_wraps() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::PrevPanel);
        assert_eq!(state.panel, Panel::OnThisDay);
        assert_eq!(events, vec![AppEvent::PanelChanged(Panel::OnThisDay)]);
        assert_eq!(state.active_table(), None);
        state.dispatch(AppCommand::NextPanel);
        assert_eq!(
            state.active_table(),
            Some(TableId::new(EntityKind::Artist, YearScope::All))
        );
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetStatus("saved".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("saved"));
        assert_eq!(
            state.dispatch(AppCommand::ClearStatus),
            vec![AppEvent::StatusCleared]
        );
        assert_eq!(state.status_line, None);
    }
}
