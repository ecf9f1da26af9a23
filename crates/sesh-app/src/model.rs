// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

pub const THEME_PREFERENCE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mode {
    Playcount,
    Playtime,
}

impl Mode {
    pub const ALL: [Self; 2] = [Self::Playcount, Self::Playtime];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Playcount => "playcount",
            Self::Playtime => "playtime",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "playcount" => Some(Self::Playcount),
            "playtime" => Some(Self::Playtime),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Playcount => Self::Playtime,
            Self::Playtime => Self::Playcount,
        }
    }

    pub const fn value_column_label(self) -> &'static str {
        match self {
            Self::Playcount => "Plays",
            Self::Playtime => "Playtime H:M:S ms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Artist,
    Track,
    Album,
}

impl EntityKind {
    pub const ALL: [Self; 3] = [Self::Artist, Self::Track, Self::Album];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Track => "track",
            Self::Album => "album",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "artist" => Some(Self::Artist),
            "track" => Some(Self::Track),
            "album" => Some(Self::Album),
            _ => None,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Artist => "Artists",
            Self::Track => "Tracks",
            Self::Album => "Albums",
        }
    }

    pub const fn column_label(self) -> &'static str {
        match self {
            Self::Artist => "Artist",
            Self::Track => "Track",
            Self::Album => "Album",
        }
    }
}

/// Year tab a table belongs to. `All` sorts before every concrete year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum YearScope {
    All,
    Year(i32),
}

impl YearScope {
    pub fn segment(self) -> String {
        match self {
            Self::All => "all".to_owned(),
            Self::Year(year) => format!("{year:04}"),
        }
    }

    pub fn parse(segment: &str) -> Option<Self> {
        if segment == "all" {
            return Some(Self::All);
        }
        if segment.len() == 4 && segment.bytes().all(|byte| byte.is_ascii_digit()) {
            return segment.parse().ok().map(Self::Year);
        }
        None
    }

    pub fn label(self) -> String {
        match self {
            Self::All => "All".to_owned(),
            Self::Year(year) => year.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId {
    pub entity: EntityKind,
    pub scope: YearScope,
}

impl TableId {
    pub const fn new(entity: EntityKind, scope: YearScope) -> Self {
        Self { entity, scope }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (entity, rest) = value.split_once("-table-")?;
        Some(Self {
            entity: EntityKind::parse(entity)?,
            scope: YearScope::parse(rest)?,
        })
    }

    /// Identifier shared by every year tab of the same entity table.
    pub fn scope_prefix(&self) -> String {
        scope_prefix(&self.to_string()).to_owned()
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-table-{}", self.entity.as_str(), self.scope.segment())
    }
}

/// Strips a trailing `-YYYY` or `-all` segment from a table identifier.
pub fn scope_prefix(table_id: &str) -> &str {
    if let Some(stripped) = table_id.strip_suffix("-all") {
        return stripped;
    }
    if let Some((head, tail)) = table_id.rsplit_once('-')
        && tail.len() == 4
        && tail.bytes().all(|byte| byte.is_ascii_digit())
    {
        return head;
    }
    table_id
}

/// Cache key for an origin row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
    pub table: TableId,
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingKey {
    Theme,
}

impl SettingKey {
    pub const ALL: [Self; 1] = [Self::Theme];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Theme => THEME_PREFERENCE_KEY,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            THEME_PREFERENCE_KEY => Some(Self::Theme),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Theme => "color theme",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    Theme(Theme),
}

impl SettingValue {
    pub fn parse_for_key(key: SettingKey, raw: &str) -> Option<Self> {
        match key {
            SettingKey::Theme => Theme::parse(raw).map(Self::Theme),
        }
    }

    pub fn to_storage(&self, key: SettingKey) -> Option<String> {
        match (key, self) {
            (SettingKey::Theme, Self::Theme(theme)) => Some(theme.as_str().to_owned()),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Theme(theme) => theme.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSetting {
    pub key: SettingKey,
    pub value: SettingValue,
}

/// Focusable regions of the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Artists,
    Tracks,
    Albums,
    Heatmap,
    OnThisDay,
}

impl Panel {
    pub const ALL: [Self; 5] = [
        Self::Artists,
        Self::Tracks,
        Self::Albums,
        Self::Heatmap,
        Self::OnThisDay,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Artists => "artists",
            Self::Tracks => "tracks",
            Self::Albums => "albums",
            Self::Heatmap => "heatmap",
            Self::OnThisDay => "on this day",
        }
    }

    pub const fn entity(self) -> Option<EntityKind> {
        match self {
            Self::Artists => Some(EntityKind::Artist),
            Self::Tracks => Some(EntityKind::Track),
            Self::Albums => Some(EntityKind::Album),
            Self::Heatmap | Self::OnThisDay => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalKind {
    Settings,
    Help,
    Info,
    EveryYearArtists,
    DayDetail,
}

impl ModalKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Help => "help",
            Self::Info => "info",
            Self::EveryYearArtists => "every-year artists",
            Self::DayDetail => "day",
        }
    }

    /// Controls the focus trap cycles through, in tab order.
    pub const fn focusables(self) -> &'static [ModalControl] {
        match self {
            Self::Settings => &[
                ModalControl::ThemeToggle,
                ModalControl::ModeToggle,
                ModalControl::Close,
            ],
            Self::Info => &[ModalControl::ShowEveryYearArtists, ModalControl::Close],
            Self::Help | Self::EveryYearArtists | Self::DayDetail => &[ModalControl::Close],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalControl {
    ThemeToggle,
    ModeToggle,
    ShowEveryYearArtists,
    Close,
}

impl ModalControl {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ThemeToggle => "dark theme",
            Self::ModeToggle => "rank by playtime",
            Self::ShowEveryYearArtists => "show every-year artists",
            Self::Close => "close",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EntityKind, Mode, SettingKey, SettingValue, TableId, Theme, YearScope, scope_prefix,
    };

    #[test]
    fn table_id_formats_and_parses() {
        let id = TableId::new(EntityKind::Track, YearScope::Year(2023));
        assert_eq!(id.to_string(), "track-table-2023");
        assert_eq!(TableId::parse("track-table-2023"), Some(id));
        assert_eq!(
            TableId::parse("album-table-all"),
            Some(TableId::new(EntityKind::Album, YearScope::All))
        );
        assert_eq!(TableId::parse("album-table-20x3"), None);
        assert_eq!(TableId::parse("song-table-all"), None);
    }

    #[test]
    fn scope_prefix_strips_year_and_all_suffixes() {
        assert_eq!(scope_prefix("artist-table-2023"), "artist-table");
        assert_eq!(scope_prefix("artist-table-all"), "artist-table");
        assert_eq!(scope_prefix("artist-table"), "artist-table");
        assert_eq!(scope_prefix("artist-table-123"), "artist-table-123");

        let all = TableId::new(EntityKind::Artist, YearScope::All);
        let year = TableId::new(EntityKind::Artist, YearScope::Year(2019));
        assert_eq!(all.scope_prefix(), year.scope_prefix());
    }

    #[test]
    fn year_scope_all_sorts_first() {
        let mut scopes = vec![YearScope::Year(2021), YearScope::All, YearScope::Year(2019)];
        scopes.sort();
        assert_eq!(
            scopes,
            vec![YearScope::All, YearScope::Year(2019), YearScope::Year(2021)]
        );
    }

    #[test]
    fn mode_and_theme_toggle() {
        assert_eq!(Mode::Playcount.toggled(), Mode::Playtime);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Mode::parse("playtime"), Some(Mode::Playtime));
        assert_eq!(Theme::parse(" Dark "), Some(Theme::Dark));
    }

    #[test]
    fn theme_setting_parse_and_storage_round_trip() {
        let parsed =
            SettingValue::parse_for_key(SettingKey::Theme, "light").expect("parse theme setting");
        assert_eq!(parsed, SettingValue::Theme(Theme::Light));
        assert_eq!(
            parsed.to_storage(SettingKey::Theme),
            Some("light".to_owned())
        );
        assert!(SettingValue::parse_for_key(SettingKey::Theme, "sepia").is_none());
    }
}
