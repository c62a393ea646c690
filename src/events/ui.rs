use crate::overview::ActivityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ссылка на активность со стороны UI: по хэндлу или по номеру страницы карусели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityRef {
    Id(ActivityId),
    Page(usize),
}

impl From<ActivityId> for ActivityRef {
    fn from(id: ActivityId) -> Self {
        ActivityRef::Id(id)
    }
}

impl fmt::Display for ActivityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityRef::Id(id) => write!(f, "{:?}", id),
            ActivityRef::Page(page) => write!(f, "page #{}", page),
        }
    }
}

/// Действия пользователя и оболочки над обзором
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiEvent {
    Clicked { activity: ActivityRef },
    CloseRequested { activity: ActivityRef },
    FullscreenRequested { activity: ActivityRef, fullscreen: bool },
    Resized { activity: ActivityRef, width: i32, height: i32 },
    FocusChanged { activity: ActivityRef, has_focus: bool },
    /// `None`: карусель пуста
    PageChanged { index: Option<usize> },
    AppLaunched { app_id: String },
    SelectionAborted,
    UsableAreaChanged { width: i32, height: i32 },
    /// Перезапрос миниатюры активного окна
    Refresh,
    /// Сброс сетки приложений
    Reset,
    FocusAppSearch,
    Search { input: SearchInput },
}

/// Ввод для поиска в сетке приложений
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchInput {
    Char(char),
    Backspace,
    Escape,
    Other,
}

/// Поглощено ли событие ввода
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPropagation {
    Stop,
    Proceed,
}

/// Уведомления, которые обзор отдаёт наружу (UI-слою)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewSignal {
    ActivityLaunched,
    ActivityRaised,
    ActivityClosed,
    SelectionAborted,
    HasActivitiesChanged(bool),
}

impl fmt::Display for OverviewSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverviewSignal::ActivityLaunched => f.write_str("activity-launched"),
            OverviewSignal::ActivityRaised => f.write_str("activity-raised"),
            OverviewSignal::ActivityClosed => f.write_str("activity-closed"),
            OverviewSignal::SelectionAborted => f.write_str("selection-aborted"),
            OverviewSignal::HasActivitiesChanged(value) => write!(f, "has-activities={}", value),
        }
    }
}
