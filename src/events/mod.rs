pub mod launch;
pub mod toplevel;
pub mod ui;

pub use launch::{LaunchEvent, LaunchStage, StartupId};
pub use toplevel::{ToplevelEvent, ToplevelId, ToplevelInfo};
pub use ui::{ActivityRef, EventPropagation, OverviewSignal, SearchInput, UiEvent};

use crate::overview::ActivityId;
use crate::services::ThumbnailRequestId;
use std::fmt;
use std::time::Instant;

/// Единственный тип событий, поступающих в движок синхронизации
#[derive(Debug, Clone, PartialEq)]
pub enum OverviewEvent {
    Toplevel(ToplevelEvent),
    Launch(LaunchEvent),
    Ui(UiEvent),
    /// Готова миниатюра, запрошенная конкретной активностью
    ThumbnailReady {
        activity: ActivityId,
        request: ThumbnailRequestId,
    },
    /// Периодический тик для очистки зависших запусков
    Tick(Instant),
}

impl From<ToplevelEvent> for OverviewEvent {
    fn from(event: ToplevelEvent) -> Self {
        OverviewEvent::Toplevel(event)
    }
}

impl From<LaunchEvent> for OverviewEvent {
    fn from(event: LaunchEvent) -> Self {
        OverviewEvent::Launch(event)
    }
}

impl From<UiEvent> for OverviewEvent {
    fn from(event: UiEvent) -> Self {
        OverviewEvent::Ui(event)
    }
}

impl fmt::Display for OverviewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverviewEvent::Toplevel(event) => write!(f, "toplevel: {}", event),
            OverviewEvent::Launch(event) => write!(f, "launch: {}", event),
            OverviewEvent::Ui(event) => write!(f, "ui: {:?}", event),
            OverviewEvent::ThumbnailReady { activity, request } => {
                write!(f, "thumbnail {} ready for {:?}", request, activity)
            }
            OverviewEvent::Tick(_) => f.write_str("tick"),
        }
    }
}
