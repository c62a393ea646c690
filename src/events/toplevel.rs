use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор окна в реестре композитора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToplevelId(pub u64);

impl fmt::Display for ToplevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toplevel-{}", self.0)
    }
}

/// Снимок состояния окна, как его сообщает реестр
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToplevelInfo {
    pub id: ToplevelId,
    pub app_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub parent: Option<ToplevelId>,
    #[serde(default)]
    pub maximized: bool,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub activated: bool,
}

impl ToplevelInfo {
    pub fn new(id: u64, app_id: impl Into<String>) -> Self {
        Self {
            id: ToplevelId(id),
            app_id: app_id.into(),
            title: String::new(),
            parent: None,
            maximized: false,
            fullscreen: false,
            activated: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_parent(mut self, parent: ToplevelId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn with_activated(mut self, activated: bool) -> Self {
        self.activated = activated;
        self
    }
}

impl fmt::Display for ToplevelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{} ({})", self.id, self.app_id)
        } else {
            write!(f, "{} \"{}\" ({})", self.id, self.title, self.app_id)
        }
    }
}

/// События жизненного цикла окон
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToplevelEvent {
    Added(ToplevelInfo),
    Changed(ToplevelInfo),
    Closed { id: ToplevelId },
    ActivatedChanged(ToplevelInfo),
}

impl fmt::Display for ToplevelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToplevelEvent::Added(info) => write!(f, "added {}", info),
            ToplevelEvent::Changed(info) => write!(f, "changed {}", info),
            ToplevelEvent::Closed { id } => write!(f, "closed {}", id),
            ToplevelEvent::ActivatedChanged(info) => {
                write!(f, "activated={} {}", info.activated, info)
            }
        }
    }
}
