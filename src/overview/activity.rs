use crate::events::{StartupId, ToplevelId, ToplevelInfo};
use crate::services::{AppInfo, ThumbnailRequestId, UsableArea};
use slotmap::new_key_type;
use std::fmt;
use std::time::{Duration, Instant};

new_key_type! {
    /// Хэндл активности в карусели. Становится недействительным после удаления
    pub struct ActivityId;
}

/// Подсказка о геометрии окна для отрисовки карточки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryHint {
    pub width: i32,
    pub height: i32,
    pub maximized: bool,
    pub fullscreen: bool,
}

impl GeometryHint {
    pub fn from_area(area: UsableArea) -> Self {
        Self {
            width: area.width,
            height: area.height,
            maximized: false,
            fullscreen: false,
        }
    }

    pub fn with_window_state(mut self, toplevel: &ToplevelInfo) -> Self {
        self.maximized = toplevel.maximized;
        self.fullscreen = toplevel.fullscreen;
        self
    }
}

/// Размер области миниатюры в карточке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub width: i32,
    pub height: i32,
}

/// Карточка либо ждёт окно запущенного приложения, либо уже показывает окно
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityState {
    Launching {
        startup_id: StartupId,
        started_at: Instant,
    },
    Running {
        toplevel: ToplevelId,
        pending_thumbnail: Option<ThumbnailRequestId>,
    },
}

#[derive(Debug, Clone)]
pub struct Activity {
    pub app_id: Option<String>,
    pub app_info: Option<AppInfo>,
    pub parent_app_id: Option<String>,
    pub title: String,
    pub geometry: GeometryHint,
    /// Светлое оформление сплэша, если тема не тёмная
    pub light_style: bool,
    pub has_thumbnail: bool,
    pub thumbnail_allocation: Option<Allocation>,
    state: ActivityState,
}

impl Activity {
    pub fn launching(
        app_id: &str,
        app_info: AppInfo,
        startup_id: StartupId,
        geometry: GeometryHint,
        started_at: Instant,
    ) -> Self {
        Self {
            app_id: Some(app_id.to_string()),
            app_info: Some(app_info),
            parent_app_id: None,
            title: String::new(),
            geometry,
            light_style: false,
            has_thumbnail: false,
            thumbnail_allocation: None,
            state: ActivityState::Launching {
                startup_id,
                started_at,
            },
        }
    }

    pub fn running(
        toplevel: &ToplevelInfo,
        app_info: Option<AppInfo>,
        parent_app_id: Option<String>,
        geometry: GeometryHint,
    ) -> Self {
        Self {
            app_id: Some(toplevel.app_id.clone()),
            app_info,
            parent_app_id,
            title: toplevel.title.clone(),
            geometry: geometry.with_window_state(toplevel),
            light_style: false,
            has_thumbnail: false,
            thumbnail_allocation: None,
            state: ActivityState::Running {
                toplevel: toplevel.id,
                pending_thumbnail: None,
            },
        }
    }

    pub fn toplevel(&self) -> Option<ToplevelId> {
        match &self.state {
            ActivityState::Running { toplevel, .. } => Some(*toplevel),
            ActivityState::Launching { .. } => None,
        }
    }

    pub fn startup_id(&self) -> Option<&StartupId> {
        match &self.state {
            ActivityState::Launching { startup_id, .. } => Some(startup_id),
            ActivityState::Running { .. } => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ActivityState::Running { .. })
    }

    /// Запуск, который ждёт окно дольше `timeout`
    pub fn launch_expired(&self, now: Instant, timeout: Duration) -> bool {
        match &self.state {
            ActivityState::Launching { started_at, .. } => now.saturating_duration_since(*started_at) >= timeout,
            ActivityState::Running { .. } => false,
        }
    }

    /// Переход сплэша в карточку окна: startup-id сбрасывается, окно привязывается
    pub fn bind_toplevel(&mut self, toplevel: &ToplevelInfo, area: UsableArea) {
        self.app_id = Some(toplevel.app_id.clone());
        self.title = toplevel.title.clone();
        self.geometry = GeometryHint::from_area(area).with_window_state(toplevel);
        self.light_style = false;
        self.state = ActivityState::Running {
            toplevel: toplevel.id,
            pending_thumbnail: None,
        };
    }

    /// Возвращает предыдущий незавершённый запрос, который нужно отменить
    pub fn replace_pending_thumbnail(&mut self, request: ThumbnailRequestId) -> Option<ThumbnailRequestId> {
        match &mut self.state {
            ActivityState::Running { pending_thumbnail, .. } => pending_thumbnail.replace(request),
            ActivityState::Launching { .. } => Some(request),
        }
    }

    pub fn take_pending_thumbnail(&mut self) -> Option<ThumbnailRequestId> {
        match &mut self.state {
            ActivityState::Running { pending_thumbnail, .. } => pending_thumbnail.take(),
            ActivityState::Launching { .. } => None,
        }
    }

    /// Принимает миниатюру только по текущему запросу
    pub fn thumbnail_ready(&mut self, request: ThumbnailRequestId) -> bool {
        match &mut self.state {
            ActivityState::Running { pending_thumbnail, .. } if *pending_thumbnail == Some(request) => {
                *pending_thumbnail = None;
                self.has_thumbnail = true;
                true
            }
            _ => false,
        }
    }

    pub fn thumbnail_size(&self) -> Allocation {
        self.thumbnail_allocation.unwrap_or(Allocation {
            width: self.geometry.width,
            height: self.geometry.height,
        })
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let app_id = self.app_id.as_deref().unwrap_or("?");
        match &self.state {
            ActivityState::Launching { startup_id, .. } => write!(f, "'{}' [splash {}]", app_id, startup_id),
            ActivityState::Running { toplevel, .. } => write!(f, "'{}' [{}]", app_id, toplevel),
        }
    }
}
