use crate::config::ScreenConfig;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

/// Область экрана, доступная окнам (без панелей оболочки)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsableArea {
    pub width: i32,
    pub height: i32,
}

/// Состояние оболочки, нужное обзору. Все чтения синхронные и без побочных эффектов
pub trait Shell: Send + Sync {
    fn usable_area(&self) -> UsableArea;
    fn scale_factor(&self) -> i32;
    fn is_overview_visible(&self) -> bool;
    fn is_docked(&self) -> bool;
    fn trigger_feedback(&self, event: &str);
}

#[derive(Debug, Clone)]
struct ShellState {
    usable_area: UsableArea,
    scale_factor: i32,
    overview_visible: bool,
    docked: bool,
}

pub struct StaticShell {
    state: RwLock<ShellState>,
    feedback: Mutex<Vec<String>>,
}

impl StaticShell {
    pub fn new(usable_area: UsableArea, scale_factor: i32) -> Self {
        Self {
            state: RwLock::new(ShellState {
                usable_area,
                scale_factor,
                overview_visible: false,
                docked: false,
            }),
            feedback: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &ScreenConfig) -> Self {
        let shell = Self::new(
            UsableArea {
                width: config.usable_width,
                height: config.usable_height,
            },
            config.scale_factor,
        );
        shell.set_overview_visible(config.overview_visible);
        shell.set_docked(config.docked);
        shell
    }

    pub fn set_overview_visible(&self, visible: bool) {
        self.state.write().overview_visible = visible;
    }

    pub fn set_docked(&self, docked: bool) {
        self.state.write().docked = docked;
    }

    pub fn set_usable_area(&self, width: i32, height: i32) {
        self.state.write().usable_area = UsableArea { width, height };
    }

    #[cfg(test)]
    pub fn feedback(&self) -> Vec<String> {
        self.feedback.lock().clone()
    }
}

impl Shell for StaticShell {
    fn usable_area(&self) -> UsableArea {
        self.state.read().usable_area
    }

    fn scale_factor(&self) -> i32 {
        self.state.read().scale_factor
    }

    fn is_overview_visible(&self) -> bool {
        self.state.read().overview_visible
    }

    fn is_docked(&self) -> bool {
        self.state.read().docked
    }

    fn trigger_feedback(&self, event: &str) {
        debug!("Обратная связь: {}", event);
        self.feedback.lock().push(event.to_string());
    }
}
