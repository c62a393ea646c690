//! Toplevel registry: the authoritative list of open windows.
//!
//! The overview only consumes this interface. The in-memory registry below
//! stands in for the compositor in dry-run and replay modes and echoes the
//! events a compositor would send back after `activate`/`close`/`fullscreen`.

use crate::events::{OverviewEvent, ToplevelEvent, ToplevelId, ToplevelInfo};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

pub trait ToplevelManager: Send + Sync {
    fn num_toplevels(&self) -> usize;
    fn toplevel(&self, index: usize) -> Option<ToplevelInfo>;
    fn get(&self, id: &ToplevelId) -> Option<ToplevelInfo>;

    /// Родительское окно, если окно сообщает о нём
    fn parent(&self, toplevel: &ToplevelInfo) -> Option<ToplevelInfo> {
        toplevel.parent.as_ref().and_then(|parent| self.get(parent))
    }

    fn activate(&self, id: &ToplevelId);
    fn close(&self, id: &ToplevelId);
    fn fullscreen(&self, id: &ToplevelId, fullscreen: bool);
}

/// Команды, отправленные реестру
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToplevelCommand {
    Activate(ToplevelId),
    Close(ToplevelId),
    Fullscreen(ToplevelId, bool),
}

pub struct InMemoryToplevelManager {
    toplevels: RwLock<Vec<ToplevelInfo>>,
    commands: Mutex<Vec<ToplevelCommand>>,
    events: Option<UnboundedSender<OverviewEvent>>,
}

impl Default for InMemoryToplevelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryToplevelManager {
    pub fn new() -> Self {
        Self {
            toplevels: RwLock::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
            events: None,
        }
    }

    /// Реестр, который отвечает событиями на команды (как настоящий композитор)
    pub fn with_events(mut self, events: UnboundedSender<OverviewEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn add(&self, info: ToplevelInfo) {
        let mut toplevels = self.toplevels.write();
        if info.activated {
            for other in toplevels.iter_mut() {
                other.activated = false;
            }
        }
        match toplevels.iter_mut().find(|t| t.id == info.id) {
            Some(existing) => *existing = info,
            None => toplevels.push(info),
        }
    }

    pub fn update(&self, info: ToplevelInfo) {
        self.add(info);
    }

    pub fn remove(&self, id: &ToplevelId) -> Option<ToplevelInfo> {
        let mut toplevels = self.toplevels.write();
        let pos = toplevels.iter().position(|t| t.id == *id)?;
        Some(toplevels.remove(pos))
    }

    #[cfg(test)]
    pub fn commands(&self) -> Vec<ToplevelCommand> {
        self.commands.lock().clone()
    }

    fn record(&self, command: ToplevelCommand) {
        debug!("Команда реестру окон: {:?}", command);
        self.commands.lock().push(command);
    }

    fn emit(&self, event: ToplevelEvent) {
        if let Some(events) = &self.events {
            if events.send(OverviewEvent::Toplevel(event)).is_err() {
                warn!("Получатель событий окон уже закрыт");
            }
        }
    }
}

impl ToplevelManager for InMemoryToplevelManager {
    fn num_toplevels(&self) -> usize {
        self.toplevels.read().len()
    }

    fn toplevel(&self, index: usize) -> Option<ToplevelInfo> {
        self.toplevels.read().get(index).cloned()
    }

    fn get(&self, id: &ToplevelId) -> Option<ToplevelInfo> {
        self.toplevels.read().iter().find(|t| t.id == *id).cloned()
    }

    fn activate(&self, id: &ToplevelId) {
        self.record(ToplevelCommand::Activate(*id));

        let changed: Vec<ToplevelInfo> = {
            let mut toplevels = self.toplevels.write();
            if !toplevels.iter().any(|t| t.id == *id) {
                warn!("Активация неизвестного окна {}", id);
                return;
            }
            toplevels
                .iter_mut()
                .filter(|t| t.activated != (t.id == *id))
                .map(|t| {
                    t.activated = t.id == *id;
                    t.clone()
                })
                .collect()
        };

        for info in changed {
            self.emit(ToplevelEvent::ActivatedChanged(info));
        }
    }

    fn close(&self, id: &ToplevelId) {
        self.record(ToplevelCommand::Close(*id));

        match self.remove(id) {
            Some(info) => {
                info!("Окно закрыто: {}", info);
                self.emit(ToplevelEvent::Closed { id: *id });
            }
            None => warn!("Закрытие неизвестного окна {}", id),
        }
    }

    fn fullscreen(&self, id: &ToplevelId, fullscreen: bool) {
        self.record(ToplevelCommand::Fullscreen(*id, fullscreen));

        let changed = {
            let mut toplevels = self.toplevels.write();
            toplevels.iter_mut().find(|t| t.id == *id).and_then(|t| {
                if t.fullscreen == fullscreen {
                    return None;
                }
                t.fullscreen = fullscreen;
                Some(t.clone())
            })
        };

        if let Some(info) = changed {
            self.emit(ToplevelEvent::Changed(info));
        }
    }
}
