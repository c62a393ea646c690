use crate::events::StartupId;
use parking_lot::Mutex;
use tracing::info;

/// Слой показа сплэшей трекера запусков
pub trait SplashManager: Send + Sync {
    fn raise(&self, startup_id: &StartupId);
    fn lower_all(&self);
    fn prefer_dark(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplashCommand {
    Raise(StartupId),
    LowerAll,
}

/// Менеджер сплэшей, который только журналирует команды
pub struct LoggingSplashManager {
    prefer_dark: bool,
    commands: Mutex<Vec<SplashCommand>>,
}

impl LoggingSplashManager {
    pub fn new(prefer_dark: bool) -> Self {
        Self {
            prefer_dark,
            commands: Mutex::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub fn commands(&self) -> Vec<SplashCommand> {
        self.commands.lock().clone()
    }
}

impl SplashManager for LoggingSplashManager {
    fn raise(&self, startup_id: &StartupId) {
        info!("Поднимаем сплэш [{}]", startup_id);
        self.commands.lock().push(SplashCommand::Raise(startup_id.clone()));
    }

    fn lower_all(&self) {
        info!("Опускаем все сплэши");
        self.commands.lock().push(SplashCommand::LowerAll);
    }

    fn prefer_dark(&self) -> bool {
        self.prefer_dark
    }
}
