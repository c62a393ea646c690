use crate::config::AppsConfig;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Метаданные приложения. Две записи равны, если совпадает desktop id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppInfo {
    pub desktop_id: String,
}

impl AppInfo {
    pub fn new(desktop_id: impl Into<String>) -> Self {
        Self {
            desktop_id: desktop_id.into(),
        }
    }
}

impl fmt::Display for AppInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.desktop_id)
    }
}

/// Преобразование app id окна или запуска в метаданные приложения
pub trait AppInfoResolver: Send + Sync {
    fn app_info_for_app_id(&self, app_id: &str) -> Option<AppInfo>;
}

/// Резолвер по списку известных приложений из конфигурации.
/// Пустой список означает "любое непустое app id".
pub struct KnownAppsResolver {
    known: HashSet<String>,
}

impl KnownAppsResolver {
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            known: known
                .into_iter()
                .map(|id| Self::strip_suffix(id.as_ref()).to_string())
                .collect(),
        }
    }

    pub fn from_config(config: &AppsConfig) -> Self {
        Self::new(&config.known)
    }

    fn strip_suffix(app_id: &str) -> &str {
        app_id.strip_suffix(".desktop").unwrap_or(app_id)
    }

    fn lookup(&self, app_id: &str) -> Option<String> {
        if self.known.is_empty() || self.known.contains(app_id) {
            return Some(app_id.to_string());
        }

        // Некоторые клиенты сообщают app id в другом регистре
        let lower = app_id.to_lowercase();
        self.known
            .iter()
            .find(|known| known.to_lowercase() == lower)
            .cloned()
    }
}

impl AppInfoResolver for KnownAppsResolver {
    fn app_info_for_app_id(&self, app_id: &str) -> Option<AppInfo> {
        let app_id = Self::strip_suffix(app_id.trim());
        if app_id.is_empty() {
            return None;
        }

        match self.lookup(app_id) {
            Some(id) => Some(AppInfo::new(format!("{}.desktop", id))),
            None => {
                debug!("Нет desktop-файла для '{}'", app_id);
                None
            }
        }
    }
}
