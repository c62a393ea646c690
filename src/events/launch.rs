use serde::{Deserialize, Serialize};
use std::fmt;

/// Непрозрачный токен запуска, связывающий запуск с будущим окном
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StartupId(pub String);

impl StartupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StartupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Стадия запуска приложения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStage {
    Started,
    Ready,
    Failed,
}

/// Событие трекера запусков
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchEvent {
    pub stage: LaunchStage,
    pub app_id: String,
    pub startup_id: StartupId,
}

impl LaunchEvent {
    pub fn new(stage: LaunchStage, app_id: impl Into<String>, startup_id: impl Into<String>) -> Self {
        Self {
            stage,
            app_id: app_id.into(),
            startup_id: StartupId::new(startup_id),
        }
    }

    pub fn started(app_id: impl Into<String>, startup_id: impl Into<String>) -> Self {
        Self::new(LaunchStage::Started, app_id, startup_id)
    }

    pub fn ready(app_id: impl Into<String>, startup_id: impl Into<String>) -> Self {
        Self::new(LaunchStage::Ready, app_id, startup_id)
    }

    pub fn failed(app_id: impl Into<String>, startup_id: impl Into<String>) -> Self {
        Self::new(LaunchStage::Failed, app_id, startup_id)
    }
}

impl fmt::Display for LaunchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}' [{}]", self.stage, self.app_id, self.startup_id)
    }
}
