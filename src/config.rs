use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub screen: ScreenConfig,
    pub launch: LaunchConfig,
    pub apps: AppsConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub usable_width: i32,
    pub usable_height: i32,
    pub scale_factor: i32,
    pub prefer_dark: bool,
    pub docked: bool,
    pub overview_visible: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Сколько сплэш ждёт окно; 0: без ограничения
    pub timeout_ms: u64,
    pub sweep_interval_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppsConfig {
    /// Известные desktop id; пустой список: принимаем любые app id
    pub known: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub mode: String,
    pub replay_path: Option<PathBuf>,
    pub dry_run_interval_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            filter: "phone_overview=info".to_string(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            usable_width: 360,
            usable_height: 648,
            scale_factor: 2,
            prefer_dark: true,
            docked: false,
            overview_visible: false,
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            sweep_interval_ms: 1_000,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: "dry_run".to_string(),
            replay_path: None,
            dry_run_interval_ms: 1_000,
        }
    }
}

impl LaunchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("OVERVIEW_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация экрана
        if self.screen.usable_width <= 0 || self.screen.usable_height <= 0 {
            anyhow::bail!(
                "Неверная полезная область экрана: {}x{}",
                self.screen.usable_width,
                self.screen.usable_height
            );
        }

        if !(1..=4).contains(&self.screen.scale_factor) {
            anyhow::bail!("scale_factor должен быть от 1 до 4, получено {}", self.screen.scale_factor);
        }

        // Валидация запусков
        if self.launch.sweep_interval_ms < 100 {
            anyhow::bail!("sweep_interval_ms должно быть минимум 100");
        }

        if self.launch.timeout_ms > 0 && self.launch.timeout_ms < self.launch.sweep_interval_ms {
            anyhow::bail!("timeout_ms не может быть меньше sweep_interval_ms");
        }

        // Валидация источника событий
        match self.source.mode.as_str() {
            "dry_run" => {}
            "replay" => {
                if self.source.replay_path.is_none() {
                    anyhow::bail!("Для режима replay нужен replay_path");
                }
            }
            _ => anyhow::bail!("Неверный режим источника событий: {}", self.source.mode),
        }

        if self.source.dry_run_interval_ms < 10 {
            anyhow::bail!("dry_run_interval_ms должно быть минимум 10");
        }

        for (i, app) in self.apps.known.iter().enumerate() {
            if app.trim().is_empty() {
                anyhow::bail!("Пустой app id в apps.known #{}", i + 1);
            }
        }

        Ok(())
    }
}
