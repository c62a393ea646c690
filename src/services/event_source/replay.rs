use crate::error::{OverviewError, Result};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};
use tokio::time::Duration;
use tracing::info;

use super::r#trait::EventSourceTrait;
use super::scenario::{Scenario, ScenarioPlayer};

/// Проигрывает записанную сессию из TOML-файла (`[[steps]]`)
pub struct ReplaySource {
    path: PathBuf,
    scenario: Scenario,
    player: ScenarioPlayer,
}

impl ReplaySource {
    pub fn load(path: impl Into<PathBuf>, player: ScenarioPlayer) -> Result<Self> {
        let path = path.into();
        let scenario = Self::read_scenario(&path)?;
        info!("Загружено {} шагов из {:?}", scenario.steps.len(), path);
        Ok(Self { path, scenario, player })
    }

    pub fn read_scenario(path: &Path) -> Result<Scenario> {
        if !path.exists() {
            return Err(OverviewError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("файл сценария {:?} не найден", path),
            )));
        }

        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| OverviewError::Config(anyhow::anyhow!("Сценарий {:?}: {}", path, e)))
    }

    async fn run_impl(self) -> Result<()> {
        let played = self.player.play(&self.scenario, Duration::ZERO).await?;
        info!("Replay {:?} завершён: {} шагов", self.path, played);
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventSourceTrait for ReplaySource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ActivityRef, LaunchStage, SearchInput, ToplevelEvent, ToplevelId, UiEvent};

    const SESSION: &str = r#"
[[steps]]
launch = { stage = "started", app_id = "org.gnome.Calls", startup_id = "calls-1" }

[[steps]]
delay_ms = 5
toplevel = { kind = "added", id = 1, app_id = "org.gnome.Calls", activated = true }

[[steps]]
overview_visible = true
ui = { kind = "clicked", activity = { page = 0 } }

[[steps]]
toplevel = { kind = "closed", id = 1 }

[[steps]]
ui = { kind = "search", input = { char = "m" } }

[[steps]]
ui = { kind = "refresh" }
"#;

    #[test]
    fn scenario_is_read_from_toml() {
        let path = std::env::temp_dir().join(format!("phone-overview-replay-{}.toml", std::process::id()));
        std::fs::write(&path, SESSION).unwrap();
        let scenario = ReplaySource::read_scenario(&path);
        std::fs::remove_file(&path).ok();

        let scenario = scenario.unwrap();
        assert_eq!(scenario.steps.len(), 6);
        assert_eq!(scenario.steps[0].launch.as_ref().map(|l| l.stage), Some(LaunchStage::Started));
        assert_eq!(scenario.steps[1].delay_ms, Some(5));
        assert!(matches!(
            &scenario.steps[1].toplevel,
            Some(ToplevelEvent::Added(info)) if info.id == ToplevelId(1) && info.activated
        ));
        assert_eq!(scenario.steps[2].overview_visible, Some(true));
        assert_eq!(
            scenario.steps[2].ui,
            Some(UiEvent::Clicked { activity: ActivityRef::Page(0) })
        );
        assert_eq!(
            scenario.steps[3].toplevel,
            Some(ToplevelEvent::Closed { id: ToplevelId(1) })
        );
        assert_eq!(
            scenario.steps[4].ui,
            Some(UiEvent::Search { input: SearchInput::Char('m') })
        );
        assert_eq!(scenario.steps[5].ui, Some(UiEvent::Refresh));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ReplaySource::read_scenario(Path::new("/nonexistent/phone-overview.toml")).unwrap_err();
        assert!(matches!(err, OverviewError::Io(_)));
    }
}
