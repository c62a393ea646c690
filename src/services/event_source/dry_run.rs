use crate::config::Config;
use crate::error::Result;
use crate::events::{ActivityRef, LaunchEvent, SearchInput, ToplevelEvent, ToplevelId, ToplevelInfo, UiEvent};
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use super::r#trait::EventSourceTrait;
use super::scenario::{Scenario, ScenarioPlayer, ScenarioStep};

/// Эмуляция сессии телефона: запуски, окна, диалог, прокрутка и закрытие
pub struct DryRunSource {
    config: Arc<Config>,
    player: ScenarioPlayer,
}

impl DryRunSource {
    pub fn new(config: Arc<Config>, player: ScenarioPlayer) -> Self {
        Self { config, player }
    }

    pub fn session() -> Scenario {
        let calls = ToplevelInfo::new(1, "org.gnome.Calls").with_title("Calls");
        let settings = ToplevelInfo::new(2, "org.gnome.Settings").with_title("Settings");
        let dialog = ToplevelInfo::new(3, "org.gnome.Settings")
            .with_title("Wi-Fi")
            .with_parent(ToplevelId(2));

        Scenario {
            steps: vec![
                ScenarioStep::launch(LaunchEvent::started("org.gnome.Calls", "dry-calls-1")),
                ScenarioStep::launch(LaunchEvent::ready("org.gnome.Calls", "dry-calls-1")),
                ScenarioStep::toplevel(ToplevelEvent::Added(calls.clone().with_activated(true))),
                ScenarioStep::launch(LaunchEvent::started("org.gnome.Maps", "dry-maps-1")),
                ScenarioStep::launch(LaunchEvent::failed("org.gnome.Maps", "dry-maps-1")),
                ScenarioStep::toplevel(ToplevelEvent::Added(settings.clone().with_activated(true))),
                ScenarioStep::toplevel(ToplevelEvent::Added(dialog.with_activated(true))),
                ScenarioStep::overview_visible(true),
                ScenarioStep::ui(UiEvent::Resized {
                    activity: ActivityRef::Page(0),
                    width: 180,
                    height: 324,
                }),
                ScenarioStep::ui(UiEvent::PageChanged { index: Some(0) }),
                ScenarioStep::ui(UiEvent::CloseRequested {
                    activity: ActivityRef::Page(2),
                }),
                ScenarioStep::ui(UiEvent::Clicked {
                    activity: ActivityRef::Page(0),
                }),
                ScenarioStep::ui(UiEvent::FocusAppSearch),
                ScenarioStep::ui(UiEvent::Search {
                    input: SearchInput::Char('m'),
                }),
                ScenarioStep::ui(UiEvent::Search {
                    input: SearchInput::Escape,
                }),
                ScenarioStep::ui(UiEvent::Reset),
                ScenarioStep::overview_visible(false),
                ScenarioStep::toplevel(ToplevelEvent::Changed(calls.with_maximized(true))),
                ScenarioStep::toplevel(ToplevelEvent::Changed(settings.with_fullscreen(true))),
                ScenarioStep::ui(UiEvent::Refresh),
            ],
        }
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - источник событий работает в режиме эмуляции");

        let step_delay = Duration::from_millis(self.config.source.dry_run_interval_ms);
        let played = self.player.play(&Self::session(), step_delay).await?;
        info!("Dry-run: сценарий из {} шагов проигран", played);

        let mut idle = interval(Duration::from_secs(5));
        loop {
            idle.tick().await;
            debug!("Источник событий работает в dry-run режиме");
        }
    }
}

#[async_trait::async_trait]
impl EventSourceTrait for DryRunSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
