use crate::error::Result;
use crate::events::{LaunchEvent, OverviewEvent, ToplevelEvent, UiEvent};
use crate::overview_error;
use crate::services::{InMemoryToplevelManager, StaticShell};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{sleep, Duration};
use tracing::debug;

/// Один шаг сценария. Обычно заполнено ровно одно событие;
/// флаги оболочки применяются до него
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioStep {
    pub delay_ms: Option<u64>,
    pub overview_visible: Option<bool>,
    pub docked: Option<bool>,
    pub toplevel: Option<ToplevelEvent>,
    pub launch: Option<LaunchEvent>,
    pub ui: Option<UiEvent>,
}

impl ScenarioStep {
    pub fn toplevel(event: ToplevelEvent) -> Self {
        Self {
            toplevel: Some(event),
            ..Self::default()
        }
    }

    pub fn launch(event: LaunchEvent) -> Self {
        Self {
            launch: Some(event),
            ..Self::default()
        }
    }

    pub fn ui(event: UiEvent) -> Self {
        Self {
            ui: Some(event),
            ..Self::default()
        }
    }

    pub fn overview_visible(visible: bool) -> Self {
        Self {
            overview_visible: Some(visible),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Scenario {
    pub steps: Vec<ScenarioStep>,
}

/// Проигрывает сценарий: обновляет реестр окон и оболочку, затем отправляет событие
pub struct ScenarioPlayer {
    registry: Arc<InMemoryToplevelManager>,
    shell: Arc<StaticShell>,
    events: UnboundedSender<OverviewEvent>,
}

impl ScenarioPlayer {
    pub fn new(
        registry: Arc<InMemoryToplevelManager>,
        shell: Arc<StaticShell>,
        events: UnboundedSender<OverviewEvent>,
    ) -> Self {
        Self { registry, shell, events }
    }

    pub async fn play(&self, scenario: &Scenario, default_delay: Duration) -> Result<usize> {
        for (i, step) in scenario.steps.iter().enumerate() {
            let delay = step.delay_ms.map(Duration::from_millis).unwrap_or(default_delay);
            sleep(delay).await;
            debug!("Шаг сценария #{}", i + 1);
            self.apply(step)?;
        }
        Ok(scenario.steps.len())
    }

    pub fn apply(&self, step: &ScenarioStep) -> Result<()> {
        if let Some(visible) = step.overview_visible {
            self.shell.set_overview_visible(visible);
        }
        if let Some(docked) = step.docked {
            self.shell.set_docked(docked);
        }

        if let Some(event) = &step.toplevel {
            match event {
                ToplevelEvent::Added(info) | ToplevelEvent::Changed(info) | ToplevelEvent::ActivatedChanged(info) => {
                    self.registry.update(info.clone())
                }
                ToplevelEvent::Closed { id } => {
                    self.registry.remove(id);
                }
            }
            self.send(event.clone().into())?;
        }

        if let Some(event) = &step.launch {
            self.send(event.clone().into())?;
        }

        if let Some(event) = &step.ui {
            if let UiEvent::UsableAreaChanged { width, height } = event {
                self.shell.set_usable_area(*width, *height);
            }
            self.send(event.clone().into())?;
        }
        Ok(())
    }

    fn send(&self, event: OverviewEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|e| overview_error!(channel, "обзор больше не принимает события: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ToplevelId, ToplevelInfo};
    use crate::services::{Shell, ToplevelManager, UsableArea};
    use tokio::sync::mpsc::unbounded_channel;

    fn player() -> (ScenarioPlayer, Arc<InMemoryToplevelManager>, Arc<StaticShell>, tokio::sync::mpsc::UnboundedReceiver<OverviewEvent>) {
        let (tx, rx) = unbounded_channel();
        let registry = Arc::new(InMemoryToplevelManager::new());
        let shell = Arc::new(StaticShell::new(UsableArea { width: 360, height: 648 }, 1));
        (ScenarioPlayer::new(registry.clone(), shell.clone(), tx), registry, shell, rx)
    }

    #[test]
    fn registry_is_updated_before_event_is_sent() {
        let (player, registry, shell, mut rx) = player();

        player
            .apply(&ScenarioStep::toplevel(ToplevelEvent::Added(ToplevelInfo::new(1, "a"))))
            .unwrap();
        assert_eq!(registry.num_toplevels(), 1);

        player
            .apply(&ScenarioStep::ui(UiEvent::UsableAreaChanged { width: 720, height: 1200 }))
            .unwrap();
        assert_eq!(shell.usable_area(), UsableArea { width: 720, height: 1200 });

        player
            .apply(&ScenarioStep::toplevel(ToplevelEvent::Closed { id: ToplevelId(1) }))
            .unwrap();
        assert_eq!(registry.num_toplevels(), 0);

        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[test]
    fn closed_channel_is_an_error() {
        let (player, _registry, shell, rx) = player();
        drop(rx);
        let err = player.apply(&ScenarioStep::launch(LaunchEvent::started("a", "a-1")));
        assert!(err.is_err());

        // Флаги оболочки применяются даже без события
        player.apply(&ScenarioStep::overview_visible(true)).unwrap();
        assert!(shell.is_overview_visible());
    }

    #[tokio::test]
    async fn play_sends_every_step() {
        let (player, _registry, _shell, mut rx) = player();
        let scenario = Scenario {
            steps: vec![
                ScenarioStep::launch(LaunchEvent::started("a", "a-1")),
                ScenarioStep::launch(LaunchEvent::ready("a", "a-1")),
            ],
        };

        let played = player.play(&scenario, Duration::from_millis(1)).await.unwrap();
        assert_eq!(played, 2);
        assert_eq!(rx.recv().await, Some(LaunchEvent::started("a", "a-1").into()));
        assert_eq!(rx.recv().await, Some(LaunchEvent::ready("a", "a-1").into()));
    }
}
