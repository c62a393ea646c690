use crate::config::Config;
use crate::error::Result;
use crate::events::OverviewEvent;
use crate::services::{InMemoryToplevelManager, StaticShell};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use super::dry_run::DryRunSource;
use super::replay::ReplaySource;
use super::scenario::ScenarioPlayer;

/// Trait for event sources that feed the overview with toplevel, launch and UI events
#[async_trait::async_trait]
pub trait EventSourceTrait {
    /// Run the event source until its input is exhausted
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an event source: an explicit replay file wins over the config mode
pub fn create_event_source(
    config: Arc<Config>,
    replay_path: Option<PathBuf>,
    registry: Arc<InMemoryToplevelManager>,
    shell: Arc<StaticShell>,
    events: UnboundedSender<OverviewEvent>,
) -> Result<Box<dyn EventSourceTrait + Send>> {
    let player = ScenarioPlayer::new(registry, shell, events);
    let replay_path = replay_path.or_else(|| match config.source.mode.as_str() {
        "replay" => config.source.replay_path.clone(),
        _ => None,
    });

    match replay_path {
        Some(path) => {
            info!("Источник событий: replay из {:?}", path);
            Ok(Box::new(ReplaySource::load(path, player)?))
        }
        None => {
            info!("Источник событий: dry-run эмуляция");
            Ok(Box::new(DryRunSource::new(config, player)))
        }
    }
}
