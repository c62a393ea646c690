pub mod app_grid;
pub mod app_info;
pub mod event_source;
pub mod overview_service;
pub mod shell;
pub mod splash_manager;
pub mod thumbnailer;
pub mod toplevel_manager;

pub use app_grid::{AppGrid, SearchAppGrid};
pub use app_info::{AppInfo, AppInfoResolver, KnownAppsResolver};
pub use event_source::create_event_source;
pub use overview_service::OverviewService;
pub use shell::{Shell, StaticShell, UsableArea};
pub use splash_manager::{LoggingSplashManager, SplashCommand, SplashManager};
pub use thumbnailer::{ChannelThumbnailer, ThumbnailRequestId, Thumbnailer};
pub use toplevel_manager::{InMemoryToplevelManager, ToplevelCommand, ToplevelManager};
