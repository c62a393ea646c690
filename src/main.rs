use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod overview;
mod services;

use config::Config;
use overview::{Collaborators, Overview};
use services::{
    create_event_source, ChannelThumbnailer, InMemoryToplevelManager, KnownAppsResolver, LoggingSplashManager,
    OverviewService, SearchAppGrid, StaticShell,
};

#[derive(Parser, Debug)]
#[command(name = "phone-overview")]
#[command(about = "Карусель активностей мобильной оболочки, синхронизированная с открытыми окнами")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "overview.toml")]
    config: String,

    /// Режим эмуляции сессии (игнорирует source.mode из конфигурации)
    #[arg(long, conflicts_with = "replay")]
    dry_run: bool,

    /// Проиграть сессию из TOML-файла сценария
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Уровень логирования (по умолчанию logging.filter из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let log_filter = args.log_level.clone().unwrap_or_else(|| config.logging.filter.clone());
    init_tracing(&log_filter, &config.logging.level)?;

    info!("Запуск phone-overview v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);
    if config.logging.format == "json" {
        warn!("JSON-формат логов не собран, используется compact");
    }

    if args.dry_run {
        warn!("Режим эмуляции - события окон и запусков генерируются сценарием");
        config.source.mode = "dry_run".to_string();
    }
    let config = Arc::new(config);

    // Все компоненты создаются явно и передаются обзору, глобальных синглтонов нет
    let (events_tx, events_rx) = unbounded_channel();
    let registry = Arc::new(InMemoryToplevelManager::new().with_events(events_tx.clone()));
    let shell = Arc::new(StaticShell::from_config(&config.screen));

    let deps = Collaborators {
        toplevels: registry.clone(),
        splash: Arc::new(LoggingSplashManager::new(config.screen.prefer_dark)),
        shell: shell.clone(),
        apps: Arc::new(KnownAppsResolver::from_config(&config.apps)),
        thumbnails: Arc::new(ChannelThumbnailer::new().with_events(events_tx.clone())),
        app_grid: Arc::new(SearchAppGrid::new()),
    };

    let overview = Overview::new(deps, config.launch.timeout());
    let service = OverviewService::new(overview, events_rx, config.launch.sweep_interval());
    let source = create_event_source(config.clone(), args.replay.clone(), registry, shell, events_tx)?;

    info!("Все компоненты инициализированы");

    let service_handle = tokio::spawn(async move {
        if let Err(e) = service.run().await {
            error!("Ошибка в OverviewService: {}", e);
        }
    });
    let source_handle = tokio::spawn(async move {
        if let Err(e) = source.run().await {
            error!("Ошибка в источнике событий: {}", e);
        }
    });

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    source_handle.abort();
    service_handle.abort();

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = source_handle.await;
        let _ = service_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("phone-overview завершил работу");
    Ok(())
}

fn init_tracing(filter: &str, fallback_level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .or_else(|_| EnvFilter::try_new(fallback_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
