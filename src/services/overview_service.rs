use crate::error::Result;
use crate::events::OverviewEvent;
use crate::overview::Overview;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Итог работы сервиса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceReport {
    pub processed: usize,
    pub failed: usize,
    pub activities: usize,
}

/// Единственный поток управления обзором: события обрабатываются строго в порядке поступления
pub struct OverviewService {
    overview: Overview,
    events: UnboundedReceiver<OverviewEvent>,
    sweep_interval: Duration,
    report: ServiceReport,
}

impl OverviewService {
    pub fn new(overview: Overview, events: UnboundedReceiver<OverviewEvent>, sweep_interval: Duration) -> Self {
        info!("Инициализация OverviewService (активностей: {})", overview.carousel().len());
        Self {
            overview,
            events,
            sweep_interval,
            report: ServiceReport::default(),
        }
    }

    /// Выходит, когда закрыты все отправители. Реестр и миниатюры в составе
    /// обзора сами держат отправителей, поэтому в рабочем процессе цикл
    /// завершается только через `abort()` задачи
    pub async fn run(mut self) -> Result<ServiceReport> {
        info!("OverviewService запущен");

        let mut sweep = interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        info!("Все источники событий завершились");
                        break;
                    }
                },
                _ = sweep.tick() => self.dispatch(OverviewEvent::Tick(Instant::now())),
            }
        }

        self.report.activities = self.overview.carousel().len();
        info!(
            "OverviewService завершён: событий {}, ошибок {}, активностей {} (has-activities={})",
            self.report.processed,
            self.report.failed,
            self.report.activities,
            self.overview.has_activities()
        );
        Ok(self.report)
    }

    fn dispatch(&mut self, event: OverviewEvent) {
        let is_tick = matches!(event, OverviewEvent::Tick(_));
        if !is_tick {
            debug!("Обработка события: {}", event);
            self.report.processed += 1;
        }

        if let Err(e) = self.overview.handle_event(event) {
            self.report.failed += 1;
            if e.is_invariant_violation() {
                error!("Рассинхронизация с реестром окон: {}", e);
            } else {
                warn!("Событие не обработано: {}", e);
            }
        }

        for signal in self.overview.drain_signals() {
            info!("Сигнал обзора: {}", signal);
        }
    }
}
