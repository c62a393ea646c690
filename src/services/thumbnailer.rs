use crate::events::{OverviewEvent, ToplevelId};
use crate::overview::ActivityId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

/// Хэндл запроса миниатюры. Принадлежит активности, которая его запросила
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThumbnailRequestId(pub u64);

impl fmt::Display for ThumbnailRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thumb-{}", self.0)
    }
}

/// Захват миниатюр окон. Ответ приходит асинхронно как `OverviewEvent::ThumbnailReady`
pub trait Thumbnailer: Send + Sync {
    fn request(&self, activity: ActivityId, toplevel: &ToplevelId, width: i32, height: i32) -> ThumbnailRequestId;
    fn cancel(&self, request: ThumbnailRequestId);
}

/// Миниатюры "готовы" сразу: ответ кладётся в канал событий
pub struct ChannelThumbnailer {
    next_id: AtomicU64,
    pending: Mutex<HashSet<ThumbnailRequestId>>,
    events: Option<UnboundedSender<OverviewEvent>>,
}

impl Default for ChannelThumbnailer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelThumbnailer {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashSet::new()),
            events: None,
        }
    }

    pub fn with_events(mut self, events: UnboundedSender<OverviewEvent>) -> Self {
        self.events = Some(events);
        self
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Thumbnailer for ChannelThumbnailer {
    fn request(&self, activity: ActivityId, toplevel: &ToplevelId, width: i32, height: i32) -> ThumbnailRequestId {
        let request = ThumbnailRequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!("Запрос миниатюры {} для {} ({}x{})", request, toplevel, width, height);

        // Доставленный ответ больше не считается незавершённым
        let delivered = match &self.events {
            Some(events) => events.send(OverviewEvent::ThumbnailReady { activity, request }).is_ok(),
            None => false,
        };
        if !delivered {
            self.pending.lock().insert(request);
        }
        request
    }

    fn cancel(&self, request: ThumbnailRequestId) {
        if self.pending.lock().remove(&request) {
            trace!("Запрос миниатюры {} отменён", request);
        }
    }
}
