//! Toplevel-to-activity synchronization.
//!
//! The overview keeps the carousel a de-duplicated projection of the open
//! windows plus the launches that have no window yet. Launch events and window
//! events arrive independently; a launch splash is upgraded in place when a
//! window of the same application shows up.

use super::activity::{Activity, ActivityId, Allocation, GeometryHint};
use super::carousel::Carousel;
use crate::error::{OverviewError, Result};
use crate::events::{
    ActivityRef, EventPropagation, LaunchEvent, LaunchStage, OverviewEvent, OverviewSignal, SearchInput,
    StartupId, ToplevelEvent, ToplevelId, ToplevelInfo, UiEvent,
};
use crate::overview_error;
use crate::services::{
    AppGrid, AppInfoResolver, Shell, SplashManager, ThumbnailRequestId, Thumbnailer, ToplevelManager,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Внешние компоненты, с которыми работает обзор
#[derive(Clone)]
pub struct Collaborators {
    pub toplevels: Arc<dyn ToplevelManager>,
    pub splash: Arc<dyn SplashManager>,
    pub shell: Arc<dyn Shell>,
    pub apps: Arc<dyn AppInfoResolver>,
    pub thumbnails: Arc<dyn Thumbnailer>,
    pub app_grid: Arc<dyn AppGrid>,
}

pub struct Overview {
    carousel: Carousel,
    deps: Collaborators,
    /// `None`: сплэши без окна живут до события о сбое
    launch_timeout: Option<Duration>,
    signals: Vec<OverviewSignal>,
}

impl Overview {
    /// Создаёт обзор и сразу отображает уже открытые окна
    pub fn new(deps: Collaborators, launch_timeout: Option<Duration>) -> Self {
        let mut overview = Self {
            carousel: Carousel::new(),
            deps,
            launch_timeout,
            signals: Vec::new(),
        };
        overview.sync_running();
        overview
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn has_activities(&self) -> bool {
        self.carousel.has_activities()
    }

    pub fn drain_signals(&mut self) -> Vec<OverviewSignal> {
        std::mem::take(&mut self.signals)
    }

    fn emit(&mut self, signal: OverviewSignal) {
        debug!("Сигнал: {}", signal);
        self.signals.push(signal);
    }

    fn flush_has_activities(&mut self) {
        for value in self.carousel.drain_has_activities_changes() {
            self.emit(OverviewSignal::HasActivitiesChanged(value));
        }
    }

    /// Разбор события по типизированным обработчикам
    pub fn handle_event(&mut self, event: OverviewEvent) -> Result<()> {
        trace!("Событие: {}", event);
        match event {
            OverviewEvent::Toplevel(event) => match event {
                ToplevelEvent::Added(info) => self.on_toplevel_added(&info),
                ToplevelEvent::Changed(info) => self.on_toplevel_changed(&info),
                ToplevelEvent::Closed { id } => self.on_toplevel_closed(&id),
                ToplevelEvent::ActivatedChanged(info) => self.on_toplevel_activated_changed(&info),
            },
            OverviewEvent::Launch(LaunchEvent {
                stage,
                app_id,
                startup_id,
            }) => match stage {
                LaunchStage::Started => self.on_launch_started(&app_id, &startup_id, Instant::now()),
                LaunchStage::Ready => self.on_launch_ready(&app_id, &startup_id),
                LaunchStage::Failed => self.on_launch_failed(&app_id, &startup_id),
            },
            OverviewEvent::Ui(event) => self.handle_ui_event(event),
            OverviewEvent::ThumbnailReady { activity, request } => {
                self.on_thumbnail_ready(activity, request);
                Ok(())
            }
            OverviewEvent::Tick(now) => {
                self.expire_stale_launches(now);
                Ok(())
            }
        }
    }

    fn handle_ui_event(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::Clicked { activity } => self.on_activity_clicked(activity),
            UiEvent::CloseRequested { activity } => self.on_activity_closed(activity),
            UiEvent::FullscreenRequested { activity, fullscreen } => self.on_activity_fullscreened(activity, fullscreen),
            UiEvent::Resized { activity, width, height } => self.on_activity_resized(activity, width, height),
            UiEvent::FocusChanged { activity, has_focus } => self.on_activity_focus_changed(activity, has_focus),
            UiEvent::PageChanged { index } => self.on_page_changed(index),
            UiEvent::AppLaunched { app_id } => {
                debug!("Из сетки запущено '{}'", app_id);
                self.emit(OverviewSignal::ActivityLaunched);
                Ok(())
            }
            UiEvent::SelectionAborted => {
                self.emit(OverviewSignal::SelectionAborted);
                Ok(())
            }
            UiEvent::UsableAreaChanged { width, height } => {
                self.on_usable_area_changed(width, height);
                Ok(())
            }
            UiEvent::Refresh => {
                self.refresh();
                Ok(())
            }
            UiEvent::Reset => {
                self.reset();
                Ok(())
            }
            UiEvent::FocusAppSearch => {
                self.focus_app_search();
                Ok(())
            }
            UiEvent::Search { input } => {
                if self.handle_search(input) == EventPropagation::Proceed {
                    trace!("Ввод {:?} не поглощён поиском", input);
                }
                Ok(())
            }
        }
    }

    /// Отображение всех окон, открытых до запуска обзора
    pub fn sync_running(&mut self) {
        let count = self.deps.toplevels.num_toplevels();
        info!("Синхронизация с {} открытыми окнами", count);

        for index in 0..count {
            match self.deps.toplevels.toplevel(index) {
                Some(info) => {
                    if let Err(e) = self.on_toplevel_added(&info) {
                        warn!("Не удалось отобразить окно {}: {}", info, e);
                    }
                }
                None => warn!("Окно #{} исчезло во время синхронизации", index),
            }
        }
        self.flush_has_activities();
    }

    fn create_activity(&mut self, mut activity: Activity) -> ActivityId {
        let pos = activity
            .parent_app_id
            .as_deref()
            .and_then(|parent| self.carousel.last_group_pos(parent));

        if !activity.is_running() {
            activity.light_style = !self.deps.splash.prefer_dark();
        }

        let id = match pos {
            Some(pos) => self.carousel.insert(pos, activity),
            None => self.carousel.push(activity),
        };
        self.flush_has_activities();
        id
    }

    fn destroy_activity(&mut self, id: ActivityId) -> Option<Activity> {
        let mut activity = self.carousel.remove(id)?;
        if let Some(request) = activity.take_pending_thumbnail() {
            self.deps.thumbnails.cancel(request);
        }
        self.flush_has_activities();
        Some(activity)
    }

    fn usable_geometry(&self) -> GeometryHint {
        GeometryHint::from_area(self.deps.shell.usable_area())
    }

    fn request_thumbnail(&mut self, id: ActivityId) {
        let scale = self.deps.shell.scale_factor().max(1);
        let Some(activity) = self.carousel.get(id) else {
            return;
        };
        let Some(toplevel) = activity.toplevel() else {
            debug!("{}: нет окна, миниатюра не нужна", activity);
            return;
        };

        let size = activity.thumbnail_size();
        let request = self.deps.thumbnails.request(
            id,
            &toplevel,
            size.width.saturating_mul(scale),
            size.height.saturating_mul(scale),
        );

        let previous = self
            .carousel
            .get_mut(id)
            .and_then(|activity| activity.replace_pending_thumbnail(request));
        if let Some(previous) = previous {
            self.deps.thumbnails.cancel(previous);
        }
    }

    fn focus_activity(&mut self, id: ActivityId) {
        self.carousel.set_focused(id);
        self.carousel.scroll_to(id);
    }

    fn resolve(&self, activity: ActivityRef) -> Result<ActivityId> {
        self.carousel
            .resolve(activity)
            .ok_or_else(|| overview_error!(activity_not_found, "{}", activity))
    }

    pub fn on_launch_started(&mut self, app_id: &str, startup_id: &StartupId, now: Instant) -> Result<()> {
        let Some(app_info) = self.deps.apps.app_info_for_app_id(app_id) else {
            debug!("Нет метаданных для запуска '{}', пропускаем", app_id);
            return Ok(());
        };

        debug!("Строим сплэш для '{}'", app_info);
        let activity = Activity::launching(app_id, app_info, startup_id.clone(), self.usable_geometry(), now);
        self.create_activity(activity);
        Ok(())
    }

    pub fn on_launch_ready(&mut self, app_id: &str, startup_id: &StartupId) -> Result<()> {
        debug!("Приложение '{}' [{}] запущено", app_id, startup_id);
        Ok(())
    }

    pub fn on_launch_failed(&mut self, app_id: &str, startup_id: &StartupId) -> Result<()> {
        let Some(app_info) = self.deps.apps.app_info_for_app_id(app_id) else {
            debug!("Нет метаданных для '{}', сбой запуска игнорируется", app_id);
            return Ok(());
        };

        let target = self
            .carousel
            .find_launching_by_startup_id(startup_id)
            .or_else(|| self.carousel.find_by_app_info(&app_info));

        match target {
            Some(id) if self.carousel.get(id).is_some_and(Activity::is_running) => {
                debug!("У '{}' уже есть окно, сбой запуска игнорируется", app_info);
            }
            Some(id) => {
                debug!("Запуск '{}' не удался, закрываем сплэш", app_info);
                self.destroy_activity(id);
            }
            None => debug!("Для неудачного запуска '{}' нет активности", app_info),
        }
        Ok(())
    }

    pub fn on_toplevel_added(&mut self, toplevel: &ToplevelInfo) -> Result<()> {
        if let Some(existing) = self.carousel.find_by_toplevel(&toplevel.id) {
            warn!("Окно {} уже отображено, обновляем", toplevel);
            self.mirror_window_state(existing, toplevel);
            return Ok(());
        }

        let parent_app_id = match toplevel.parent {
            Some(_) => self.deps.toplevels.parent(toplevel).map(|parent| parent.app_id),
            None => None,
        };
        let app_info = self.deps.apps.app_info_for_app_id(&toplevel.app_id);

        // Решает первая активность приложения: если у неё уже есть окно,
        // это второе окно, и сплэш (если есть) не трогаем
        let splash = app_info
            .as_ref()
            .and_then(|info| self.carousel.find_by_app_info(info))
            .filter(|id| match self.carousel.get(*id) {
                Some(activity) if activity.is_running() => {
                    debug!("У активности '{}' уже есть окно", toplevel.app_id);
                    false
                }
                Some(_) => true,
                None => false,
            });

        let id = match splash {
            Some(id) => {
                debug!("Используем существующую активность для {}", toplevel);
                let area = self.deps.shell.usable_area();
                if let Some(activity) = self.carousel.get_mut(id) {
                    activity.bind_toplevel(toplevel, area);
                }
                self.request_thumbnail(id);
                id
            }
            None => {
                debug!("Строим активность для {}", toplevel);
                let activity = Activity::running(toplevel, app_info, parent_app_id, self.usable_geometry());
                self.create_activity(activity)
            }
        };

        if toplevel.activated {
            self.focus_activity(id);
        }
        Ok(())
    }

    /// Окно → карточка: maximized/fullscreen и заголовок
    fn mirror_window_state(&mut self, id: ActivityId, toplevel: &ToplevelInfo) {
        if let Some(activity) = self.carousel.get_mut(id) {
            activity.geometry.maximized = toplevel.maximized;
            activity.geometry.fullscreen = toplevel.fullscreen;
            activity.title = toplevel.title.clone();
        }
    }

    pub fn on_toplevel_changed(&mut self, toplevel: &ToplevelInfo) -> Result<()> {
        let id = self
            .carousel
            .find_by_toplevel(&toplevel.id)
            .ok_or_else(|| overview_error!(activity_not_found, "{}", toplevel.id))?;

        self.mirror_window_state(id, toplevel);

        // Открытый обзор обновляет миниатюры сам, через resize
        if !self.deps.shell.is_overview_visible() {
            self.request_thumbnail(id);
        }
        Ok(())
    }

    pub fn on_toplevel_closed(&mut self, toplevel: &ToplevelId) -> Result<()> {
        let id = match self.carousel.find_by_toplevel(toplevel) {
            Some(id) => id,
            None => return OverviewError::activity_not_found(toplevel.to_string()),
        };

        if let Some(activity) = self.destroy_activity(id) {
            debug!("Активность {} удалена", activity);
        }
        Ok(())
    }

    pub fn on_toplevel_activated_changed(&mut self, toplevel: &ToplevelInfo) -> Result<()> {
        if !toplevel.activated {
            return Ok(());
        }

        let id = self
            .carousel
            .find_by_toplevel(&toplevel.id)
            .ok_or_else(|| overview_error!(activity_not_found, "{}", toplevel.id))?;
        self.focus_activity(id);
        Ok(())
    }

    pub fn on_activity_clicked(&mut self, activity: ActivityRef) -> Result<()> {
        let id = self.resolve(activity)?;
        let Some(activity) = self.carousel.get(id) else {
            return Ok(());
        };

        match (activity.toplevel(), activity.startup_id()) {
            (Some(toplevel), _) => {
                debug!("Поднимаем {} ({})", activity, activity.title);
                self.deps.toplevels.activate(&toplevel);
                self.deps.splash.lower_all();
            }
            (None, Some(startup_id)) if !startup_id.as_str().is_empty() => {
                self.deps.splash.raise(startup_id);
            }
            (None, _) => {
                let app_id = activity.app_id.clone().unwrap_or_default();
                warn!("{}", OverviewError::MissingStartupId(app_id));
            }
        }

        self.emit(OverviewSignal::ActivityRaised);
        Ok(())
    }

    /// Закрытие только запрашивается; карточка исчезнет по событию closed
    pub fn on_activity_closed(&mut self, activity: ActivityRef) -> Result<()> {
        let id = self.resolve(activity)?;
        let Some(activity) = self.carousel.get(id) else {
            return Ok(());
        };
        let Some(toplevel) = activity.toplevel() else {
            warn!("{}: закрывать нечего, окна ещё нет", activity);
            return Ok(());
        };

        debug!("Закрываем {} ({})", activity, activity.title);
        self.deps.toplevels.close(&toplevel);
        self.deps.shell.trigger_feedback("window-close");
        self.emit(OverviewSignal::ActivityClosed);
        Ok(())
    }

    /// Карточка → окно
    pub fn on_activity_fullscreened(&mut self, activity: ActivityRef, fullscreen: bool) -> Result<()> {
        let id = self.resolve(activity)?;
        let toplevel = match self.carousel.get_mut(id) {
            Some(activity) => match activity.toplevel() {
                Some(toplevel) => {
                    activity.geometry.fullscreen = fullscreen;
                    toplevel
                }
                None => {
                    warn!("{}: нет окна для fullscreen", activity);
                    return Ok(());
                }
            },
            None => return Ok(()),
        };

        debug!("Fullscreen {}: {}", toplevel, fullscreen);
        self.deps.toplevels.fullscreen(&toplevel, fullscreen);
        Ok(())
    }

    pub fn on_activity_resized(&mut self, activity: ActivityRef, width: i32, height: i32) -> Result<()> {
        let id = self.resolve(activity)?;
        if width <= 0 || height <= 0 {
            return Err(OverviewError::InvalidSize { width, height });
        }
        if let Some(activity) = self.carousel.get_mut(id) {
            activity.thumbnail_allocation = Some(Allocation { width, height });
        }
        self.request_thumbnail(id);
        Ok(())
    }

    pub fn on_activity_focus_changed(&mut self, activity: ActivityRef, has_focus: bool) -> Result<()> {
        let id = self.resolve(activity)?;
        if has_focus {
            self.carousel.scroll_only(id);
        }
        Ok(())
    }

    pub fn on_page_changed(&mut self, index: Option<usize>) -> Result<()> {
        let Some(index) = index else {
            return Ok(());
        };

        // Не поднимаем окна при прокрутке в docked-режиме
        if self.deps.shell.is_docked() {
            return Ok(());
        }
        if !self.deps.shell.is_overview_visible() {
            return Ok(());
        }

        let id = self.resolve(ActivityRef::Page(index))?;
        if let Some(toplevel) = self.carousel.get(id).and_then(Activity::toplevel) {
            self.deps.toplevels.activate(&toplevel);
        } else {
            debug!("Страница #{}: сплэш без окна, активировать нечего", index);
        }

        if self.carousel.key_focus() != Some(id) {
            self.carousel.grab_focus(id);
        }
        Ok(())
    }

    pub fn on_thumbnail_ready(&mut self, activity: ActivityId, request: ThumbnailRequestId) {
        match self.carousel.get_mut(activity) {
            Some(entry) => {
                if entry.thumbnail_ready(request) {
                    debug!("Миниатюра {} готова для {}", request, entry);
                } else {
                    trace!("Устаревшая миниатюра {} для {}", request, entry);
                }
            }
            None => trace!("Миниатюра {} пришла для удалённой активности", request),
        }
    }

    pub fn on_usable_area_changed(&mut self, width: i32, height: i32) {
        for activity in self.carousel.iter_mut() {
            activity.geometry.width = width;
            activity.geometry.height = height;
        }
    }

    /// Удаляет сплэши, которые так и не получили окно
    pub fn expire_stale_launches(&mut self, now: Instant) -> usize {
        let Some(timeout) = self.launch_timeout else {
            return 0;
        };

        let expired: Vec<ActivityId> = self
            .carousel
            .iter()
            .filter(|(_, activity)| activity.launch_expired(now, timeout))
            .map(|(id, _)| id)
            .collect();

        for id in &expired {
            if let Some(activity) = self.destroy_activity(*id) {
                info!("Запуск {} не дал окна за {:?}, убираем сплэш", activity, timeout);
            }
        }
        expired.len()
    }

    /// Перезапрашивает миниатюру активного окна
    pub fn refresh(&mut self) {
        if self.carousel.is_empty() {
            trace!("Карусель пуста, обновлять нечего");
            return;
        }
        if let Some(id) = self.carousel.focused() {
            self.carousel.grab_focus(id);
            self.request_thumbnail(id);
        }
    }

    pub fn reset(&self) {
        self.deps.app_grid.reset();
    }

    pub fn focus_app_search(&self) {
        self.deps.app_grid.focus_search();
    }

    pub fn handle_search(&self, input: SearchInput) -> EventPropagation {
        self.deps.app_grid.handle_search(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        ChannelThumbnailer, InMemoryToplevelManager, KnownAppsResolver, LoggingSplashManager, SearchAppGrid,
        SplashCommand, StaticShell, ToplevelCommand, UsableArea,
    };

    struct Fixture {
        registry: Arc<InMemoryToplevelManager>,
        splash: Arc<LoggingSplashManager>,
        shell: Arc<StaticShell>,
        thumbnails: Arc<ChannelThumbnailer>,
        grid: Arc<SearchAppGrid>,
        overview: Overview,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_registry(InMemoryToplevelManager::new(), None)
        }

        fn with_registry(registry: InMemoryToplevelManager, launch_timeout: Option<Duration>) -> Self {
            let registry = Arc::new(registry);
            let splash = Arc::new(LoggingSplashManager::new(false));
            let shell = Arc::new(StaticShell::new(UsableArea { width: 360, height: 648 }, 2));
            let thumbnails = Arc::new(ChannelThumbnailer::new());
            let grid = Arc::new(SearchAppGrid::new());
            let deps = Collaborators {
                toplevels: registry.clone(),
                splash: splash.clone(),
                shell: shell.clone(),
                apps: Arc::new(KnownAppsResolver::new(Vec::<String>::new())),
                thumbnails: thumbnails.clone(),
                app_grid: grid.clone(),
            };
            Self {
                registry,
                splash,
                shell,
                thumbnails,
                grid,
                overview: Overview::new(deps, launch_timeout),
            }
        }

        fn send(&mut self, event: impl Into<OverviewEvent>) -> Result<()> {
            self.overview.handle_event(event.into())
        }

        fn add(&mut self, info: ToplevelInfo) {
            self.registry.add(info.clone());
            self.send(ToplevelEvent::Added(info)).expect("toplevel added");
        }

        fn app_ids(&self) -> Vec<String> {
            self.overview
                .carousel()
                .iter()
                .map(|(_, a)| a.app_id.clone().unwrap_or_default())
                .collect()
        }

        fn activity(&self, index: usize) -> &Activity {
            let id = self.overview.carousel().nth(index).expect("activity at index");
            self.overview.carousel().get(id).expect("live activity")
        }
    }

    #[test]
    fn one_activity_per_window() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Calls"));
        f.add(ToplevelInfo::new(2, "org.gnome.Calls"));
        f.add(ToplevelInfo::new(3, "org.gnome.Maps"));
        // Повторное added для уже известного окна не создаёт дубль
        f.add(ToplevelInfo::new(3, "org.gnome.Maps").with_maximized(true));

        let carousel = f.overview.carousel();
        assert_eq!(carousel.len(), 3);
        for id in 1..=3 {
            assert!(carousel.find_by_toplevel(&ToplevelId(id)).is_some());
        }
        assert!(f.activity(2).geometry.maximized);
    }

    #[test]
    fn launch_is_upgraded_by_matching_window() {
        let mut f = Fixture::new();
        f.send(LaunchEvent::started("org.gnome.Calls", "calls-1")).unwrap();
        assert_eq!(f.overview.carousel().len(), 1);
        assert!(f.activity(0).light_style);

        f.add(ToplevelInfo::new(1, "org.gnome.Calls").with_fullscreen(true));

        assert_eq!(f.overview.carousel().len(), 1);
        let activity = f.activity(0);
        assert!(activity.is_running());
        assert_eq!(activity.startup_id(), None);
        assert!(activity.geometry.fullscreen);
        assert!(!activity.light_style);
        // Сплэш получил окно и сразу запросил миниатюру
        assert_eq!(f.thumbnails.pending(), 1);
    }

    #[test]
    fn second_window_of_running_app_gets_own_activity() {
        let mut f = Fixture::new();
        f.send(LaunchEvent::started("org.gnome.Calls", "calls-1")).unwrap();
        f.add(ToplevelInfo::new(1, "org.gnome.Calls"));
        f.add(ToplevelInfo::new(2, "org.gnome.Calls"));

        assert_eq!(f.overview.carousel().len(), 2);
        assert_eq!(f.activity(1).toplevel(), Some(ToplevelId(2)));
    }

    #[test]
    fn window_of_running_app_leaves_pending_splash() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Calls"));
        f.send(LaunchEvent::started("org.gnome.Calls", "calls-2")).unwrap();
        f.add(ToplevelInfo::new(2, "org.gnome.Calls"));

        assert_eq!(f.overview.carousel().len(), 3);
        let splash = f
            .overview
            .carousel()
            .find_launching_by_startup_id(&StartupId::new("calls-2"))
            .expect("splash survives");
        assert!(!f.overview.carousel().get(splash).unwrap().is_running());
        assert_eq!(f.activity(2).toplevel(), Some(ToplevelId(2)));

        // Сплэш уходит только по своему событию о сбое
        f.send(LaunchEvent::failed("org.gnome.Calls", "calls-2")).unwrap();
        assert_eq!(f.overview.carousel().len(), 2);
        assert!(f.overview.carousel().iter().all(|(_, a)| a.is_running()));
    }

    #[test]
    fn failed_launch_removes_splash() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));
        f.send(LaunchEvent::started("org.gnome.Calls", "calls-1")).unwrap();
        assert_eq!(f.overview.carousel().len(), 2);

        f.send(LaunchEvent::failed("org.gnome.Calls", "calls-1")).unwrap();
        assert_eq!(f.overview.carousel().len(), 1);
        assert_eq!(f.app_ids(), vec!["org.gnome.Maps"]);
    }

    #[test]
    fn failure_after_window_is_ignored() {
        let mut f = Fixture::new();
        f.send(LaunchEvent::started("org.gnome.Calls", "calls-1")).unwrap();
        f.add(ToplevelInfo::new(1, "org.gnome.Calls"));
        f.send(LaunchEvent::failed("org.gnome.Calls", "calls-1")).unwrap();

        assert_eq!(f.overview.carousel().len(), 1);
        assert!(f.activity(0).is_running());
    }

    #[test]
    fn launch_without_metadata_is_ignored() {
        let registry = InMemoryToplevelManager::new();
        let mut f = Fixture::with_registry(registry, None);
        f.overview.deps.apps = Arc::new(KnownAppsResolver::new(["org.gnome.Maps"]));

        f.send(LaunchEvent::started("org.example.Missing", "x-1")).unwrap();
        assert!(f.overview.carousel().is_empty());
        assert!(f.overview.drain_signals().is_empty());
    }

    #[test]
    fn child_windows_are_grouped_after_parent() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Calls"));
        f.add(ToplevelInfo::new(2, "org.gnome.Maps"));
        f.add(ToplevelInfo::new(3, "org.gnome.Settings"));
        f.add(ToplevelInfo::new(4, "org.gnome.Weather"));

        f.add(ToplevelInfo::new(5, "org.gnome.Settings.Dialog").with_parent(ToplevelId(3)));
        f.add(ToplevelInfo::new(6, "org.gnome.Clocks"));
        f.add(ToplevelInfo::new(7, "org.gnome.Settings.Other").with_parent(ToplevelId(3)));

        assert_eq!(
            f.app_ids(),
            vec![
                "org.gnome.Calls",
                "org.gnome.Maps",
                "org.gnome.Settings",
                "org.gnome.Settings.Dialog",
                "org.gnome.Settings.Other",
                "org.gnome.Weather",
                "org.gnome.Clocks",
            ]
        );
        assert_eq!(f.activity(3).parent_app_id.as_deref(), Some("org.gnome.Settings"));
    }

    #[test]
    fn children_sharing_parent_app_id_stay_adjacent() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));
        f.add(ToplevelInfo::new(2, "org.gnome.Settings"));
        f.add(ToplevelInfo::new(3, "org.gnome.Weather"));

        // Второе окно приложения тоже считается "последним" для группы
        f.add(ToplevelInfo::new(4, "org.gnome.Settings").with_parent(ToplevelId(2)));
        f.add(ToplevelInfo::new(5, "org.gnome.Settings").with_parent(ToplevelId(2)));

        let ids: Vec<_> = f
            .overview
            .carousel()
            .iter()
            .map(|(_, a)| a.toplevel().map(|t| t.0))
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(4), Some(5), Some(3)]);
    }

    #[test]
    fn has_activities_notifies_on_boundaries_only() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "a"));
        f.add(ToplevelInfo::new(2, "b"));
        assert_eq!(f.overview.drain_signals(), vec![OverviewSignal::HasActivitiesChanged(true)]);

        f.send(ToplevelEvent::Closed { id: ToplevelId(1) }).unwrap();
        assert!(f.overview.drain_signals().is_empty());
        assert!(f.overview.has_activities());

        f.send(ToplevelEvent::Closed { id: ToplevelId(2) }).unwrap();
        assert_eq!(f.overview.drain_signals(), vec![OverviewSignal::HasActivitiesChanged(false)]);
        assert!(!f.overview.has_activities());
    }

    #[test]
    fn closing_focused_window_clears_focus() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "a"));
        f.add(ToplevelInfo::new(2, "b").with_activated(true));
        let focused = f.overview.carousel().focused();
        assert_eq!(focused, f.overview.carousel().find_by_toplevel(&ToplevelId(2)));

        f.send(ToplevelEvent::Closed { id: ToplevelId(2) }).unwrap();
        assert_eq!(f.overview.carousel().len(), 1);
        assert_eq!(f.overview.carousel().focused(), None);
        assert_eq!(f.app_ids(), vec!["a"]);
    }

    #[test]
    fn unknown_window_close_is_reported_not_fatal() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "a"));

        let err = f.send(ToplevelEvent::Closed { id: ToplevelId(42) }).unwrap_err();
        assert!(err.is_invariant_violation());
        let err = f.send(ToplevelEvent::Changed(ToplevelInfo::new(42, "x"))).unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(f.overview.carousel().len(), 1);
    }

    #[test]
    fn activation_scrolls_to_window() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "a"));
        f.add(ToplevelInfo::new(2, "b"));

        f.send(ToplevelEvent::ActivatedChanged(ToplevelInfo::new(1, "a").with_activated(true)))
            .unwrap();

        let target = f.overview.carousel().find_by_toplevel(&ToplevelId(1));
        assert_eq!(f.overview.carousel().scroll_target(), target);
        assert_eq!(f.overview.carousel().focused(), target);
        assert_eq!(f.overview.carousel().key_focus(), target);

        // Потеря активации ничего не меняет
        f.send(ToplevelEvent::ActivatedChanged(ToplevelInfo::new(1, "a"))).unwrap();
        assert_eq!(f.overview.carousel().scroll_target(), target);
    }

    #[test]
    fn click_activates_window_or_raises_splash() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));
        f.send(LaunchEvent::started("org.gnome.Calls", "calls-1")).unwrap();
        f.overview.drain_signals();

        f.send(UiEvent::Clicked { activity: ActivityRef::Page(0) }).unwrap();
        f.send(UiEvent::Clicked { activity: ActivityRef::Page(1) }).unwrap();

        assert_eq!(f.registry.commands(), vec![ToplevelCommand::Activate(ToplevelId(1))]);
        assert_eq!(
            f.splash.commands(),
            vec![SplashCommand::LowerAll, SplashCommand::Raise(StartupId::new("calls-1"))]
        );
        assert_eq!(
            f.overview.drain_signals(),
            vec![OverviewSignal::ActivityRaised, OverviewSignal::ActivityRaised]
        );
    }

    #[test]
    fn click_on_splash_without_token_only_warns() {
        let mut f = Fixture::new();
        f.send(LaunchEvent::started("org.gnome.Calls", "")).unwrap();
        f.send(UiEvent::Clicked { activity: ActivityRef::Page(0) }).unwrap();
        assert!(f.splash.commands().is_empty());
    }

    #[test]
    fn user_close_is_asynchronous() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));

        f.send(UiEvent::CloseRequested { activity: ActivityRef::Page(0) }).unwrap();
        // Карточка остаётся до события closed от реестра
        assert_eq!(f.overview.carousel().len(), 1);
        assert_eq!(f.registry.commands(), vec![ToplevelCommand::Close(ToplevelId(1))]);
        assert_eq!(f.shell.feedback(), vec!["window-close".to_string()]);

        f.send(ToplevelEvent::Closed { id: ToplevelId(1) }).unwrap();
        assert!(f.overview.carousel().is_empty());
    }

    #[test]
    fn fullscreen_is_mirrored_both_ways() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));

        f.send(UiEvent::FullscreenRequested { activity: ActivityRef::Page(0), fullscreen: true })
            .unwrap();
        assert!(f.activity(0).geometry.fullscreen);
        assert_eq!(f.registry.commands(), vec![ToplevelCommand::Fullscreen(ToplevelId(1), true)]);

        f.send(ToplevelEvent::Changed(ToplevelInfo::new(1, "org.gnome.Maps").with_maximized(true)))
            .unwrap();
        assert!(f.activity(0).geometry.maximized);
        assert!(!f.activity(0).geometry.fullscreen);
    }

    #[test]
    fn changed_requests_thumbnail_only_when_hidden() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));

        f.shell.set_overview_visible(true);
        f.send(ToplevelEvent::Changed(ToplevelInfo::new(1, "org.gnome.Maps"))).unwrap();
        assert_eq!(f.thumbnails.pending(), 0);

        f.shell.set_overview_visible(false);
        f.send(ToplevelEvent::Changed(ToplevelInfo::new(1, "org.gnome.Maps"))).unwrap();
        assert_eq!(f.thumbnails.pending(), 1);
    }

    #[test]
    fn thumbnail_for_destroyed_activity_is_dropped() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));
        let id = f.overview.carousel().nth(0).unwrap();

        f.send(UiEvent::Resized { activity: ActivityRef::Id(id), width: 100, height: 180 })
            .unwrap();
        assert_eq!(f.thumbnails.pending(), 1);

        f.send(ToplevelEvent::Closed { id: ToplevelId(1) }).unwrap();
        // Запрос отменён вместе с активностью
        assert_eq!(f.thumbnails.pending(), 0);

        f.send(OverviewEvent::ThumbnailReady { activity: id, request: ThumbnailRequestId(1) })
            .unwrap();
        assert!(f.overview.carousel().is_empty());
    }

    #[test]
    fn huge_resize_saturates_and_empty_resize_is_rejected() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));

        f.send(UiEvent::Resized { activity: ActivityRef::Page(0), width: i32::MAX / 2 + 1, height: i32::MAX })
            .unwrap();
        assert_eq!(f.thumbnails.pending(), 1);

        let err = f
            .send(UiEvent::Resized { activity: ActivityRef::Page(0), width: 0, height: 100 })
            .unwrap_err();
        assert!(matches!(err, OverviewError::InvalidSize { width: 0, height: 100 }));
        assert!(!err.is_invariant_violation());
        let err = f
            .send(UiEvent::Resized { activity: ActivityRef::Page(0), width: 100, height: -5 })
            .unwrap_err();
        assert!(matches!(err, OverviewError::InvalidSize { .. }));

        // Прежнее выделение не затёрто
        assert_eq!(
            f.activity(0).thumbnail_size(),
            Allocation { width: i32::MAX / 2 + 1, height: i32::MAX }
        );
        assert_eq!(f.thumbnails.pending(), 1);
    }

    #[test]
    fn focus_change_scrolls_without_moving_key_focus() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "a").with_activated(true));
        f.add(ToplevelInfo::new(2, "b"));
        let first = f.overview.carousel().nth(0);
        let second = f.overview.carousel().nth(1);

        f.send(UiEvent::FocusChanged { activity: ActivityRef::Page(1), has_focus: true })
            .unwrap();
        assert_eq!(f.overview.carousel().scroll_target(), second);
        assert_eq!(f.overview.carousel().key_focus(), first);

        f.send(UiEvent::FocusChanged { activity: ActivityRef::Page(0), has_focus: false })
            .unwrap();
        assert_eq!(f.overview.carousel().scroll_target(), second);
    }

    #[test]
    fn resize_then_ready_sets_thumbnail() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));
        let id = f.overview.carousel().nth(0).unwrap();

        f.send(UiEvent::Resized { activity: ActivityRef::Id(id), width: 100, height: 180 })
            .unwrap();
        f.send(OverviewEvent::ThumbnailReady { activity: id, request: ThumbnailRequestId(1) })
            .unwrap();

        assert!(f.activity(0).has_thumbnail);
        assert_eq!(f.activity(0).thumbnail_size(), Allocation { width: 100, height: 180 });
    }

    #[test]
    fn page_change_activates_only_in_visible_undocked_overview() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "a"));
        f.add(ToplevelInfo::new(2, "b"));

        f.send(UiEvent::PageChanged { index: Some(1) }).unwrap();
        assert!(f.registry.commands().is_empty());

        f.shell.set_overview_visible(true);
        f.shell.set_docked(true);
        f.send(UiEvent::PageChanged { index: Some(1) }).unwrap();
        assert!(f.registry.commands().is_empty());

        f.shell.set_docked(false);
        f.send(UiEvent::PageChanged { index: None }).unwrap();
        f.send(UiEvent::PageChanged { index: Some(1) }).unwrap();
        assert_eq!(f.registry.commands(), vec![ToplevelCommand::Activate(ToplevelId(2))]);
        assert_eq!(f.overview.carousel().key_focus(), f.overview.carousel().nth(1));
    }

    #[test]
    fn initial_sync_projects_open_windows() {
        let registry = InMemoryToplevelManager::new();
        registry.add(ToplevelInfo::new(1, "org.gnome.Settings"));
        registry.add(ToplevelInfo::new(2, "org.gnome.Maps").with_activated(true));
        registry.add(ToplevelInfo::new(3, "org.gnome.Settings.Dialog").with_parent(ToplevelId(1)));

        let f = Fixture::with_registry(registry, None);
        assert_eq!(
            f.app_ids(),
            vec!["org.gnome.Settings", "org.gnome.Settings.Dialog", "org.gnome.Maps"]
        );
        assert!(f.overview.has_activities());
        assert_eq!(
            f.overview.carousel().focused(),
            f.overview.carousel().find_by_toplevel(&ToplevelId(2))
        );
    }

    #[test]
    fn stale_launches_expire_after_timeout() {
        let mut f = Fixture::with_registry(InMemoryToplevelManager::new(), Some(Duration::from_secs(30)));
        let start = Instant::now();
        f.overview
            .on_launch_started("org.gnome.Calls", &StartupId::new("calls-1"), start)
            .unwrap();
        f.add(ToplevelInfo::new(1, "org.gnome.Maps"));

        assert_eq!(f.overview.expire_stale_launches(start + Duration::from_secs(10)), 0);
        assert_eq!(f.overview.expire_stale_launches(start + Duration::from_secs(31)), 1);
        assert_eq!(f.app_ids(), vec!["org.gnome.Maps"]);
    }

    #[test]
    fn usable_area_updates_all_hints() {
        let mut f = Fixture::new();
        f.add(ToplevelInfo::new(1, "a"));
        f.send(LaunchEvent::started("b", "b-1")).unwrap();

        f.send(UiEvent::UsableAreaChanged { width: 720, height: 1280 }).unwrap();
        for index in 0..2 {
            assert_eq!(f.activity(index).geometry.width, 720);
            assert_eq!(f.activity(index).geometry.height, 1280);
        }
    }

    #[test]
    fn passthrough_signals() {
        let mut f = Fixture::new();
        f.send(UiEvent::AppLaunched { app_id: "org.gnome.Maps".into() }).unwrap();
        f.send(UiEvent::SelectionAborted).unwrap();
        assert_eq!(
            f.overview.drain_signals(),
            vec![OverviewSignal::ActivityLaunched, OverviewSignal::SelectionAborted]
        );
    }

    #[test]
    fn app_grid_events_reach_the_grid() {
        let mut f = Fixture::new();

        f.send(UiEvent::FocusAppSearch).unwrap();
        assert!(f.grid.is_search_focused());

        f.send(UiEvent::Search { input: SearchInput::Char('m') }).unwrap();
        f.send(UiEvent::Search { input: SearchInput::Char('a') }).unwrap();
        f.send(UiEvent::Search { input: SearchInput::Backspace }).unwrap();
        assert_eq!(f.grid.query(), "m");
        assert_eq!(f.overview.handle_search(SearchInput::Other), EventPropagation::Proceed);

        f.send(UiEvent::Reset).unwrap();
        assert_eq!(f.grid.query(), "");
        assert!(!f.grid.is_search_focused());
    }

    #[test]
    fn refresh_event_requests_thumbnail_for_focused() {
        let mut f = Fixture::new();
        f.send(UiEvent::Refresh).unwrap();
        assert_eq!(f.thumbnails.pending(), 0);

        f.add(ToplevelInfo::new(1, "a").with_activated(true));
        f.send(UiEvent::Refresh).unwrap();
        assert_eq!(f.thumbnails.pending(), 1);
    }
}
