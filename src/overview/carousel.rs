//! Ordered strip of activities.
//!
//! Entries live in an arena so that the focus and scroll references are plain
//! handles: removing an entry invalidates its handle and clears every
//! reference that pointed at it.

use super::activity::{Activity, ActivityId};
use crate::events::{ActivityRef, StartupId, ToplevelId};
use crate::services::AppInfo;
use slotmap::SlotMap;
use smallvec::SmallVec;

#[derive(Debug, Default)]
pub struct Carousel {
    activities: SlotMap<ActivityId, Activity>,
    order: Vec<ActivityId>,
    /// Активность окна, которое композитор считает активным
    focused: Option<ActivityId>,
    scroll_target: Option<ActivityId>,
    key_focus: Option<ActivityId>,
    has_activities: bool,
    has_activities_changes: SmallVec<[bool; 2]>,
}

impl Carousel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn has_activities(&self) -> bool {
        self.has_activities
    }

    /// Переходы has-activities с момента прошлого вызова
    pub fn drain_has_activities_changes(&mut self) -> SmallVec<[bool; 2]> {
        std::mem::take(&mut self.has_activities_changes)
    }

    fn update_has_activities(&mut self) {
        let has_activities = !self.order.is_empty();
        if has_activities != self.has_activities {
            self.has_activities = has_activities;
            self.has_activities_changes.push(has_activities);
        }
    }

    pub fn push(&mut self, activity: Activity) -> ActivityId {
        let id = self.activities.insert(activity);
        self.order.push(id);
        self.update_has_activities();
        id
    }

    /// Вставка в позицию `pos`; позиция за концом означает вставку в хвост
    pub fn insert(&mut self, pos: usize, activity: Activity) -> ActivityId {
        let id = self.activities.insert(activity);
        let pos = pos.min(self.order.len());
        self.order.insert(pos, id);
        self.update_has_activities();
        id
    }

    pub fn remove(&mut self, id: ActivityId) -> Option<Activity> {
        let activity = self.activities.remove(id)?;
        self.order.retain(|other| *other != id);

        for reference in [&mut self.focused, &mut self.scroll_target, &mut self.key_focus] {
            if *reference == Some(id) {
                *reference = None;
            }
        }

        self.update_has_activities();
        Some(activity)
    }

    pub fn get(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.get(id)
    }

    pub fn get_mut(&mut self, id: ActivityId) -> Option<&mut Activity> {
        self.activities.get_mut(id)
    }

    pub fn contains(&self, id: ActivityId) -> bool {
        self.activities.contains_key(id)
    }

    pub fn nth(&self, index: usize) -> Option<ActivityId> {
        self.order.get(index).copied()
    }

    pub fn resolve(&self, activity: ActivityRef) -> Option<ActivityId> {
        match activity {
            ActivityRef::Id(id) => self.contains(id).then_some(id),
            ActivityRef::Page(index) => self.nth(index),
        }
    }

    /// Активности в порядке карусели
    pub fn iter(&self) -> impl Iterator<Item = (ActivityId, &Activity)> + '_ {
        self.order.iter().map(move |id| (*id, &self.activities[*id]))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Activity> + '_ {
        self.activities.values_mut()
    }

    pub fn focused(&self) -> Option<ActivityId> {
        self.focused
    }

    pub fn set_focused(&mut self, id: ActivityId) {
        if self.contains(id) {
            self.focused = Some(id);
        }
    }

    #[cfg(test)]
    pub fn scroll_target(&self) -> Option<ActivityId> {
        self.scroll_target
    }

    pub fn key_focus(&self) -> Option<ActivityId> {
        self.key_focus
    }

    /// Прокрутка к активности; фокус ввода переходит к ней же
    pub fn scroll_to(&mut self, id: ActivityId) {
        if self.contains(id) {
            self.scroll_target = Some(id);
            self.key_focus = Some(id);
        }
    }

    /// Прокрутка без передачи фокуса (фокус уже у активности)
    pub fn scroll_only(&mut self, id: ActivityId) {
        if self.contains(id) {
            self.scroll_target = Some(id);
        }
    }

    pub fn grab_focus(&mut self, id: ActivityId) {
        if self.contains(id) {
            self.key_focus = Some(id);
        }
    }

    /// Позиция сразу за последней активностью группы `app_id`: самим
    /// родителем или уже вставленным дочерним окном того же родителя
    pub fn last_group_pos(&self, app_id: &str) -> Option<usize> {
        self.order
            .iter()
            .rposition(|id| {
                let activity = &self.activities[*id];
                activity.app_id.as_deref() == Some(app_id) || activity.parent_app_id.as_deref() == Some(app_id)
            })
            .map(|pos| pos + 1)
    }

    pub fn find_by_toplevel(&self, toplevel: &ToplevelId) -> Option<ActivityId> {
        self.iter()
            .find(|(_, activity)| activity.toplevel().as_ref() == Some(toplevel))
            .map(|(id, _)| id)
    }

    pub fn find_by_app_info(&self, app_info: &AppInfo) -> Option<ActivityId> {
        self.iter()
            .find(|(_, activity)| activity.app_info.as_ref() == Some(app_info))
            .map(|(id, _)| id)
    }

    pub fn find_launching_by_startup_id(&self, startup_id: &StartupId) -> Option<ActivityId> {
        self.iter()
            .find(|(_, activity)| activity.startup_id() == Some(startup_id))
            .map(|(id, _)| id)
    }
}
