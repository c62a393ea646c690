use crate::events::{EventPropagation, SearchInput};
use parking_lot::Mutex;
use tracing::debug;

/// Сетка приложений. Обзор только делегирует ей сброс и поиск
pub trait AppGrid: Send + Sync {
    fn reset(&self);
    fn focus_search(&self);
    fn handle_search(&self, input: SearchInput) -> EventPropagation;
}

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    focused: bool,
}

/// Сетка, которая хранит только строку поиска
#[derive(Debug, Default)]
pub struct SearchAppGrid {
    state: Mutex<SearchState>,
}

impl SearchAppGrid {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    #[cfg(test)]
    pub fn is_search_focused(&self) -> bool {
        self.state.lock().focused
    }
}

impl AppGrid for SearchAppGrid {
    fn reset(&self) {
        let mut state = self.state.lock();
        state.query.clear();
        state.focused = false;
        debug!("Сетка приложений сброшена");
    }

    fn focus_search(&self) {
        self.state.lock().focused = true;
    }

    fn handle_search(&self, input: SearchInput) -> EventPropagation {
        let mut state = self.state.lock();
        match input {
            SearchInput::Char(c) if !c.is_control() => {
                state.query.push(c);
                state.focused = true;
                EventPropagation::Stop
            }
            SearchInput::Backspace if !state.query.is_empty() => {
                state.query.pop();
                EventPropagation::Stop
            }
            SearchInput::Escape if !state.query.is_empty() => {
                state.query.clear();
                EventPropagation::Stop
            }
            _ => EventPropagation::Proceed,
        }
    }
}
