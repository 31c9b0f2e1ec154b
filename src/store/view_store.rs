//! View store
//!
//! Holds the filter, sort mode, search query and visual preferences. Only the
//! preferences are persisted; everything else resets when the store is opened.

use super::{Listeners, Notice, NoticeKind, PersistError, SubscriptionId};
use crate::domain::{apply_sort, Preferences, SortMode, StatusFilter, Task, Theme, ViewState};
use crate::storage::{decode_preferences, encode_preferences, KeyValueStore, PREFERENCES_KEY};

/// Change notification sent to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    FilterChanged(StatusFilter),
    SortModeChanged(SortMode),
    SearchChanged(String),
    PreferencesChanged(Preferences),
    PersistFailed(String),
}

pub struct ViewStore {
    state: ViewState,
    storage: Box<dyn KeyValueStore>,
    listeners: Listeners<ViewEvent>,
    notices: Vec<Notice>,
}

impl ViewStore {
    /// Opens the view store, restoring saved preferences when they are valid
    pub fn open(storage: impl KeyValueStore + 'static) -> Self {
        let storage: Box<dyn KeyValueStore> = Box::new(storage);
        let mut notices = Vec::new();

        let preferences = match Self::load(storage.as_ref()) {
            Ok(preferences) => preferences,
            Err(message) => {
                tracing::warn!(%message, "using default preferences");
                notices.push(Notice::new(NoticeKind::LoadFallback, message));
                Preferences::default()
            }
        };

        Self {
            state: ViewState::with_preferences(preferences),
            storage,
            listeners: Listeners::default(),
            notices,
        }
    }

    fn load(storage: &dyn KeyValueStore) -> Result<Preferences, String> {
        let raw = storage
            .get(PREFERENCES_KEY)
            .map_err(|e| format!("Could not read saved preferences: {}", e))?;

        match raw {
            None => Ok(Preferences::default()),
            Some(raw) => decode_preferences(&raw)
                .map_err(|e| format!("Saved preferences were discarded: {}", e)),
        }
    }

    /// Writes the preferences under the preferences key
    pub fn save(&self) -> Result<(), PersistError> {
        let raw = encode_preferences(&self.state.preferences)?;
        self.storage.set(PREFERENCES_KEY, &raw)?;
        Ok(())
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn filter(&self) -> StatusFilter {
        self.state.filter
    }

    pub fn sort_mode(&self) -> SortMode {
        self.state.sort_mode
    }

    pub fn search_query(&self) -> &str {
        &self.state.search_query
    }

    pub fn preferences(&self) -> Preferences {
        self.state.preferences
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.state.filter = filter;
        self.listeners.emit(&ViewEvent::FilterChanged(filter));
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.state.sort_mode = mode;
        self.listeners.emit(&ViewEvent::SortModeChanged(mode));
    }

    /// Stores the query as given; trimming happens at match time
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
        self.listeners
            .emit(&ViewEvent::SearchChanged(self.state.search_query.clone()));
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.preferences.theme = theme;
        self.commit_preferences();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.state.preferences.theme.toggled();
        self.set_theme(theme);
        theme
    }

    pub fn set_reduce_animations(&mut self, enabled: bool) {
        self.state.preferences.reduce_animations = enabled;
        self.commit_preferences();
    }

    fn commit_preferences(&mut self) {
        let preferences = self.state.preferences;
        tracing::debug!(
            theme = %preferences.theme,
            reduce_animations = preferences.reduce_animations,
            "preferences changed"
        );

        if let Err(e) = self.save() {
            let message = format!("Preferences could not be saved: {}", e);
            tracing::warn!(error = %e, "preferences write failed");
            self.notices
                .push(Notice::new(NoticeKind::PersistFailed, message.clone()));
            self.listeners.emit(&ViewEvent::PersistFailed(message));
        }
        self.listeners
            .emit(&ViewEvent::PreferencesChanged(preferences));
    }

    /// Orders `tasks` by the current sort mode
    pub fn apply_sort(&self, tasks: Vec<Task>) -> Vec<Task> {
        apply_sort(tasks, self.state.sort_mode)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ViewEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
