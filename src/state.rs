//! Explicit application state shared by every front end.
//!
//! [`AppState`] owns the episode set, the active filters and sort, and the
//! derived filtered set. The filtered set is rebuilt through
//! [`query::apply`] whenever one of its inputs changes.

use crate::error::LoadError;
use crate::loader::LoadToken;
use crate::query::{self, FilterSet, SortField, SortState};
use crate::types::Episode;
use log::{debug, warn};

/// What [`AppState::finish_load`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The episode set was replaced
    Applied,
    /// The load failed and the error message is now visible
    Failed,
    /// A newer load was issued after this one; the result was dropped
    Stale,
}

/// Episode set, query inputs and load lifecycle.
#[derive(Debug, Default)]
pub struct AppState {
    episodes: Vec<Episode>,
    filtered: Vec<Episode>,
    filters: FilterSet,
    sort: SortState,
    last_token: u64,
    pending: Option<LoadToken>,
    error: Option<&'static str>,
}

impl AppState {
    pub fn new(filters: FilterSet, sort: SortState) -> Self {
        Self {
            filters,
            sort,
            ..Self::default()
        }
    }

    /// The full episode set as last loaded.
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// The episodes currently on display.
    pub fn filtered(&self) -> &[Episode] {
        &self.filtered
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Whether the loading indicator is visible.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// The visible error message, if the last load failed.
    pub fn error_message(&self) -> Option<&'static str> {
        self.error
    }

    /// Start a load attempt, superseding any pending one.
    pub fn begin_load(&mut self) -> LoadToken {
        self.last_token += 1;
        let token = LoadToken(self.last_token);
        if let Some(previous) = self.pending.replace(token) {
            debug!("Load {:?} superseded by {:?}", previous, token);
        }
        self.error = None;
        token
    }

    /// Apply the result of the load identified by `token`.
    ///
    /// Only the most recently issued load is applied; older results are
    /// dropped so a late response can never overwrite a newer one.
    pub fn finish_load(
        &mut self,
        token: LoadToken,
        result: Result<Vec<Episode>, LoadError>,
    ) -> LoadOutcome {
        if self.pending != Some(token) {
            warn!("Discarding stale response for load {:?}", token);
            return LoadOutcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(episodes) => {
                self.episodes = episodes;
                self.error = None;
                self.refresh();
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!("Load {:?} failed: {}", token, e);
                self.error = Some(e.user_message());
                LoadOutcome::Failed
            }
        }
    }

    /// Replace the active filters.
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.refresh();
    }

    /// Sort by `field`, flipping direction if it is already the sort field.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
        self.refresh();
    }

    /// Flip the sort direction on the current field.
    pub fn reverse_sort(&mut self) {
        self.sort.ascending = !self.sort.ascending;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.filtered = query::apply(&self.episodes, &self.filters, &self.sort);
        debug!(
            "Filtered {} of {} episodes by {:?}",
            self.filtered.len(),
            self.episodes.len(),
            self.sort
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LOAD_FAILURE_MESSAGE;
    use crate::query::Predicate;

    fn sample() -> Vec<Episode> {
        vec![Episode::new(1, "A"), Episode::new(3, "B"), Episode::new(2, "C")]
    }

    fn titles(state: &AppState) -> Vec<&str> {
        state.filtered().iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_successful_load_refreshes_filtered_set() {
        let mut state = AppState::default();
        let token = state.begin_load();
        assert!(state.is_loading());

        assert_eq!(state.finish_load(token, Ok(sample())), LoadOutcome::Applied);
        assert!(!state.is_loading());
        assert_eq!(titles(&state), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_load_applies_active_filters() {
        let filters = FilterSet::new(vec![Predicate::TitleContains("B".to_string())]);
        let mut state = AppState::new(filters, SortState::default());
        let token = state.begin_load();
        state.finish_load(token, Ok(sample()));
        assert_eq!(titles(&state), vec!["B"]);
    }

    #[test]
    fn test_failed_load_keeps_previous_set() {
        let mut state = AppState::default();
        let first = state.begin_load();
        state.finish_load(first, Ok(sample()));

        let second = state.begin_load();
        let outcome = state.finish_load(second, Err(LoadError::Status(500)));
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(state.episodes().len(), 3);
        assert_eq!(state.error_message(), Some(LOAD_FAILURE_MESSAGE));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = AppState::default();
        let old = state.begin_load();
        let new = state.begin_load();

        assert_eq!(state.finish_load(new, Ok(sample())), LoadOutcome::Applied);
        let late = vec![Episode::new(99, "Late")];
        assert_eq!(state.finish_load(old, Ok(late)), LoadOutcome::Stale);
        assert_eq!(state.episodes().len(), 3);
    }

    #[test]
    fn test_stale_failure_does_not_show_error() {
        let mut state = AppState::default();
        let old = state.begin_load();
        let _new = state.begin_load();

        let outcome = state.finish_load(old, Err(LoadError::Network("reset".to_string())));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(state.error_message(), None);
        assert!(state.is_loading());
    }

    #[test]
    fn test_begin_load_hides_error() {
        let mut state = AppState::default();
        let token = state.begin_load();
        state.finish_load(token, Err(LoadError::Parse("eof".to_string())));
        assert!(state.error_message().is_some());

        state.begin_load();
        assert!(state.error_message().is_none());
    }

    #[test]
    fn test_duplicate_result_is_stale() {
        let mut state = AppState::default();
        let token = state.begin_load();
        state.finish_load(token, Ok(sample()));
        assert_eq!(state.finish_load(token, Ok(Vec::new())), LoadOutcome::Stale);
        assert_eq!(state.episodes().len(), 3);
    }

    #[test]
    fn test_sort_changes_refresh() {
        let mut state = AppState::default();
        let token = state.begin_load();
        state.finish_load(token, Ok(sample()));

        state.toggle_sort(SortField::Rank);
        assert_eq!(titles(&state), vec!["B", "C", "A"]);

        state.toggle_sort(SortField::Title);
        assert_eq!(titles(&state), vec!["A", "B", "C"]);

        state.reverse_sort();
        assert_eq!(titles(&state), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_set_filters_refresh() {
        let mut state = AppState::default();
        let token = state.begin_load();
        state.finish_load(token, Ok(sample()));

        state.set_filters(FilterSet::parse("zzz").unwrap());
        assert!(state.filtered().is_empty());

        state.set_filters(FilterSet::default());
        assert_eq!(state.filtered().len(), 3);
    }
}
