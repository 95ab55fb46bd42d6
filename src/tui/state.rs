//! TUI state management and input handling.

use crate::error::LoadError;
use crate::loader::LoadToken;
use crate::query::{FilterSet, SortField};
use crate::state::{AppState, LoadOutcome};
use crate::types::Episode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;

use super::types::{Action, Focus};

/// Application state for the TUI.
pub struct App {
    /// Episodes, query inputs and load lifecycle
    pub state: AppState,
    /// Selection within the episode table
    pub table_state: TableState,
    /// Current focus
    pub focus: Focus,
    /// Text in the filter bar
    pub filter_input: String,
    /// Parse error for the filter bar text
    pub filter_error: Option<String>,
    /// Whether help modal is shown
    pub show_help: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Where episodes are loaded from, shown in the header
    pub source: String,
}

impl App {
    /// Create a new App around an initial state.
    pub fn new(state: AppState, source: String) -> Self {
        let filter_input = state.filters().to_query();
        Self {
            state,
            table_state: TableState::default(),
            focus: Focus::Table,
            filter_input,
            filter_error: None,
            show_help: false,
            should_quit: false,
            source,
        }
    }

    /// Hand a finished load to the state and fix up the selection.
    pub fn finish_load(
        &mut self,
        token: LoadToken,
        result: Result<Vec<Episode>, LoadError>,
    ) -> LoadOutcome {
        let outcome = self.state.finish_load(token, result);
        if outcome == LoadOutcome::Applied {
            self.select_first();
        }
        outcome
    }

    /// The episode under the cursor.
    pub fn selected_episode(&self) -> Option<&Episode> {
        self.table_state
            .selected()
            .and_then(|i| self.state.filtered().get(i))
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return Action::None;
        }

        match self.focus {
            Focus::FilterBar => self.handle_filter_input(key),
            Focus::Table => self.handle_table_input(key),
        }
    }

    fn handle_table_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Action::Quit
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                Action::None
            }
            KeyCode::Char('/') => {
                self.focus = Focus::FilterBar;
                Action::None
            }
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Char('d') => {
                self.state.reverse_sort();
                self.select_first();
                Action::None
            }
            KeyCode::Char('c') => {
                self.filter_input.clear();
                self.filter_error = None;
                self.state.set_filters(FilterSet::default());
                self.select_first();
                Action::None
            }
            KeyCode::Char(c @ '1'..='9') => {
                let column = c.to_digit(10).unwrap_or(0) as usize;
                if let Some(field) = SortField::from_column(column) {
                    self.state.toggle_sort(field);
                    self.select_first();
                }
                Action::None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_offset(1);
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_offset(-1);
                Action::None
            }
            KeyCode::PageDown => {
                self.select_offset(10);
                Action::None
            }
            KeyCode::PageUp => {
                self.select_offset(-10);
                Action::None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select_first();
                Action::None
            }
            KeyCode::Char('G') | KeyCode::End => {
                let len = self.state.filtered().len();
                self.table_state.select(len.checked_sub(1));
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_filter_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => {
                match FilterSet::parse(&self.filter_input) {
                    Ok(filters) => {
                        self.filter_error = None;
                        self.state.set_filters(filters);
                        self.focus = Focus::Table;
                        self.select_first();
                    }
                    Err(e) => self.filter_error = Some(e.to_string()),
                }
                Action::None
            }
            KeyCode::Esc => {
                // Discard edits
                self.filter_input = self.state.filters().to_query();
                self.filter_error = None;
                self.focus = Focus::Table;
                Action::None
            }
            KeyCode::Char(c) => {
                self.filter_input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.filter_input.pop();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn select_first(&mut self) {
        let selection = if self.state.filtered().is_empty() {
            None
        } else {
            Some(0)
        };
        self.table_state.select(selection);
    }

    fn select_offset(&mut self, offset: isize) {
        let len = self.state.filtered().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + offset).clamp(0, len as isize - 1);
        self.table_state.select(Some(next as usize));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_input(key(KeyCode::Char(c)));
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new(AppState::default(), "test".to_string());
        let token = app.state.begin_load();
        let episodes = vec![
            Episode::new(1, "A"),
            Episode::new(3, "B"),
            Episode::new(2, "C"),
        ];
        app.finish_load(token, Ok(episodes));
        app
    }

    #[test]
    fn test_load_selects_first_row() {
        let app = loaded_app();
        assert_eq!(app.table_state.selected(), Some(0));
        assert_eq!(app.selected_episode().map(|e| e.rank), Some(1));
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut app = loaded_app();
        app.handle_input(key(KeyCode::Up));
        assert_eq!(app.table_state.selected(), Some(0));
        for _ in 0..5 {
            app.handle_input(key(KeyCode::Char('j')));
        }
        assert_eq!(app.table_state.selected(), Some(2));
        app.handle_input(key(KeyCode::Char('g')));
        assert_eq!(app.table_state.selected(), Some(0));
        app.handle_input(key(KeyCode::Char('G')));
        assert_eq!(app.selected_episode().map(|e| e.rank), Some(3));
    }

    #[test]
    fn test_filter_bar_applies_on_enter() {
        let mut app = loaded_app();
        app.handle_input(key(KeyCode::Char('/')));
        assert_eq!(app.focus, Focus::FilterBar);

        type_text(&mut app, "b");
        // Not applied while typing
        assert_eq!(app.state.filtered().len(), 3);

        app.handle_input(key(KeyCode::Enter));
        assert_eq!(app.focus, Focus::Table);
        assert_eq!(app.state.filtered().len(), 1);
        assert_eq!(app.selected_episode().map(|e| e.title.as_str()), Some("B"));
    }

    #[test]
    fn test_filter_bar_reports_parse_errors() {
        let mut app = loaded_app();
        app.handle_input(key(KeyCode::Char('/')));
        type_text(&mut app, "series:x");
        app.handle_input(key(KeyCode::Enter));

        assert_eq!(app.focus, Focus::FilterBar);
        assert!(app.filter_error.is_some());
        assert!(app.state.filters().is_empty());
    }

    #[test]
    fn test_filter_bar_escape_discards_edits() {
        let mut app = loaded_app();
        app.handle_input(key(KeyCode::Char('/')));
        type_text(&mut app, "zzz");
        app.handle_input(key(KeyCode::Esc));

        assert_eq!(app.filter_input, "");
        assert_eq!(app.state.filtered().len(), 3);
    }

    #[test]
    fn test_over_restrictive_filter_clears_selection() {
        let mut app = loaded_app();
        app.handle_input(key(KeyCode::Char('/')));
        type_text(&mut app, "nothing");
        app.handle_input(key(KeyCode::Enter));

        assert!(app.state.filtered().is_empty());
        assert_eq!(app.table_state.selected(), None);
        assert!(app.selected_episode().is_none());

        app.handle_input(key(KeyCode::Char('c')));
        assert_eq!(app.state.filtered().len(), 3);
    }

    #[test]
    fn test_sort_keys() {
        let mut app = loaded_app();
        app.handle_input(key(KeyCode::Char('2')));
        assert_eq!(app.state.sort().field, SortField::Title);

        app.handle_input(key(KeyCode::Char('2')));
        assert!(!app.state.sort().ascending);

        app.handle_input(key(KeyCode::Char('d')));
        assert!(app.state.sort().ascending);

        // Column 7 is not sortable
        app.handle_input(key(KeyCode::Char('7')));
        assert_eq!(app.state.sort().field, SortField::Title);
    }

    #[test]
    fn test_reload_and_quit_actions() {
        let mut app = loaded_app();
        assert_eq!(app.handle_input(key(KeyCode::Char('r'))), Action::Reload);
        assert_eq!(app.handle_input(key(KeyCode::Char('q'))), Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = loaded_app();
        app.handle_input(key(KeyCode::Char('?')));
        assert!(app.show_help);
        assert_eq!(app.handle_input(key(KeyCode::Char('r'))), Action::None);
        app.handle_input(key(KeyCode::Esc));
        assert!(!app.show_help);
    }

    #[test]
    fn test_ctrl_c_quits_from_filter_bar() {
        let mut app = loaded_app();
        app.handle_input(key(KeyCode::Char('/')));
        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(app.handle_input(ctrl_c), Action::Quit);
    }
}
