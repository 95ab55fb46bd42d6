//! TUI type definitions for focus and actions.

use crate::error::LoadError;
use crate::loader::LoadToken;
use crate::types::Episode;

/// Which part of the screen receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Browsing the episode table
    Table,
    /// Typing into the filter bar
    FilterBar,
}

/// Actions the event loop has to carry out on behalf of the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Fetch the episode list again
    Reload,
}

/// A finished load travelling from its task back to the UI loop.
pub type LoadMessage = (LoadToken, Result<Vec<Episode>, LoadError>);
