//! Browse a JSON list of TV episodes as a filterable, sortable table.
//!
//! episode-explorer fetches an episode list (by default the Doctor Who
//! dataset) from a remote JSON endpoint, filters and sorts it in memory, and
//! shows it in a full-screen TUI or writes it out as a plain-text or HTML
//! table.
//!
//! # Features
//!
//! - Filter by title, era, series, broadcast year, rating, or any field
//! - Stable sorting on any column, ascending or descending
//! - Reload at any time; late responses never overwrite newer ones
//! - Plain-text and HTML output for scripting
//!
//! # Usage
//!
//! ```bash
//! # Interactive table
//! cargo run
//!
//! # Modern-era episodes by rating, as HTML
//! cargo run -- -o html -f "era:modern" -s rating --desc
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod query;
pub mod render;
pub mod state;
pub mod tui;
pub mod types;
