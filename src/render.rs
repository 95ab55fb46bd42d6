//! Table projection of the filtered set.
//!
//! [`TableView`] is the renderer-neutral form; the TUI draws it as a ratatui
//! table and the batch mode writes it as plain text or HTML. None of this
//! performs I/O or can fail.

use crate::query::SortState;
use crate::types::Episode;

/// Column headers, in display order. The first six are sortable.
pub const COLUMNS: [&str; 8] = [
    "Rank",
    "Title",
    "Series",
    "Era",
    "Broadcast",
    "Rating",
    "Doctor",
    "Companion",
];

/// Shown instead of an empty table.
pub const NO_RESULTS_MESSAGE: &str = "No episodes match the current filters.";

const MISSING: &str = "-";

/// One display row; `cells` lines up with [`COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn from_episode(episode: &Episode) -> Self {
        let text = |value: Option<String>| value.unwrap_or_else(|| MISSING.to_string());

        Self {
            cells: vec![
                episode.rank.to_string(),
                episode.title.clone(),
                text(episode.series.map(|s| s.to_string())),
                text(episode.era.clone()),
                text(episode.broadcast_date.clone()),
                text(episode.rating.map(|r| format!("{:.1}", r))),
                text(episode.extra_text("doctor")),
                text(episode.extra_text("companion")),
            ],
        }
    }
}

/// What the renderer shows for a filtered set.
#[derive(Debug, Clone, PartialEq)]
pub enum TableView {
    Rows(Vec<TableRow>),
    NoResults,
}

impl TableView {
    /// One row per episode, or [`TableView::NoResults`] for an empty set.
    pub fn from_episodes(episodes: &[Episode]) -> Self {
        if episodes.is_empty() {
            TableView::NoResults
        } else {
            TableView::Rows(episodes.iter().map(TableRow::from_episode).collect())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TableView::Rows(rows) => rows.len(),
            TableView::NoResults => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Header labels with the sort arrow on the sorted column.
pub fn header_labels(sort: &SortState) -> Vec<String> {
    COLUMNS
        .iter()
        .map(|column| {
            if *column == sort.field.label() {
                format!("{} {}", column, sort.indicator())
            } else {
                column.to_string()
            }
        })
        .collect()
}

/// Render as an aligned plain-text table.
pub fn to_plain(view: &TableView, sort: &SortState) -> String {
    let rows = match view {
        TableView::Rows(rows) => rows,
        TableView::NoResults => return format!("{}\n", NO_RESULTS_MESSAGE),
    };

    let headers = header_labels(sort);
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&format_line(&headers));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(&row.cells));
        out.push('\n');
    }
    out
}

/// Render as a standalone HTML table.
///
/// An empty view yields a single full-width "no results" row rather than an
/// empty body.
pub fn to_html(view: &TableView, sort: &SortState) -> String {
    let mut out = String::from("<table class=\"episodes\">\n  <thead>\n    <tr>");
    for label in header_labels(sort) {
        out.push_str(&format!("<th>{}</th>", escape_html(&label)));
    }
    out.push_str("</tr>\n  </thead>\n  <tbody>\n");

    match view {
        TableView::Rows(rows) => {
            for row in rows {
                out.push_str("    <tr>");
                for cell in &row.cells {
                    out.push_str(&format!("<td>{}</td>", escape_html(cell)));
                }
                out.push_str("</tr>\n");
            }
        }
        TableView::NoResults => {
            out.push_str(&format!(
                "    <tr class=\"no-results\"><td colspan=\"{}\">{}</td></tr>\n",
                COLUMNS.len(),
                escape_html(NO_RESULTS_MESSAGE)
            ));
        }
    }

    out.push_str("  </tbody>\n</table>\n");
    out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
