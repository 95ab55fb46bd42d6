//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use super::state::App;
use super::types::Focus;
use crate::render::{NO_RESULTS_MESSAGE, TableView, header_labels};

const COLUMN_WIDTHS: [Constraint; 8] = [
    Constraint::Length(8),
    Constraint::Min(20),
    Constraint::Length(8),
    Constraint::Length(9),
    Constraint::Length(16),
    Constraint::Length(8),
    Constraint::Length(18),
    Constraint::Length(18),
];

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Filter bar
            Constraint::Min(0),    // Episode table
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);
    draw_filter_bar(frame, app, chunks[1]);

    if app.state.episodes().is_empty() && app.state.is_loading() {
        draw_loading(frame, app, chunks[2]);
    } else if app.state.episodes().is_empty() && app.state.error_message().is_some() {
        draw_unavailable(frame, chunks[2]);
    } else {
        draw_table(frame, app, chunks[2]);
    }

    draw_footer(frame, app, chunks[3]);

    if let Some(error) = app.state.error_message() {
        draw_error_popup(frame, error);
    }

    if app.show_help {
        draw_help_modal(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let sort = app.state.sort();
    let mut spans = vec![
        Span::styled(
            "episode-explorer",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                "[{}/{}]",
                app.state.filtered().len(),
                app.state.episodes().len()
            ),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{} {}]", sort.field.label(), sort.indicator()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    if app.state.is_loading() {
        spans.push(Span::styled(
            "  [loading]",
            Style::default().fg(Color::Yellow),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(app.source.as_str())
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(header, area);
}

fn draw_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::FilterBar;
    let border_style = if app.filter_error.is_some() {
        Style::default().fg(Color::Red)
    } else if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = match &app.filter_error {
        Some(err) => format!("Filter - {}", err),
        None => "Filter".to_string(),
    };

    let text = if app.filter_input.is_empty() && !focused {
        "Press '/' to filter (e.g. dalek series:1-4 year:2005- rating:8-)"
    } else {
        app.filter_input.as_str()
    };

    let filter = Paragraph::new(text)
        .style(if focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        );

    frame.render_widget(filter, area);

    if focused {
        frame.set_cursor_position((
            area.x + app.filter_input.chars().count() as u16 + 1,
            area.y + 1,
        ));
    }
}

fn draw_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = match app.selected_episode() {
        Some(episode) => format!("Episodes - {}", episode.to_display()),
        None => "Episodes".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(if app.focus == Focus::Table {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let rows = match TableView::from_episodes(app.state.filtered()) {
        TableView::Rows(rows) => rows,
        TableView::NoResults => {
            let empty = Paragraph::new(NO_RESULTS_MESSAGE)
                .style(Style::default().fg(Color::DarkGray))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(empty, area);
            return;
        }
    };

    let header = Row::new(
        header_labels(&app.state.sort())
            .into_iter()
            .map(Cell::from)
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD))
    .bottom_margin(1);

    let rows: Vec<Row> = rows
        .into_iter()
        .map(|row| Row::new(row.cells.into_iter().map(Cell::from).collect::<Vec<_>>()))
        .collect();

    let table = Table::new(rows, COLUMN_WIDTHS)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect) {
    let loading = Paragraph::new(format!("Loading episodes from {}...", app.source))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Loading"))
        .wrap(Wrap { trim: true });

    frame.render_widget(loading, area);
}

fn draw_unavailable(frame: &mut Frame, area: Rect) {
    let empty = Block::default()
        .borders(Borders::ALL)
        .title("Episodes")
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(empty, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.focus {
        Focus::FilterBar => "[Enter] apply  [Esc] cancel  [Bksp] delete",
        Focus::Table => {
            "[/] filter  [1-6] sort  [d] direction  [c] clear  [r] reload  [↑↓] navigate  [?] help  [q] quit"
        }
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(format!("{}\n\nPress 'r' to reload.", error))
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let content = "\
Table
─────
  j / ↓       Move down
  k / ↑       Move up
  g / G       First / last row
  1-6         Sort by column (again to reverse)
  d           Reverse sort direction
  r           Reload episodes
  q           Quit

Filter
──────
  /           Edit filter
  Enter       Apply filter
  Esc         Discard edits
  c           Clear filter

Filter syntax
─────────────
  words       Title contains the words
  series:1-4  Series range (also 3, 2-, -5)
  year:2005-  Broadcast year range
  rating:8-   Rating range
  era:modern  Era equals
  any:dalek   Any field contains

Press ? to close";

    let help_text = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::types::Episode;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(app: &mut App) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_draws_loading_panel() {
        let mut app = App::new(AppState::default(), "http://localhost/episodes".to_string());
        app.state.begin_load();
        assert!(screen_text(&mut app).contains("Loading episodes"));
    }

    #[test]
    fn test_draws_rows() {
        let mut app = App::new(AppState::default(), "src".to_string());
        let token = app.state.begin_load();
        app.finish_load(token, Ok(vec![Episode::new(1, "Rose"), Episode::new(2, "Dalek")]));

        let text = screen_text(&mut app);
        assert!(text.contains("Rose"));
        assert!(text.contains("Dalek"));
        assert!(!text.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_draws_no_results() {
        let mut app = App::new(AppState::default(), "src".to_string());
        let token = app.state.begin_load();
        app.finish_load(token, Ok(Vec::new()));
        assert!(screen_text(&mut app).contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_draws_error_popup() {
        let mut app = App::new(AppState::default(), "src".to_string());
        let token = app.state.begin_load();
        app.finish_load(
            token,
            Err(crate::error::LoadError::Parse("not json".to_string())),
        );
        let text = screen_text(&mut app);
        assert!(text.contains("Failed to load episodes."));
        assert!(!text.contains("not json"));
        assert!(!text.contains("Loading episodes"));
        assert!(!text.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_failed_reload_keeps_table() {
        let mut app = App::new(AppState::default(), "src".to_string());
        let token = app.state.begin_load();
        app.finish_load(token, Ok(vec![Episode::new(1, "Rose")]));
        let token = app.state.begin_load();
        app.finish_load(token, Err(crate::error::LoadError::Status(500)));

        let text = screen_text(&mut app);
        assert!(text.contains("Rose"));
        assert!(text.contains("Failed to load episodes."));
    }

    #[test]
    fn test_table_title_shows_selected_episode() {
        let mut app = App::new(AppState::default(), "src".to_string());
        let mut blink = Episode::new(3, "Blink");
        blink.series = Some(3);
        let token = app.state.begin_load();
        app.finish_load(token, Ok(vec![blink, Episode::new(4, "Midnight")]));

        assert!(screen_text(&mut app).contains("Episodes - #3 Blink (series 3)"));
    }
}
