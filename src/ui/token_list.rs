//! Token list screen rendering
//!
//! Renders the main catalog view: a windowed, scrollable list of tokens
//! with symbol, name, platform count, and the latest market price when
//! market data has been synced.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, StatusMessage};
use crate::catalog::{Token, TokenRepository};

/// Formats a market price for display
///
/// Sub-unit prices keep more precision so small-cap tokens do not render
/// as 0.00.
fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.6}", price)
    }
}

/// Builds one list row for a token
fn token_line(app: &App, token: &Token, selected: bool) -> Line<'static> {
    let marker = if selected { "▶ " } else { "  " };
    let price = app
        .snapshot_for(token)
        .and_then(|snapshot| snapshot.current_price)
        .map(|price| format!("{} {}", format_price(price), app.vs_currency))
        .unwrap_or_else(|| "—".to_string());

    let platform_count = match token.platforms.len() {
        0 => String::new(),
        1 => "1 platform".to_string(),
        n => format!("{n} platforms"),
    };

    let row_style = if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(marker.to_string(), row_style),
        Span::styled(
            format!("{:<10}", truncate(&token.symbol, 10)),
            if selected {
                row_style
            } else {
                Style::default().fg(Color::Yellow)
            },
        ),
        Span::styled(format!("{:<30}", truncate(&token.name, 30)), row_style),
        Span::styled(format!("{:<14}", platform_count), row_style),
        Span::styled(price, row_style),
    ])
}

/// Truncates a string to `max` characters with an ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

/// Renders the token list screen
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(3),    // Token list
            Constraint::Length(1), // Search / filter line
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_search(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);
    render_hints(frame, chunks[4]);
}

/// Header with title, token count, and sync info
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.catalog.len();
    let visible = app.visible_tokens().len();
    let counts = if app.search_query.is_empty() {
        format!("{total} tokens")
    } else {
        format!("{visible} of {total} tokens")
    };
    let sync = match &app.last_sync {
        Some(at) => format!("synced {}", at.format("%H:%M:%S")),
        None => "not synced".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Qrypt Token Catalog",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(counts, Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(
            format!("({}, {sync})", app.vs_currency),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

/// The windowed token list itself
fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Tokens ");
    let inner_height = block.inner(area).height as usize;

    let tokens = app.visible_tokens();
    if tokens.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            if app.search_query.is_empty() {
                "No tokens in the catalog. Press 's' to sync with CoinGecko or 'a' to add one."
            } else {
                "No tokens match the filter."
            },
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Keep the selection inside the visible window
    let selected = app.selected_index.min(tokens.len() - 1);
    let mut offset = app.list_offset.min(tokens.len() - 1);
    if selected < offset {
        offset = selected;
    } else if inner_height > 0 && selected >= offset + inner_height {
        offset = selected + 1 - inner_height;
    }

    let lines: Vec<Line<'static>> = tokens
        .iter()
        .enumerate()
        .skip(offset)
        .take(inner_height.max(1))
        .map(|(index, token)| token_line(app, token, index == selected))
        .collect();

    app.list_offset = offset;

    let list = Paragraph::new(lines).block(block);
    frame.render_widget(list, area);
}

/// The incremental search line
fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    if !app.search_active && app.search_query.is_empty() {
        return;
    }

    let cursor = if app.search_active { "▏" } else { "" };
    let search = Paragraph::new(Line::from(vec![
        Span::styled("Filter: /", Style::default().fg(Color::Cyan)),
        Span::raw(app.search_query.clone()),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]));
    frame.render_widget(search, area);
}

/// The transient status line
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    if app.confirm_delete.is_some() {
        let prompt = Paragraph::new(Line::from(Span::styled(
            "Delete the selected token? Press y to confirm, any other key to cancel",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(prompt, area);
        return;
    }

    let Some(status) = &app.status else {
        return;
    };

    let (text, color) = match status {
        StatusMessage::Info(text) => (text, Color::Green),
        StatusMessage::Error(text) => (text, Color::Red),
    };
    let line = Paragraph::new(Line::from(Span::styled(
        text.clone(),
        Style::default().fg(color),
    )));
    frame.render_widget(line, area);
}

/// Fixed key hints at the bottom
fn render_hints(frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new(Line::from(Span::styled(
        "↑↓ select · Enter details · a add · e edit · d delete · / filter · s sync · ? help · q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(hints, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{TokenDraft, TokenRepository};
    use ratatui::{backend::TestBackend, Terminal};

    fn seeded_app() -> App {
        let mut app = App::offline();
        for (symbol, name) in [("btc", "Bitcoin"), ("eth", "Ethereum")] {
            app.catalog
                .insert(TokenDraft {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    logo_url: None,
                    platforms: Vec::new(),
                })
                .expect("Seed insert should succeed");
        }
        app
    }

    fn render_to_string(app: &mut App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_list_renders_tokens_and_title() {
        let mut app = seeded_app();
        let content = render_to_string(&mut app);

        assert!(content.contains("Qrypt Token Catalog"));
        assert!(content.contains("btc"));
        assert!(content.contains("Ethereum"));
        assert!(content.contains("2 tokens"));
    }

    #[test]
    fn test_empty_catalog_shows_sync_hint() {
        let mut app = App::offline();
        let content = render_to_string(&mut app);
        assert!(content.contains("Press 's' to sync"));
    }

    #[test]
    fn test_filter_line_is_shown_while_searching() {
        let mut app = seeded_app();
        app.search_active = true;
        app.search_query = "bit".to_string();

        let content = render_to_string(&mut app);
        assert!(content.contains("Filter: /bit"));
        assert!(content.contains("1 of 2 tokens"));
    }

    #[test]
    fn test_format_price_keeps_precision_for_small_values() {
        assert_eq!(format_price(69420.5), "69420.50");
        assert_eq!(format_price(0.000123), "0.000123");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate("Bitcoin", 30), "Bitcoin");
        assert_eq!(truncate("Extremely Long Token Name", 10), "Extremely…");
    }
}
