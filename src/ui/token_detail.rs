//! Token detail screen UI
//!
//! Renders the detailed view for a single token: catalog fields, platform
//! addresses, and the latest market snapshot when one is available.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, StatusMessage};
use crate::catalog::TokenRepository;

/// Section header color
const HEADER: Color = Color::Cyan;
/// Secondary/dimmed text color
const SECONDARY: Color = Color::Gray;

/// Renders the token detail screen
///
/// # Arguments
/// * `frame` - The ratatui frame to render into
/// * `app` - The application state
/// * `token_id` - The id of the token to display
pub fn render(frame: &mut Frame, app: &App, token_id: u64) {
    let area = frame.area();

    let Some(token) = app.catalog.get(token_id) else {
        render_no_data(frame, area);
        return;
    };

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(HEADER))
        .title(Span::styled(
            format!(" {} ({}) ", token.name, token.symbol),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Content
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Key hints
        ])
        .split(inner_area);

    let mut lines = vec![
        field_line("Symbol", &token.symbol),
        field_line("Name", &token.name),
        field_line("Logo", token.logo_url.as_deref().unwrap_or("—")),
        field_line(
            "Last updated",
            &token.last_updated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Platforms",
            Style::default().fg(HEADER).add_modifier(Modifier::BOLD),
        )),
    ];

    if token.platforms.is_empty() {
        lines.push(Line::from(Span::styled(
            "  native chain (no contract addresses)",
            Style::default().fg(SECONDARY),
        )));
    } else {
        for platform in &token.platforms {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", platform.platform),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(platform.address.clone(), Style::default().fg(SECONDARY)),
            ]));
        }
    }

    if let Some(snapshot) = app.snapshot_for(token) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Market ({})", app.vs_currency),
            Style::default().fg(HEADER).add_modifier(Modifier::BOLD),
        )));
        if let Some(price) = snapshot.current_price {
            lines.push(field_line("  Price", &format!("{price}")));
        }
        if let Some(cap) = snapshot.market_cap {
            lines.push(field_line("  Market cap", &format!("{cap:.0}")));
        }
        if let Some(updated) = snapshot.last_updated {
            lines.push(field_line(
                "  As of",
                &updated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ));
        }
    }

    let content = Paragraph::new(lines);
    frame.render_widget(content, chunks[0]);

    render_status(frame, app, chunks[1]);

    let hints = Paragraph::new(Line::from(Span::styled(
        "e edit · d delete · Esc back · q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(hints, chunks[2]);
}

/// A label/value line
fn field_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<14}", label),
            Style::default().fg(SECONDARY),
        ),
        Span::raw(value.to_string()),
    ])
}

/// The transient status line (delete confirmations, update results)
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    if app.confirm_delete.is_some() {
        let prompt = Paragraph::new(Line::from(Span::styled(
            "Delete this token? Press y to confirm, any other key to cancel",
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

/// Fallback view when the token no longer exists
fn render_no_data(frame: &mut Frame, area: Rect) {
    let message = Paragraph::new("Token not found")
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(message, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PlatformAddress, TokenDraft, TokenRepository};
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App, token_id: u64) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, app, token_id))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_detail_renders_fields_and_platforms() {
        let mut app = App::offline();
        let id = app
            .catalog
            .insert(TokenDraft {
                symbol: "zcn".to_string(),
                name: "Zus".to_string(),
                logo_url: None,
                platforms: vec![PlatformAddress {
                    platform: "ethereum".to_string(),
                    address: "0xb9ef770b6a5e12e45983c5d80545258aa38f3b78".to_string(),
                }],
            })
            .unwrap();

        let content = render_to_string(&app, id);
        assert!(content.contains("Zus (zcn)"));
        assert!(content.contains("ethereum"));
        assert!(content.contains("0xb9ef770b"));
    }

    #[test]
    fn test_detail_for_missing_token_shows_not_found() {
        let app = App::offline();
        let content = render_to_string(&app, 42);
        assert!(content.contains("Token not found"));
    }

    #[test]
    fn test_detail_shows_delete_prompt_when_confirming() {
        let mut app = App::offline();
        let id = app
            .catalog
            .insert(TokenDraft {
                symbol: "btc".to_string(),
                name: "Bitcoin".to_string(),
                logo_url: None,
                platforms: Vec::new(),
            })
            .unwrap();
        app.confirm_delete = Some(id);

        let content = render_to_string(&app, id);
        assert!(content.contains("Press y to confirm"));
    }
}
