//! Add/edit token form UI
//!
//! Renders the token form with one input line per field; the focused field
//! shows a cursor marker. Submission errors appear in the status line below
//! the fields.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppState, FormField, FormMode, StatusMessage};

/// Renders the token form screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let title = match app.state {
        AppState::TokenForm(FormMode::Edit(_)) => " Edit Token ",
        _ => " Add Token ",
    };

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(7),    // Fields
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Key hints
        ])
        .split(inner_area);

    let form = &app.form;
    let lines = vec![
        field_line("Symbol", &form.symbol, form.focus == FormField::Symbol),
        field_line("Name", &form.name, form.focus == FormField::Name),
        field_line("Logo URL", &form.logo_url, form.focus == FormField::LogoUrl),
        Line::from(""),
        field_line(
            "Platform",
            &form.platform_name,
            form.focus == FormField::PlatformName,
        ),
        field_line(
            "Address",
            &form.platform_address,
            form.focus == FormField::PlatformAddress,
        ),
    ];

    frame.render_widget(Paragraph::new(lines), chunks[0]);

    render_status(frame, app, chunks[1]);

    let hints = Paragraph::new(Line::from(Span::styled(
        "Tab next field · Enter save · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(hints, chunks[2]);
}

/// One labeled input line; the focused field gets a cursor marker
fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![
        Span::styled(format!("{:<12}", label), label_style),
        Span::raw(value.to_string()),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

/// Submission errors and other transient messages
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
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
