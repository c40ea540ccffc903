use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use agentchat_core::ChatRole;

use crate::app::{App, InputMode};

/// Render a line with `**bold**` runs styled; an unmatched `**` stays literal
fn parse_markdown_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    // An even number of parts means the last `**` was never closed
    let closed = parts.len() % 2 == 1;

    let mut spans = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let is_last = i + 1 == parts.len();
        if i % 2 == 1 && !(is_last && !closed) {
            if !part.is_empty() {
                spans.push(Span::styled(
                    part.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
        } else if i % 2 == 1 {
            spans.push(Span::raw(format!("**{}", part)));
        } else if !part.is_empty() {
            spans.push(Span::raw(part.to_string()));
        }
    }
    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let session = match app.session_id() {
        Some(id) => format!(" session {} ", id),
        None if app.query_loading => " streaming ".to_string(),
        None => " new conversation ".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" agentchat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(session, Style::default().fg(Color::White)),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let title = match &app.last_stats {
        Some(stats) if stats.malformed_frames > 0 || stats.discarded_partial_bytes > 0 => format!(
            " Chat ({} malformed frames, {} bytes dropped) ",
            stats.malformed_frames, stats.discarded_partial_bytes
        ),
        _ => " Chat ".to_string(),
    };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(title);

    let chat_text = if app.messages.is_empty() && !app.query_loading {
        Text::from(Span::styled(
            "Ask me anything...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.messages {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(msg.content.clone()));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
            }
            lines.push(Line::default());
        }

        // Thinking indicator until the first delta shows up
        let streaming = app.messages.last().is_some_and(|m| m.streaming);
        if app.query_loading && !streaming {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.query_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let (title, border_color) = if app.query_loading {
        (" Thinking... ", Color::DarkGray)
    } else if editing {
        (" Ask (Enter to send) ", Color::Yellow)
    } else {
        (" Ask (i to type) ", Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.query_cursor;
    let scroll_offset = if inner_width > 0 && cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .query_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let keys: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => &[
            ("i", "type"),
            ("j/k", "scroll"),
            ("g/G", "top/bottom"),
            ("^N", "new chat"),
            ("q", "quit"),
        ],
        InputMode::Editing => &[("Enter", "send"), ("Esc", "normal"), ("^N", "new chat"), ("^C", "quit")],
    };
    for (key, label) in keys {
        hints.push(Span::styled(format!(" {} ", key), key_style));
        hints.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
