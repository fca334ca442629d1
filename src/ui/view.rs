//! Panel rendering
//!
//! Layout:
//! - Status bar (top, 1 line): connection state, role, identity
//! - Transcript (left, 70%) or help overlay
//! - Activity log (right, 30%)
//! - Input bar (bottom, 3 lines)

use std::time::Instant;

use ratatui::style::Stylize;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::session::{Category, ConnectionState, DisplayLabel, TranscriptEntry};
use crate::ui::input::render_help;
use crate::ui::state::{App, AppState};

/// Render the main UI
pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> std::io::Result<()> {
    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(f.area());

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[1]);

        render_status_bar(f, app, chunks[0]);
        if app.state() == AppState::Help {
            render_help_panel(f, app, main_chunks[0]);
        } else {
            render_transcript(f, app, main_chunks[0]);
        }
        render_activity_panel(f, app, main_chunks[1]);
        render_input_bar(f, app, chunks[2]);
    })?;
    Ok(())
}

fn category_color(category: Category) -> Color {
    match category {
        Category::System => Color::Gray,
        Category::CommandSent => Color::Cyan,
        Category::CommandReceived => Color::LightBlue,
        Category::CommandResponse => Color::White,
        Category::SystemBroadcast => Color::Yellow,
        Category::Error => Color::Red,
    }
}

fn label_color(label: &DisplayLabel) -> Color {
    match label {
        DisplayLabel::System => Color::DarkGray,
        DisplayLabel::You => Color::Blue,
        DisplayLabel::Peer(_) => Color::Green,
    }
}

/// Lines for one transcript entry. The label is resolved here, at render
/// time, against the identity the session holds now.
pub fn entry_lines(entry: &TranscriptEntry, label: &DisplayLabel) -> Vec<Line<'static>> {
    let body_style = Style::default().fg(category_color(entry.category));
    let mut body = entry.body_lines();

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[{}] ", entry.created_at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{}: ", label), Style::default().fg(label_color(label)).bold()),
        Span::styled(body.next().unwrap_or("").to_string(), body_style),
    ])];

    for continuation in body {
        lines.push(Line::from(Span::styled(format!("    {}", continuation), body_style)));
    }
    lines
}

/// All transcript lines, oldest first
pub fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let session = &app.session;
    session
        .transcript()
        .entries()
        .iter()
        .flat_map(|entry| entry_lines(entry, &session.display_label(&entry.origin_id)))
        .collect()
}

/// Start index for a window of `visible` lines, `offset` lines up from the bottom
fn scroll_start(total: usize, visible: usize, offset: usize) -> usize {
    if total > visible {
        let base = total - visible;
        base.saturating_sub(offset.min(base))
    } else {
        0
    }
}

fn render_transcript(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = transcript_lines(app);

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Select a role and type /connect to start ChatOps.",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "Type /help for commands",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let visible_lines = (area.height as usize).saturating_sub(2);
    let start = scroll_start(lines.len(), visible_lines, app.transcript_scroll_offset());
    let visible: Vec<_> = lines.into_iter().skip(start).collect();

    let title = if app.autoscroll_enabled() {
        " Transcript ".to_string()
    } else {
        format!(" Transcript (scrolled +{}) ", app.transcript_scroll_offset())
    };

    let paragraph = Paragraph::new(visible)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

fn render_help_panel(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = render_help(app.session.settings().reconnect_delay)
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect();
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help (Esc to close) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_activity_panel(f: &mut Frame, app: &App, area: Rect) {
    let entries = app.session.activity().entries();
    let visible_lines = (area.height as usize).saturating_sub(2);
    let start = entries.len().saturating_sub(visible_lines);

    let lines: Vec<Line> = entries[start..]
        .iter()
        .map(|e| Line::from(Span::styled(e.formatted(), Style::default().fg(Color::Gray))))
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title(" Activity ").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Status bar text
pub fn status_text(app: &App, now: Instant) -> String {
    let session = &app.session;
    let marker = match session.state() {
        ConnectionState::Connected => "●",
        ConnectionState::Connecting => "◐",
        ConnectionState::Disconnected => "○",
    };
    let mut text = format!(
        " {} {} | Role: {}",
        marker,
        session.state().label(),
        session.active_role().display_name()
    );
    if let Some(id) = session.identity() {
        text.push_str(&format!(" | You: {}", id));
    }
    if let Some(pending) = session.pending_reconnect() {
        text.push_str(&format!(
            " | Reconnecting as {} in {:.1}s",
            pending.role(),
            pending.remaining(now).as_secs_f32()
        ));
    }
    text
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let color = match app.session.state() {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Disconnected => Color::Red,
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        status_text(app, Instant::now()),
        Style::default().fg(Color::Black).bg(color),
    )));
    f.render_widget(paragraph, area);
}

fn render_input_bar(f: &mut Frame, app: &App, area: Rect) {
    let line = if app.input_buffer.is_empty() {
        Line::from(Span::styled(
            app.session.placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(app.input_buffer.clone()),
        ])
    };

    let border_style = if app.session.input_enabled() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title(" Command ")
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FakeConnector, Role, SessionSettings};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_entry_lines_split_breaks() {
        let entry = TranscriptEntry::new(
            Category::CommandResponse,
            "=== NETWORK STATUS ===\nUSER: RUNNING",
            "system",
        );
        let lines = entry_lines(&entry, &DisplayLabel::System);
        assert_eq!(lines.len(), 2);
        assert!(line_text(&lines[0]).ends_with("System: === NETWORK STATUS ==="));
        assert_eq!(line_text(&lines[1]), "    USER: RUNNING");
    }

    #[test]
    fn test_labels_follow_identity_changes() {
        let (connector, channels) = FakeConnector::new();
        let mut app = App::new(Box::new(connector), SessionSettings::default(), Role::Client);
        app.session.connect(Role::Client);
        let id = channels.latest().unwrap();
        channels.emit_open(id);
        app.session.pump_events();
        app.session
            .on_message(r#"{"type":"command_sent","message":"status","user_id":"user_1"}"#);

        let text: Vec<String> = transcript_lines(&app).iter().map(line_text).collect();
        assert!(text.last().unwrap().contains("You: status"));

        // After the channel closes the same entry renders as a peer
        channels.emit_closed(id);
        app.session.pump_events();
        let text: Vec<String> = transcript_lines(&app).iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.contains("user_1: status")));
    }

    #[test]
    fn test_scroll_start() {
        assert_eq!(scroll_start(5, 10, 0), 0);
        assert_eq!(scroll_start(20, 10, 0), 10);
        assert_eq!(scroll_start(20, 10, 3), 7);
        assert_eq!(scroll_start(20, 10, 50), 0);
    }

    #[test]
    fn test_status_text() {
        let (connector, _) = FakeConnector::new();
        let app = App::new(Box::new(connector), SessionSettings::default(), Role::Manager);
        let text = status_text(&app, Instant::now());
        assert!(text.contains("Disconnected"));
        assert!(text.contains("Role: Manager"));
    }
}
