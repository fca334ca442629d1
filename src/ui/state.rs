//! Application state for the console UI
//!
//! State is split between:
//! - Transient UI state (input buffer, scroll, help overlay)
//! - The command session (channel, transcript, activity log)

use std::time::Instant;

use crate::session::{CommandSession, Connector, Role, SessionSettings};

/// Session type the console drives
pub type ConsoleSession = CommandSession<Box<dyn Connector>>;

/// Application state phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,  // Normal operation
    Help,     // Help overlay shown over the transcript
    Quitting, // Exit requested
}

/// Main application state
pub struct App {
    /// Live command session
    pub session: ConsoleSession,
    /// Current input buffer
    pub input_buffer: String,
    should_quit: bool,
    help_visible: bool,
    /// Transcript scroll offset (0 = bottom/latest, higher = further back)
    transcript_scroll_offset: usize,
    /// Whether autoscroll is enabled (true = follow latest)
    autoscroll_enabled: bool,
}

impl App {
    pub fn new(connector: Box<dyn Connector>, settings: SessionSettings, role: Role) -> Self {
        App {
            session: CommandSession::new(connector, settings, role),
            input_buffer: String::new(),
            should_quit: false,
            help_visible: false,
            transcript_scroll_offset: 0,
            autoscroll_enabled: true,
        }
    }

    /// Get current application state
    pub fn state(&self) -> AppState {
        if self.should_quit {
            AppState::Quitting
        } else if self.help_visible {
            AppState::Help
        } else {
            AppState::Running
        }
    }

    /// Add activity log line
    pub fn log(&mut self, message: impl Into<String>) {
        self.session.activity_mut().notify(message);
    }

    pub fn handle_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn handle_backspace(&mut self) {
        self.input_buffer.pop();
    }

    /// Take the input buffer, leaving it empty
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input_buffer)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn show_help(&mut self) {
        self.help_visible = true;
    }

    pub fn hide_help(&mut self) {
        self.help_visible = false;
    }

    /// One loop iteration of background work: drain channel events, then
    /// fire the scheduled reconnect if due
    pub fn tick(&mut self, now: Instant) {
        self.session.pump_events();
        self.session.tick(now);
    }

    // Transcript scrolling

    pub fn transcript_scroll_offset(&self) -> usize {
        self.transcript_scroll_offset
    }

    /// Check if autoscroll is enabled
    pub fn autoscroll_enabled(&self) -> bool {
        self.autoscroll_enabled
    }

    /// Scroll up by N lines (disables autoscroll)
    pub fn scroll_up(&mut self, lines: usize) {
        self.transcript_scroll_offset = self.transcript_scroll_offset.saturating_add(lines);
        self.autoscroll_enabled = false;
    }

    /// Scroll down by N lines (re-enables autoscroll at the bottom)
    pub fn scroll_down(&mut self, lines: usize) {
        self.transcript_scroll_offset = self.transcript_scroll_offset.saturating_sub(lines);
        if self.transcript_scroll_offset == 0 {
            self.autoscroll_enabled = true;
        }
    }

    /// Scroll to end (reset offset and re-enable autoscroll)
    pub fn scroll_to_end(&mut self) {
        self.transcript_scroll_offset = 0;
        self.autoscroll_enabled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FakeConnector;

    fn app() -> App {
        let (connector, _) = FakeConnector::new();
        App::new(Box::new(connector), SessionSettings::default(), Role::Client)
    }

    #[test]
    fn test_input_buffer_editing() {
        let mut app = app();
        for c in "statuz".chars() {
            app.handle_char(c);
        }
        app.handle_backspace();
        app.handle_char('s');
        assert_eq!(app.take_input(), "status");
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_scroll_toggles_autoscroll() {
        let mut app = app();
        assert!(app.autoscroll_enabled());
        app.scroll_up(3);
        assert_eq!(app.transcript_scroll_offset(), 3);
        assert!(!app.autoscroll_enabled());
        app.scroll_down(1);
        assert!(!app.autoscroll_enabled());
        app.scroll_down(5);
        assert_eq!(app.transcript_scroll_offset(), 0);
        assert!(app.autoscroll_enabled());
        app.scroll_up(10);
        app.scroll_to_end();
        assert!(app.autoscroll_enabled());
    }

    #[test]
    fn test_state_transitions() {
        let mut app = app();
        assert_eq!(app.state(), AppState::Running);
        app.show_help();
        assert_eq!(app.state(), AppState::Help);
        app.hide_help();
        app.quit();
        assert_eq!(app.state(), AppState::Quitting);
    }
}
