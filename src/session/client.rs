//! Command session
//!
//! Owns at most one live channel and turns UI intents into channel
//! operations and channel events into transcript entries.
//!
//! The session is driven from the UI loop:
//! - intents: `connect`, `disconnect`, `on_role_changed`, `send`
//! - `pump_events` drains channel events delivered since the last frame
//! - `tick` fires the scheduled reconnect once due
//!
//! Events whose `ChannelId` is not the active instance are dropped, so a
//! replaced channel can never touch the current state.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::session::activity::{self, preview, ActivityLog};
use crate::session::channel::{
    ChannelEvent, ChannelHandle, ChannelId, ChannelReceiver, ChannelSender, Connector, OpenRequest,
};
use crate::session::envelope::{Envelope, MessageTag, SYSTEM_ORIGIN};
use crate::session::reconnect::{ScheduledReconnect, DEFAULT_RECONNECT_DELAY};
use crate::session::role::Role;
use crate::session::transcript::{self, Category, DisplayLabel, Transcript, TranscriptEntry};

/// Default gateway command endpoint
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws/chatops";

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
        }
    }
}

/// Session tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub endpoint: String,
    pub reconnect_delay: Duration,
    pub max_transcript_entries: usize,
    pub max_activity_entries: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_transcript_entries: transcript::DEFAULT_MAX_ENTRIES,
            max_activity_entries: activity::DEFAULT_MAX_ENTRIES,
        }
    }
}

/// The channel instance currently owned by the session
#[derive(Debug)]
struct ActiveChannel {
    handle: ChannelHandle,
    /// Role the instance was opened with
    role: Role,
}

/// Live command session
pub struct CommandSession<C: Connector> {
    connector: C,
    settings: SessionSettings,
    /// Role for the next open
    role: Role,
    identity: Option<String>,
    state: ConnectionState,
    channel: Option<ActiveChannel>,
    /// Id handed to the next channel instance
    next_channel: ChannelId,
    pending_reconnect: Option<ScheduledReconnect>,
    events_tx: ChannelSender,
    events_rx: ChannelReceiver,
    transcript: Transcript,
    activity: ActivityLog,
}

impl<C: Connector> CommandSession<C> {
    pub fn new(connector: C, settings: SessionSettings, role: Role) -> Self {
        let (events_tx, events_rx) = std::sync::mpsc::channel();
        let transcript = Transcript::with_capacity(settings.max_transcript_entries);
        let activity = ActivityLog::with_capacity(settings.max_activity_entries);
        Self {
            connector,
            settings,
            role,
            identity: None,
            state: ConnectionState::Disconnected,
            channel: None,
            next_channel: ChannelId(1),
            pending_reconnect: None,
            events_tx,
            events_rx,
            transcript,
            activity,
        }
    }

    // Accessors

    /// Role used for the next open
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Role of the live channel, falling back to the selected role
    pub fn active_role(&self) -> &Role {
        self.channel.as_ref().map(|c| &c.role).unwrap_or(&self.role)
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn active_channel(&self) -> Option<ChannelId> {
        self.channel.as_ref().map(|c| c.handle.id())
    }

    pub fn pending_reconnect(&self) -> Option<&ScheduledReconnect> {
        self.pending_reconnect.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Mutable access for UI-originated activity lines
    pub fn activity_mut(&mut self) -> &mut ActivityLog {
        &mut self.activity
    }

    /// Sender for channel events (handed to connectors on open)
    pub fn event_sender(&self) -> ChannelSender {
        self.events_tx.clone()
    }

    /// Command input accepts text only while connected
    pub fn input_enabled(&self) -> bool {
        self.is_connected()
    }

    /// Placeholder shown in the empty input bar
    pub fn placeholder(&self) -> String {
        match self.state {
            ConnectionState::Connected => {
                format!("Type a command as {}...", self.active_role())
            }
            ConnectionState::Connecting => format!("Connecting as {}...", self.active_role()),
            ConnectionState::Disconnected => "Disconnected - type /connect".to_string(),
        }
    }

    /// Resolve an origin id to its label against the current identity
    pub fn display_label(&self, origin_id: &str) -> DisplayLabel {
        DisplayLabel::resolve(origin_id, self.identity())
    }

    // Intents

    /// Open a channel with `role`, closing any existing instance first
    pub fn connect(&mut self, role: Role) {
        self.pending_reconnect = None;
        if self.channel.is_some() {
            self.disconnect();
        }
        self.role = role.clone();

        let id = self.next_channel;
        self.next_channel = id.next();

        let request = match OpenRequest::new(id, &self.settings.endpoint, role.clone()) {
            Ok(request) => request,
            Err(e) => {
                warn!("channel open rejected: {e}");
                self.add_entry(Category::Error, format!("Failed to connect: {}", e), SYSTEM_ORIGIN);
                return;
            }
        };

        info!(channel = %id, %role, url = %request.url, "connecting");
        match self.connector.open(request, self.events_tx.clone()) {
            Ok(handle) => {
                self.channel = Some(ActiveChannel { handle, role: role.clone() });
                self.state = ConnectionState::Connecting;
                self.activity
                    .notify(format!("Connecting to {} as {}...", self.settings.endpoint, role));
            }
            Err(e) => {
                warn!(channel = %id, "channel open failed: {e}");
                self.state = ConnectionState::Disconnected;
                self.add_entry(Category::Error, format!("Failed to connect: {}", e), SYSTEM_ORIGIN);
            }
        }
    }

    /// Re-open with the currently selected role
    pub fn connect_current(&mut self) {
        let role = self.role.clone();
        self.connect(role);
    }

    /// Close the live channel, if any. Idempotent.
    pub fn disconnect(&mut self) {
        if self.pending_reconnect.take().is_some() {
            debug!("pending reconnect cancelled");
        }
        let Some(active) = self.channel.take() else {
            return;
        };

        let id = active.handle.id();
        active.handle.close();
        self.state = ConnectionState::Disconnected;
        self.identity = None;
        info!(channel = %id, "disconnected");
        self.add_entry(Category::System, "Disconnected.", SYSTEM_ORIGIN);
    }

    /// Record a new role; a live channel is closed and re-opened with it
    /// after the reconnect delay
    pub fn on_role_changed(&mut self, new_role: Role) {
        self.on_role_changed_at(new_role, Instant::now());
    }

    pub fn on_role_changed_at(&mut self, new_role: Role, now: Instant) {
        let reopen = self.is_connected() || self.pending_reconnect.is_some();
        self.role = new_role.clone();
        self.activity.notify(format!("Role changed to: {}", new_role));

        if reopen {
            self.disconnect();
            debug!(role = %new_role, delay = ?self.settings.reconnect_delay, "reconnect scheduled");
            self.pending_reconnect = Some(ScheduledReconnect::new(
                new_role,
                now,
                self.settings.reconnect_delay,
            ));
        }
    }

    /// Fire the scheduled reconnect if due. Returns true when it fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending_reconnect.take() {
            Some(pending) if pending.is_due(now) => {
                let role = pending.role().clone();
                self.connect(role);
                true
            }
            other => {
                self.pending_reconnect = other;
                false
            }
        }
    }

    /// Transmit one command as a raw text frame. Returns true if a frame
    /// was queued; the transcript entry arrives with the gateway's echo.
    pub fn send(&mut self, command_text: &str) -> bool {
        if !self.is_connected() {
            self.add_entry(
                Category::Error,
                "Not connected. Use /connect first.",
                SYSTEM_ORIGIN,
            );
            return false;
        }

        let command = command_text.trim();
        if command.is_empty() {
            return false;
        }

        let Some(active) = self.channel.as_ref() else {
            return false;
        };
        match active.handle.send_text(command) {
            Ok(()) => {
                debug!(channel = %active.handle.id(), %command, "command sent");
                true
            }
            Err(e) => {
                warn!("send failed: {e}");
                self.add_entry(Category::Error, format!("Send failed: {}", e), SYSTEM_ORIGIN);
                false
            }
        }
    }

    // Channel events

    /// Process all channel events delivered so far (non-blocking).
    /// Returns the number of events taken off the queue.
    pub fn pump_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            processed += 1;
        }
        processed
    }

    /// Dispatch one channel event; events from inactive instances are dropped
    pub fn handle_event(&mut self, event: ChannelEvent) {
        if self.active_channel() != Some(event.channel()) {
            debug!(channel = %event.channel(), ?event, "dropping event from inactive channel");
            return;
        }

        match event {
            ChannelEvent::Opened { .. } => self.on_channel_opened(),
            ChannelEvent::Message { raw, .. } => self.on_message(&raw),
            ChannelEvent::Closed { reason, .. } => self.on_channel_closed(reason.as_deref()),
            ChannelEvent::Error { description, .. } => self.on_channel_error(&description),
        }
    }

    pub fn on_channel_opened(&mut self) {
        let role = self.active_role().clone();
        self.state = ConnectionState::Connected;
        info!(%role, "channel open");
        self.add_entry(
            Category::System,
            format!("Connected to ChatOps as {}", role),
            SYSTEM_ORIGIN,
        );
        self.activity.notify(format!("Channel connected as {}", role));
    }

    /// Render one inbound payload. Undecodable payloads are dropped.
    pub fn on_message(&mut self, raw: &str) {
        let Some(envelope) = Envelope::decode(raw) else {
            debug!(%raw, "dropping undecodable payload");
            return;
        };

        let category = match envelope.message_tag() {
            MessageTag::System => Category::System,
            MessageTag::CommandSent => Category::CommandSent,
            MessageTag::CommandReceived => Category::CommandReceived,
            MessageTag::CommandResponse => Category::CommandResponse,
            MessageTag::SystemBroadcast => Category::SystemBroadcast,
            MessageTag::Error => Category::Error,
            MessageTag::ClearChat => {
                self.transcript.clear();
                self.add_entry(Category::System, "Transcript cleared.", SYSTEM_ORIGIN);
                return;
            }
            MessageTag::Unknown => {
                self.add_entry(
                    Category::System,
                    format!("Unknown message: {}", raw),
                    SYSTEM_ORIGIN,
                );
                return;
            }
        };

        let origin = envelope.origin().to_string();
        if category == Category::CommandSent {
            self.adopt_identity(&origin);
        }
        self.add_entry(category, envelope.body(), origin);
    }

    /// The gateway echoes a sender's own command back only to that sender,
    /// so the first non-system echo names this session.
    fn adopt_identity(&mut self, origin: &str) {
        if self.identity.is_none() && self.is_connected() && origin != SYSTEM_ORIGIN {
            info!(identity = %origin, "identity assigned");
            self.identity = Some(origin.to_string());
        }
    }

    pub fn on_channel_closed(&mut self, reason: Option<&str>) {
        self.channel = None;
        self.state = ConnectionState::Disconnected;
        self.identity = None;
        info!(?reason, "channel closed");
        let body = match reason {
            Some(reason) => format!("Connection closed ({}).", reason),
            None => "Connection closed.".to_string(),
        };
        self.add_entry(Category::System, body, SYSTEM_ORIGIN);
    }

    /// Report a transport error; the state change, if any, comes with the
    /// close event
    pub fn on_channel_error(&mut self, description: &str) {
        warn!(%description, "channel error");
        self.add_entry(
            Category::Error,
            format!(
                "Channel error: {}. Check if the server is running.",
                description.trim_end_matches('.')
            ),
            SYSTEM_ORIGIN,
        );
    }

    fn add_entry(&mut self, category: Category, body: impl Into<String>, origin: impl Into<String>) {
        let entry = TranscriptEntry::new(category, body, origin);
        if category.is_notable() {
            self.activity
                .notify(format!("ChatOps [{}]: {}", entry.origin_id, preview(&entry.body)));
        }
        self.transcript.append(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::channel_fake::{FakeChannels, FakeConnector};

    fn session() -> (CommandSession<FakeConnector>, FakeChannels) {
        let (connector, channels) = FakeConnector::new();
        (
            CommandSession::new(connector, SessionSettings::default(), Role::Client),
            channels,
        )
    }

    fn connected(role: Role) -> (CommandSession<FakeConnector>, FakeChannels, ChannelId) {
        let (mut s, channels) = session();
        s.connect(role);
        let id = s.active_channel().unwrap();
        channels.emit_open(id);
        s.pump_events();
        (s, channels, id)
    }

    #[test]
    fn test_initial_state() {
        let (s, _) = session();
        assert_eq!(s.state(), ConnectionState::Disconnected);
        assert!(s.identity().is_none());
        assert!(!s.input_enabled());
        assert!(s.transcript().is_empty());
        assert_eq!(s.placeholder(), "Disconnected - type /connect");
    }

    #[test]
    fn test_connect_moves_through_connecting() {
        let (mut s, channels) = session();
        s.connect(Role::Manager);
        assert_eq!(s.state(), ConnectionState::Connecting);
        assert_eq!(channels.open_count(), 1);
        assert_eq!(channels.requests()[0].role_param().as_deref(), Some("manager"));

        channels.emit_open(s.active_channel().unwrap());
        s.pump_events();
        assert_eq!(s.state(), ConnectionState::Connected);
        assert!(s.input_enabled());
        assert_eq!(s.placeholder(), "Type a command as manager...");
        let last = s.transcript().last().unwrap();
        assert_eq!(last.category, Category::System);
        assert_eq!(last.body, "Connected to ChatOps as manager");
    }

    #[test]
    fn test_invalid_endpoint_reports_error_entry() {
        let (connector, channels) = FakeConnector::new();
        let settings = SessionSettings {
            endpoint: "http://nope".to_string(),
            ..SessionSettings::default()
        };
        let mut s = CommandSession::new(connector, settings, Role::Client);
        s.connect(Role::Client);
        assert_eq!(s.state(), ConnectionState::Disconnected);
        assert_eq!(channels.open_count(), 0);
        assert_eq!(s.transcript().last().unwrap().category, Category::Error);
    }

    #[test]
    fn test_send_trims_and_transmits() {
        let (mut s, channels, id) = connected(Role::Client);
        let before = s.transcript().len();
        assert!(s.send("  status \n"));
        assert_eq!(channels.sent(id), vec!["status".to_string()]);
        // No local echo
        assert_eq!(s.transcript().len(), before);
    }

    #[test]
    fn test_send_while_connecting_is_rejected() {
        let (mut s, channels) = session();
        s.connect(Role::Client);
        assert!(!s.send("status"));
        assert!(channels.sent(s.active_channel().unwrap()).is_empty());
        let last = s.transcript().last().unwrap();
        assert_eq!(last.category, Category::Error);
        assert!(last.body.starts_with("Not connected"));
    }

    #[test]
    fn test_identity_adopted_from_first_echo() {
        let (mut s, _channels, _) = connected(Role::Client);
        s.on_message(r#"{"type":"command_received","message":"help","user_id":"user_other"}"#);
        assert!(s.identity().is_none());
        s.on_message(r#"{"type":"command_sent","message":"status","user_id":"user_ab12"}"#);
        assert_eq!(s.identity(), Some("user_ab12"));
        assert_eq!(s.display_label("user_ab12"), DisplayLabel::You);
        assert_eq!(
            s.display_label("user_other"),
            DisplayLabel::Peer("user_other".to_string())
        );
        // A later echo does not overwrite it
        s.on_message(r#"{"type":"command_sent","message":"x","user_id":"user_zz"}"#);
        assert_eq!(s.identity(), Some("user_ab12"));
    }

    #[test]
    fn test_error_event_keeps_state() {
        let (mut s, channels, id) = connected(Role::Client);
        channels.emit(ChannelEvent::Error {
            channel: id,
            description: "reset by peer".to_string(),
        });
        s.pump_events();
        assert_eq!(s.state(), ConnectionState::Connected);
        let last = s.transcript().last().unwrap();
        assert_eq!(last.category, Category::Error);
        assert!(last.body.contains("reset by peer"));
    }

    #[test]
    fn test_notable_entries_reach_activity_log() {
        let (mut s, _channels, _) = connected(Role::Client);
        let long = "x".repeat(80);
        s.on_message(&format!(
            r#"{{"type":"system_broadcast","message":"{}","user_id":"user_1"}}"#,
            long
        ));
        let line = &s.activity().last().unwrap().text;
        assert_eq!(line, &format!("ChatOps [user_1]: {}...", "x".repeat(50)));

        let count = s.activity().len();
        s.on_message(r#"{"type":"command_response","message":"ok","user_id":"system"}"#);
        assert_eq!(s.activity().len(), count);
    }

    #[test]
    fn test_tick_before_due_keeps_pending() {
        let (mut s, channels, _) = connected(Role::Client);
        let now = Instant::now();
        s.on_role_changed_at(Role::Manager, now);
        assert!(!s.tick(now + Duration::from_millis(10)));
        assert!(s.pending_reconnect().is_some());
        assert_eq!(channels.open_count(), 1);
        assert!(s.tick(now + Duration::from_secs(1)));
        assert_eq!(channels.open_count(), 2);
    }
}
