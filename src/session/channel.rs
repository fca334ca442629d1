//! Channel plumbing
//!
//! A channel instance is opened by a `Connector` and reports back through
//! `ChannelEvent`s on a `std::sync::mpsc` channel, which the UI thread
//! drains between frames. Outbound traffic goes the other way through the
//! `ChannelHandle`.
//!
//! Every instance carries its own `ChannelId`. Ids are never reused within
//! one session, so events from a replaced instance can be recognised and
//! dropped.

use std::fmt;
use std::sync::mpsc;

use url::Url;

use crate::session::role::Role;
use crate::session::{ChannelError, Result};

/// Query parameter carrying the role on the open request
pub const ROLE_PARAM: &str = "role";

/// Channel sender for channel events
pub type ChannelSender = mpsc::Sender<ChannelEvent>;
/// Channel receiver for channel events
pub type ChannelReceiver = mpsc::Receiver<ChannelEvent>;

/// Receiving half of a handle's outbound queue (owned by the I/O task)
pub type OutboundReceiver = tokio::sync::mpsc::UnboundedReceiver<Outbound>;

/// Channel instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(pub u64);

impl ChannelId {
    pub fn next(self) -> ChannelId {
        ChannelId(self.0 + 1)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Event sent from a channel instance to the UI thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Handshake completed
    Opened { channel: ChannelId },
    /// One inbound text frame, undecoded
    Message { channel: ChannelId, raw: String },
    /// Channel closed (by either side, or after a failed open)
    Closed {
        channel: ChannelId,
        reason: Option<String>,
    },
    /// Transport error; a `Closed` may or may not follow
    Error {
        channel: ChannelId,
        description: String,
    },
}

impl ChannelEvent {
    /// Get the channel instance this event belongs to
    pub fn channel(&self) -> ChannelId {
        match self {
            ChannelEvent::Opened { channel } => *channel,
            ChannelEvent::Message { channel, .. } => *channel,
            ChannelEvent::Closed { channel, .. } => *channel,
            ChannelEvent::Error { channel, .. } => *channel,
        }
    }

    /// Check if this is a terminal event (no further events from the instance)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChannelEvent::Closed { .. })
    }
}

/// Frame queued for the I/O task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close,
}

/// Parameters of one open attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub channel: ChannelId,
    pub role: Role,
    /// Endpoint with the role query parameter applied
    pub url: Url,
}

impl OpenRequest {
    /// Build the open request for `endpoint`, replacing any role parameter
    /// already present in it
    pub fn new(channel: ChannelId, endpoint: &str, role: Role) -> Result<OpenRequest> {
        let mut url = Url::parse(endpoint).map_err(|e| ChannelError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ChannelError::UnsupportedScheme(url.scheme().to_string()));
        }

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != ROLE_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(ROLE_PARAM, role.as_str());

        Ok(OpenRequest { channel, role, url })
    }

    /// Role carried by the URL (what the remote side will observe)
    pub fn role_param(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == ROLE_PARAM)
            .map(|(_, v)| v.into_owned())
    }
}

/// Sending side of an open channel instance
#[derive(Debug)]
pub struct ChannelHandle {
    id: ChannelId,
    outbound: tokio::sync::mpsc::UnboundedSender<Outbound>,
}

impl ChannelHandle {
    /// Create a handle plus the outbound queue its I/O task drains
    pub fn pair(id: ChannelId) -> (ChannelHandle, OutboundReceiver) {
        let (outbound, rx) = tokio::sync::mpsc::unbounded_channel();
        (ChannelHandle { id, outbound }, rx)
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Queue one raw text frame
    pub fn send_text(&self, text: &str) -> Result<()> {
        self.outbound
            .send(Outbound::Text(text.to_string()))
            .map_err(|_| ChannelError::Gone(self.id))
    }

    /// Ask the I/O task to close the socket. Consumes the handle; dropping
    /// the queue also ends the task if the close frame cannot be queued.
    pub fn close(self) {
        let _ = self.outbound.send(Outbound::Close);
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

/// Opens channel instances
///
/// `open` must not block: the outcome is reported later through `events`
/// as `Opened`, or `Error`/`Closed`. An `Err` return means the attempt was
/// rejected before any I/O started.
pub trait Connector {
    fn open(&mut self, request: OpenRequest, events: ChannelSender) -> Result<ChannelHandle>;
}

impl<C: Connector + ?Sized> Connector for Box<C> {
    fn open(&mut self, request: OpenRequest, events: ChannelSender) -> Result<ChannelHandle> {
        (**self).open(request, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_request_appends_role() {
        let req = OpenRequest::new(ChannelId(1), "ws://localhost:8000/ws/chatops", Role::Manager)
            .unwrap();
        assert_eq!(req.url.as_str(), "ws://localhost:8000/ws/chatops?role=manager");
        assert_eq!(req.role_param().as_deref(), Some("manager"));
    }

    #[test]
    fn test_open_request_replaces_existing_role() {
        let req = OpenRequest::new(
            ChannelId(2),
            "wss://gw.example.com/ws/chatops?token=abc&role=client",
            Role::Manager,
        )
        .unwrap();
        assert_eq!(req.role_param().as_deref(), Some("manager"));
        assert_eq!(req.url.query_pairs().filter(|(k, _)| k == "role").count(), 1);
        assert!(req.url.query_pairs().any(|(k, v)| k == "token" && v == "abc"));
    }

    #[test]
    fn test_open_request_rejects_bad_endpoints() {
        assert!(matches!(
            OpenRequest::new(ChannelId(1), "not a url", Role::Client),
            Err(ChannelError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            OpenRequest::new(ChannelId(1), "http://localhost:8000/ws", Role::Client),
            Err(ChannelError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_handle_queues_frames() {
        let (handle, mut rx) = ChannelHandle::pair(ChannelId(7));
        handle.send_text("status").unwrap();
        handle.close();
        assert_eq!(rx.try_recv().unwrap(), Outbound::Text("status".to_string()));
        assert_eq!(rx.try_recv().unwrap(), Outbound::Close);
    }

    #[test]
    fn test_send_after_task_gone_fails() {
        let (handle, rx) = ChannelHandle::pair(ChannelId(3));
        drop(rx);
        assert!(handle.is_closed());
        assert!(matches!(
            handle.send_text("x"),
            Err(ChannelError::Gone(ChannelId(3)))
        ));
    }

    #[test]
    fn test_event_channel_and_terminal() {
        let id = ChannelId(4);
        assert_eq!(ChannelEvent::Opened { channel: id }.channel(), id);
        assert!(ChannelEvent::Closed {
            channel: id,
            reason: None
        }
        .is_terminal());
        assert!(!ChannelEvent::Error {
            channel: id,
            description: "boom".to_string()
        }
        .is_terminal());
    }
}
