//! Fake connector for testing
//!
//! Records every open request and keeps the outbound queue of each
//! instance, so tests can play the remote side: push events with
//! `FakeChannels::emit` and inspect what the session transmitted.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::session::channel::{
    ChannelEvent, ChannelHandle, ChannelId, ChannelSender, Connector, OpenRequest, Outbound,
    OutboundReceiver,
};
use crate::session::{ChannelError, Result};

/// One recorded open attempt
#[derive(Debug)]
pub struct FakeChannel {
    pub request: OpenRequest,
    events: ChannelSender,
    outbound: OutboundReceiver,
    sent: Vec<String>,
    closed_by_client: bool,
}

impl FakeChannel {
    /// Pull everything the session queued since the last call
    fn drain(&mut self) {
        while let Ok(frame) = self.outbound.try_recv() {
            match frame {
                Outbound::Text(text) => self.sent.push(text),
                Outbound::Close => self.closed_by_client = true,
            }
        }
        // Handle dropped without an explicit close frame
        if self.outbound.is_closed() && self.outbound.is_empty() {
            self.closed_by_client = true;
        }
    }
}

/// Shared view of everything the fake connector opened
#[derive(Debug, Clone, Default)]
pub struct FakeChannels {
    inner: Arc<Mutex<Vec<FakeChannel>>>,
}

impl FakeChannels {
    fn lock(&self) -> MutexGuard<'_, Vec<FakeChannel>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of open attempts so far
    pub fn open_count(&self) -> usize {
        self.lock().len()
    }

    /// Open requests in order
    pub fn requests(&self) -> Vec<OpenRequest> {
        self.lock().iter().map(|c| c.request.clone()).collect()
    }

    /// Id of the most recent instance
    pub fn latest(&self) -> Option<ChannelId> {
        self.lock().last().map(|c| c.request.channel)
    }

    /// Text frames transmitted on `channel`
    pub fn sent(&self, channel: ChannelId) -> Vec<String> {
        let mut guard = self.lock();
        guard
            .iter_mut()
            .find(|c| c.request.channel == channel)
            .map(|c| {
                c.drain();
                c.sent.clone()
            })
            .unwrap_or_default()
    }

    /// Whether the session closed (or dropped) `channel`
    pub fn closed_by_client(&self, channel: ChannelId) -> bool {
        let mut guard = self.lock();
        guard
            .iter_mut()
            .find(|c| c.request.channel == channel)
            .map(|c| {
                c.drain();
                c.closed_by_client
            })
            .unwrap_or(false)
    }

    /// Instances the session still holds open
    pub fn live_count(&self) -> usize {
        let mut guard = self.lock();
        guard
            .iter_mut()
            .map(|c| {
                c.drain();
                c.closed_by_client
            })
            .filter(|closed| !closed)
            .count()
    }

    /// Deliver an event as the remote side of `event.channel()`
    pub fn emit(&self, event: ChannelEvent) {
        let guard = self.lock();
        if let Some(c) = guard.iter().find(|c| c.request.channel == event.channel()) {
            let _ = c.events.send(event);
        }
    }

    pub fn emit_open(&self, channel: ChannelId) {
        self.emit(ChannelEvent::Opened { channel });
    }

    pub fn emit_message(&self, channel: ChannelId, raw: &str) {
        self.emit(ChannelEvent::Message {
            channel,
            raw: raw.to_string(),
        });
    }

    pub fn emit_closed(&self, channel: ChannelId) {
        self.emit(ChannelEvent::Closed {
            channel,
            reason: None,
        });
    }
}

/// Connector that never touches the network
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    channels: FakeChannels,
    /// Reject every open with this message (simulates a refused request)
    pub reject_with: Option<String>,
}

impl FakeConnector {
    /// Create a connector and the shared view tests keep
    pub fn new() -> (Self, FakeChannels) {
        let connector = FakeConnector::default();
        let channels = connector.channels.clone();
        (connector, channels)
    }

    /// Connector whose opens all fail at the call site
    pub fn rejecting(message: &str) -> (Self, FakeChannels) {
        let (mut connector, channels) = Self::new();
        connector.reject_with = Some(message.to_string());
        (connector, channels)
    }
}

impl Connector for FakeConnector {
    fn open(&mut self, request: OpenRequest, events: ChannelSender) -> Result<ChannelHandle> {
        if let Some(ref message) = self.reject_with {
            return Err(ChannelError::Open(message.clone()));
        }
        let (handle, outbound) = ChannelHandle::pair(request.channel);
        self.channels.lock().push(FakeChannel {
            request,
            events,
            outbound,
            sent: Vec::new(),
            closed_by_client: false,
        });
        Ok(handle)
    }
}
