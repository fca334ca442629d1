//! WebSocket connector
//!
//! Each channel instance is one tokio task: connect, report `Opened`, then
//! relay inbound text frames as `Message` events and outbound frames from
//! the handle's queue until either side closes. The task always finishes
//! with exactly one `Closed` event.

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::session::channel::{
    ChannelEvent, ChannelHandle, ChannelSender, Connector, OpenRequest, Outbound, OutboundReceiver,
};
use crate::session::Result;

/// Connector backed by tokio-tungstenite, running on a caller-provided runtime
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    runtime: Handle,
}

impl WebSocketConnector {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Connector for WebSocketConnector {
    fn open(&mut self, request: OpenRequest, events: ChannelSender) -> Result<ChannelHandle> {
        let (handle, outbound) = ChannelHandle::pair(request.channel);
        info!(channel = %request.channel, url = %request.url, "opening channel");
        self.runtime.spawn(run_channel(request, events, outbound));
        Ok(handle)
    }
}

async fn run_channel(request: OpenRequest, events: ChannelSender, mut outbound: OutboundReceiver) {
    let channel = request.channel;

    let (mut ws, _) = match connect_async(request.url.as_str()).await {
        Ok(value) => value,
        Err(err) => {
            warn!(%channel, "channel open failed: {err}");
            let _ = events.send(ChannelEvent::Error {
                channel,
                description: format!("Failed to connect to {}: {}", request.url, err),
            });
            let _ = events.send(ChannelEvent::Closed {
                channel,
                reason: Some("connection failed".to_string()),
            });
            return;
        }
    };

    if events.send(ChannelEvent::Opened { channel }).is_err() {
        // Session is gone; nobody is listening
        let _ = ws.close(None).await;
        return;
    }

    let reason = loop {
        tokio::select! {
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if events.send(ChannelEvent::Message { channel, raw: text }).is_err() {
                        let _ = ws.close(None).await;
                        break None;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    break frame.map(|f| f.reason.to_string()).filter(|r| !r.is_empty());
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(%channel, "channel error: {err}");
                    let _ = events.send(ChannelEvent::Error {
                        channel,
                        description: err.to_string(),
                    });
                    break None;
                }
                None => break None,
            },
            next = outbound.recv() => match next {
                Some(Outbound::Text(text)) => {
                    if let Err(err) = ws.send(Message::Text(text)).await {
                        warn!(%channel, "send failed: {err}");
                        let _ = events.send(ChannelEvent::Error {
                            channel,
                            description: format!("Send failed: {}", err),
                        });
                        break None;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = ws.close(None).await;
                    break Some("closed by client".to_string());
                }
            },
        }
    };

    debug!(%channel, ?reason, "channel finished");
    let _ = events.send(ChannelEvent::Closed { channel, reason });
}
