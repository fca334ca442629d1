//! Inbound message envelope
//!
//! The gateway wraps everything it sends in a tagged JSON object:
//! `{ "type": <tag>, "message": <text>, "user_id": <origin> }`.
//! Outbound commands are raw text and never use this envelope.

use serde_json::Value;

/// Origin sentinel used by the gateway for its own messages
pub const SYSTEM_ORIGIN: &str = "system";

/// Decoded inbound envelope
///
/// Fields are read leniently: any JSON value decodes, a non-string `type`
/// counts as absent, and non-string `message` / `user_id` values are kept
/// in their JSON text form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Message tag; absent tags fall through to the unknown branch
    pub tag: Option<String>,
    /// Message body (absent for `clear_chat`)
    pub message: Option<String>,
    /// Author identity, `system` when omitted
    pub user_id: Option<String>,
}

impl Envelope {
    /// Decode one inbound payload. Returns `None` only when `raw` is not
    /// JSON; JSON that is not an object decodes to an untagged envelope.
    pub fn decode(raw: &str) -> Option<Envelope> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let Value::Object(fields) = value else {
            return Some(Envelope::default());
        };

        Some(Envelope {
            tag: fields.get("type").and_then(Value::as_str).map(str::to_string),
            message: fields.get("message").and_then(text_of),
            user_id: fields.get("user_id").and_then(text_of),
        })
    }

    pub fn message_tag(&self) -> MessageTag {
        self.tag
            .as_deref()
            .map(MessageTag::from_wire)
            .unwrap_or(MessageTag::Unknown)
    }

    pub fn origin(&self) -> &str {
        self.user_id.as_deref().unwrap_or(SYSTEM_ORIGIN)
    }

    pub fn body(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// String fields as-is, `null` as absent, anything else as JSON text
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Closed set of inbound tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTag {
    System,
    CommandSent,
    CommandReceived,
    CommandResponse,
    SystemBroadcast,
    Error,
    ClearChat,
    Unknown,
}

impl MessageTag {
    pub fn from_wire(tag: &str) -> MessageTag {
        match tag {
            "system" => MessageTag::System,
            "command_sent" => MessageTag::CommandSent,
            "command_received" => MessageTag::CommandReceived,
            "command_response" => MessageTag::CommandResponse,
            "system_broadcast" => MessageTag::SystemBroadcast,
            "error" => MessageTag::Error,
            "clear_chat" => MessageTag::ClearChat,
            _ => MessageTag::Unknown,
        }
    }
}
