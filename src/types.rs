use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::relay::RelayError;

/// A single webhook delivery, as handed to the relay.
#[derive(Debug, Default, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub body: Option<EventBody>,
}

/// The event body is either still JSON text or already decoded.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EventBody {
    Text(String),
    Structured(Value),
}

impl InboundEvent {
    /// Wraps a raw HTTP request body. An empty body counts as no body;
    /// bytes that are not valid UTF-8 are rejected rather than repaired.
    pub fn from_raw(bytes: Vec<u8>) -> Result<Self, RelayError> {
        if bytes.is_empty() {
            return Ok(Self { body: None });
        }
        let text = String::from_utf8(bytes)
            .map_err(|e| RelayError::MalformedPayload(e.to_string()))?;
        Ok(Self {
            body: Some(EventBody::Text(text)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub to: String,
    pub from: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RelayBody {
    Sent {
        success: bool,
        message: String,
        #[serde(rename = "messageSid")]
        message_sid: String,
    },
    Failed {
        success: bool,
        error: String,
    },
}
