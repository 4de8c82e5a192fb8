use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::alert::{AlertFormat, AlertPayload};
use crate::config::Config;
use crate::twilio::{SentMessage, TwilioClient, TwilioError};
use crate::types::{EventBody, InboundEvent, OutboundMessage, RelayBody};

pub const DRY_RUN_SID: &str = "dry-run";

/// Every way a single relay attempt can fail. All of them end up as a 500.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("No body found in request")]
    MissingBody,
    #[error("Malformed JSON in request body: {0}")]
    MalformedPayload(String),
    #[error("Invalid Pulsetic notification format - {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Provider(#[from] TwilioError),
}

/// The one capability the relay needs from an SMS provider.
pub trait SmsSender {
    fn send(
        &self,
        message: &OutboundMessage,
    ) -> impl Future<Output = Result<SentMessage, TwilioError>> + Send;
}

impl SmsSender for TwilioClient {
    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, TwilioError> {
        self.send_message(message).await
    }
}

/// Chooses between the real provider and logging only.
pub enum Dispatcher {
    Twilio(TwilioClient),
    DryRun,
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Self {
        if config.dry_run {
            return Self::DryRun;
        }
        Self::Twilio(TwilioClient::new(
            config.account_sid.clone(),
            config.auth_token.clone(),
            config.api_base.clone(),
        ))
    }
}

impl SmsSender for Dispatcher {
    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, TwilioError> {
        match self {
            Self::Twilio(client) => client.send(message).await,
            Self::DryRun => {
                info!("[DRY RUN] Would send SMS to {}: {}", message.to, message.body);
                Ok(SentMessage {
                    sid: DRY_RUN_SID.to_string(),
                    status: None,
                })
            }
        }
    }
}

/// Response in the shape of a function invocation result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RelayResponse {
    fn json(status_code: u16, body: &RelayBody) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            // RelayBody only holds strings and bools, so this cannot fail.
            body: serde_json::to_string(body).unwrap_or_default(),
        }
    }

    fn sent(message_sid: String) -> Self {
        Self::json(
            200,
            &RelayBody::Sent {
                success: true,
                message: "SMS sent successfully".to_string(),
                message_sid,
            },
        )
    }

    pub fn failed(err: &RelayError) -> Self {
        Self::json(
            500,
            &RelayBody::Failed {
                success: false,
                error: err.to_string(),
            },
        )
    }
}

impl EventBody {
    fn into_payload(self) -> Result<Value, RelayError> {
        match self {
            EventBody::Text(text) if text.is_empty() => Err(RelayError::MissingBody),
            EventBody::Text(text) => {
                serde_json::from_str(&text)
                    .map_err(|e| RelayError::MalformedPayload(e.to_string()))
            }
            EventBody::Structured(value) => Ok(value),
        }
    }
}

/// Derives the SMS for an event without sending it.
pub fn build_message(event: InboundEvent, config: &Config) -> Result<OutboundMessage, RelayError> {
    let payload = event.body.ok_or(RelayError::MissingBody)?.into_payload()?;
    debug!("Parsed body: {}", payload);

    let alert = AlertPayload::from_json(payload)?;
    debug!("Recognised {} alert", alert.kind());

    Ok(OutboundMessage {
        to: config.to_number.clone(),
        from: config.from_number.clone(),
        body: alert.sms_body(),
    })
}

async fn process<S: SmsSender>(
    event: InboundEvent,
    config: &Config,
    sender: &S,
) -> Result<String, RelayError> {
    let message = build_message(event, config)?;
    info!("Sending SMS: {}", message.body);

    let sent = sender.send(&message).await?;
    info!(
        "SMS sent successfully. Message SID: {} (status: {})",
        sent.sid,
        sent.status.as_deref().unwrap_or("unknown")
    );
    Ok(sent.sid)
}

/// Handles one webhook delivery end to end. Never fails: every error is
/// logged and folded into a 500 response.
pub async fn relay<S: SmsSender>(event: InboundEvent, config: &Config, sender: &S) -> RelayResponse {
    match process(event, config, sender).await {
        Ok(sid) => RelayResponse::sent(sid),
        Err(err) => {
            error!("Error processing Pulsetic alert: {}", err);
            RelayResponse::failed(&err)
        }
    }
}
