use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::OutboundMessage;

pub struct TwilioClient {
    account_sid: String,
    auth_token: String,
    api_base: String,
    client: reqwest::Client,
}

/// What Twilio hands back for a created message. Only the SID is used.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    code: Option<u32>,
    message: Option<String>,
}

#[derive(Debug, Error)]
pub enum TwilioError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Twilio API error {status} (code {code}): {message}")]
    Api {
        status: u16,
        code: u32,
        message: String,
    },
    #[error("Twilio returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse failed: {0}")]
    Parse(String),
}

impl TwilioClient {
    pub fn new(account_sid: String, auth_token: String, api_base: String) -> Self {
        Self {
            account_sid,
            auth_token,
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base,
            urlencoding::encode(&self.account_sid)
        )
    }

    pub async fn send_message(&self, message: &OutboundMessage) -> Result<SentMessage, TwilioError> {
        let auth = BASE64_STANDARD.encode(format!("{}:{}", self.account_sid, self.auth_token));
        let params = [
            ("To", message.to.as_str()),
            ("From", message.from.as_str()),
            ("Body", message.body.as_str()),
        ];

        debug!("POST {} ({} chars)", self.messages_url(), message.body.chars().count());

        let response = self
            .client
            .post(self.messages_url())
            .header("Authorization", format!("Basic {}", auth))
            .form(&params)
            .send()
            .await
            .map_err(|e| TwilioError::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TwilioError::Network(format!("Reading response failed: {}", e)))?;

        if !status.is_success() {
            // Twilio error bodies carry a numeric code and a human readable message.
            if let Ok(TwilioErrorResponse {
                code: Some(code),
                message: Some(message),
            }) = serde_json::from_str::<TwilioErrorResponse>(&text)
            {
                warn!("Twilio rejected message: status={} code={} message={}", status, code, message);
                return Err(TwilioError::Api {
                    status: status.as_u16(),
                    code,
                    message,
                });
            }
            warn!("Twilio returned {} with unrecognised body", status);
            return Err(TwilioError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| TwilioError::Parse(e.to_string()))
    }
}
