use thiserror::Error;
use tracing::warn;

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16, got {0:?}")]
    InvalidPort(String),
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone)]
pub struct Config {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
    pub api_base: String,
    pub port: u16,
    pub dry_run: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_sid", &self.account_sid)
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .field("api_base", &self.api_base)
            .field("port", &self.port)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// Missing Twilio settings are not an error here: the relay still starts
    /// and the problem surfaces as a provider failure on the first send.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).unwrap_or_else(|| {
                warn!("{} not set - SMS delivery will fail until it is configured", key);
                String::new()
            })
        };

        let account_sid = required("TWILIO_ACCOUNT_SID");
        let auth_token = required("TWILIO_AUTH_TOKEN");
        let from_number = required("TWILIO_FROM_NUMBER");
        let to_number = required("TO_NUMBER");

        let api_base = lookup("TWILIO_API_BASE")
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let dry_run = lookup("DRY_RUN")
            .unwrap_or_else(|| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
            to_number,
            api_base,
            port,
            dry_run,
        })
    }
}
