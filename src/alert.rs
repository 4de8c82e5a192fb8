use serde_json::Value;

use crate::relay::RelayError;

const DEFAULT_EMBED_TITLE: &str = "Pulsetic Alert";
const DEFAULT_EMBED_DESCRIPTION: &str = "No description provided";
const DEFAULT_ALERT_TYPE: &str = "unknown";

/// Anything that can be turned into the two halves of an SMS.
pub trait AlertFormat {
    fn title(&self) -> String;
    fn description(&self) -> String;

    fn sms_body(&self) -> String {
        format!("{}\n\n{}", self.title(), self.description())
    }
}

/// A recognised Pulsetic payload, validated and ready to format.
#[derive(Debug)]
pub enum AlertPayload {
    Status(StatusAlert),
    Embed(EmbedAlert),
}

/// Status-style payload: an `alert_type` plus the `monitor` it concerns.
#[derive(Debug)]
pub struct StatusAlert {
    pub alert_type: String,
    pub monitor: Value,
}

/// Embed-style payload, reduced to the first element of `embeds`.
#[derive(Debug)]
pub struct EmbedAlert {
    pub embed: Value,
}

impl AlertPayload {
    /// Picks the interpretation from the fields present: a set `embeds` means
    /// the embed-style shape, anything else is treated as status-style.
    ///
    /// Fields are read loosely. Wrong-typed values never reject the payload,
    /// they fall back to defaults or render as JSON text.
    pub fn from_json(mut payload: Value) -> Result<Self, RelayError> {
        if let Some(embeds) = payload.get("embeds").filter(|e| is_set(e)) {
            return Self::from_embeds(embeds);
        }

        let monitor = payload
            .get_mut("monitor")
            .filter(|m| is_set(m))
            .map(Value::take)
            .ok_or_else(|| RelayError::InvalidPayload("no monitor data found".to_string()))?;
        let alert_type = payload
            .get("alert_type")
            .filter(|t| is_set(t))
            .map(value_text)
            .unwrap_or_else(|| DEFAULT_ALERT_TYPE.to_string());

        Ok(Self::Status(StatusAlert {
            alert_type,
            monitor,
        }))
    }

    fn from_embeds(embeds: &Value) -> Result<Self, RelayError> {
        // Only the first embed matters; the rest are never looked at.
        let first = embeds
            .as_array()
            .and_then(|list| list.first())
            .ok_or_else(|| RelayError::InvalidPayload("no embeds found".to_string()))?;

        Ok(Self::Embed(EmbedAlert {
            embed: first.clone(),
        }))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Embed(_) => "embed",
        }
    }
}

impl AlertFormat for AlertPayload {
    fn title(&self) -> String {
        match self {
            Self::Status(alert) => alert.title(),
            Self::Embed(alert) => alert.title(),
        }
    }

    fn description(&self) -> String {
        match self {
            Self::Status(alert) => alert.description(),
            Self::Embed(alert) => alert.description(),
        }
    }
}

impl StatusAlert {
    fn field(&self, name: &str) -> String {
        self.monitor.get(name).map(value_text).unwrap_or_default()
    }
}

impl AlertFormat for StatusAlert {
    fn title(&self) -> String {
        let name = self.field("name");
        match self.alert_type.as_str() {
            "monitor_offline" => format!("🚨 Monitor Offline: {}", name),
            "monitor_online" => format!("✅ Monitor Online: {}", name),
            _ => format!("📊 Pulsetic Alert: {}", name),
        }
    }

    fn description(&self) -> String {
        let url = self.field("url");
        match self.alert_type.as_str() {
            "monitor_offline" => {
                let reason = self
                    .monitor
                    .get("fail_reason")
                    .filter(|r| is_set(r))
                    .map(value_text)
                    .unwrap_or_else(|| "Unknown".to_string());
                format!(
                    "URL: {}\nResponse Code: {}\nReason: {}",
                    url,
                    self.field("response_code"),
                    reason
                )
            }
            "monitor_online" => format!("URL: {}\nMonitor is back online", url),
            other => format!("URL: {}\nAlert Type: {}", url, other),
        }
    }
}

impl EmbedAlert {
    fn field_or(&self, name: &str, default: &str) -> String {
        self.embed
            .get(name)
            .filter(|v| is_set(v))
            .map(value_text)
            .unwrap_or_else(|| default.to_string())
    }
}

impl AlertFormat for EmbedAlert {
    fn title(&self) -> String {
        self.field_or("title", DEFAULT_EMBED_TITLE)
    }

    fn description(&self) -> String {
        self.field_or("description", DEFAULT_EMBED_DESCRIPTION)
    }
}

/// False for null, `false`, zero and the empty string; those count as unset.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings render bare, everything else as JSON text, null as empty.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(payload: Value) -> AlertPayload {
        AlertPayload::from_json(payload).unwrap()
    }

    #[test]
    fn offline_alert_includes_reason() {
        let alert = status(json!({
            "alert_type": "monitor_offline",
            "monitor": {
                "name": "API",
                "url": "https://api.example.com",
                "response_code": 503,
                "fail_reason": "timeout"
            }
        }));

        assert_eq!(
            alert.sms_body(),
            "🚨 Monitor Offline: API\n\nURL: https://api.example.com\nResponse Code: 503\nReason: timeout"
        );
    }

    #[test]
    fn offline_alert_without_reason_says_unknown() {
        for reason in [json!(null), json!(""), json!(false), json!(0)] {
            let alert = status(json!({
                "alert_type": "monitor_offline",
                "monitor": {
                    "name": "Web",
                    "url": "https://example.com",
                    "response_code": 0,
                    "fail_reason": reason
                }
            }));
            assert!(
                alert.description().ends_with("Reason: Unknown"),
                "{:?} should render as Unknown",
                reason
            );
        }

        let alert = status(json!({
            "alert_type": "monitor_offline",
            "monitor": { "name": "Web", "url": "https://example.com", "response_code": 500 }
        }));
        assert_eq!(alert.title(), "🚨 Monitor Offline: Web");
        assert!(alert.description().ends_with("Reason: Unknown"));
    }

    #[test]
    fn online_alert_ignores_other_monitor_fields() {
        let alert = status(json!({
            "alert_type": "monitor_online",
            "monitor": {
                "name": "Web",
                "url": "https://example.com",
                "response_code": 200,
                "fail_reason": "leftover"
            }
        }));

        assert_eq!(alert.title(), "✅ Monitor Online: Web");
        assert_eq!(
            alert.description(),
            "URL: https://example.com\nMonitor is back online"
        );
    }

    #[test]
    fn unrecognised_alert_type_is_echoed() {
        let alert = status(json!({
            "alert_type": "ssl_expiring",
            "monitor": { "name": "Shop", "url": "https://shop.example.com" }
        }));

        assert_eq!(alert.title(), "📊 Pulsetic Alert: Shop");
        assert_eq!(
            alert.description(),
            "URL: https://shop.example.com\nAlert Type: ssl_expiring"
        );
    }

    #[test]
    fn non_string_alert_type_takes_generic_branch() {
        let alert = status(json!({
            "alert_type": 5,
            "monitor": { "name": "API", "url": "u" }
        }));

        assert_eq!(alert.sms_body(), "📊 Pulsetic Alert: API\n\nURL: u\nAlert Type: 5");
    }

    #[test]
    fn missing_alert_type_defaults_to_unknown() {
        for alert_type in [json!(null), json!(""), json!(false), json!(0)] {
            let alert = status(json!({
                "alert_type": alert_type,
                "monitor": { "name": "Shop", "url": "https://shop.example.com" }
            }));
            assert_eq!(alert.title(), "📊 Pulsetic Alert: Shop");
            assert!(alert.description().ends_with("Alert Type: unknown"));
        }

        let alert = status(json!({ "monitor": { "name": "Shop", "url": "https://shop.example.com" } }));
        assert!(alert.description().ends_with("Alert Type: unknown"));
    }

    #[test]
    fn missing_monitor_fields_render_empty() {
        let alert = status(json!({ "alert_type": "monitor_offline", "monitor": {} }));
        assert_eq!(
            alert.sms_body(),
            "🚨 Monitor Offline: \n\nURL: \nResponse Code: \nReason: Unknown"
        );

        let alert = status(json!({ "alert_type": "other", "monitor": { "name": null } }));
        assert_eq!(alert.sms_body(), "📊 Pulsetic Alert: \n\nURL: \nAlert Type: other");
    }

    #[test]
    fn non_object_monitor_is_accepted() {
        let alert = status(json!({ "alert_type": "monitor_online", "monitor": "yes" }));
        assert_eq!(alert.sms_body(), "✅ Monitor Online: \n\nURL: \nMonitor is back online");
    }

    #[test]
    fn monitor_less_payload_is_invalid() {
        for payload in [
            json!({ "alert_type": "monitor_offline" }),
            json!({ "alert_type": "monitor_offline", "monitor": null }),
            json!({ "alert_type": "monitor_offline", "monitor": false }),
            json!([1, 2, 3]),
        ] {
            let err = AlertPayload::from_json(payload).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid Pulsetic notification format - no monitor data found"
            );
        }
    }

    #[test]
    fn only_first_embed_is_used() {
        let alert = status(json!({
            "embeds": [
                { "title": "Down", "description": "api is down" },
                { "title": "Ignored", "description": "ignored" },
                "not even an object"
            ]
        }));

        assert_eq!(alert.kind(), "embed");
        assert_eq!(alert.sms_body(), "Down\n\napi is down");
    }

    #[test]
    fn embed_fields_fall_back_to_defaults() {
        for embed in [json!({}), json!("text"), json!({ "title": "", "description": null })] {
            let alert = status(json!({ "embeds": [embed] }));
            assert_eq!(alert.sms_body(), "Pulsetic Alert\n\nNo description provided");
        }
    }

    #[test]
    fn non_string_embed_fields_render_as_text() {
        let alert = status(json!({ "embeds": [{ "title": 7, "description": true }] }));
        assert_eq!(alert.sms_body(), "7\n\ntrue");
    }

    #[test]
    fn empty_or_non_array_embeds_are_invalid() {
        for embeds in [json!([]), json!({ "title": "x" }), json!("text")] {
            let err = AlertPayload::from_json(json!({ "embeds": embeds })).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid Pulsetic notification format - no embeds found"
            );
        }
    }

    #[test]
    fn null_embeds_falls_through_to_monitor() {
        let alert = status(json!({
            "embeds": null,
            "monitor": { "name": "API", "url": "u" }
        }));

        assert_eq!(alert.kind(), "status");
        assert_eq!(alert.sms_body(), "📊 Pulsetic Alert: API\n\nURL: u\nAlert Type: unknown");

        let err = AlertPayload::from_json(json!({ "embeds": null })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid Pulsetic notification format - no monitor data found"
        );
    }

    #[test]
    fn embeds_take_precedence_over_monitor() {
        let alert = status(json!({
            "monitor": { "name": "Web" },
            "embeds": [{ "title": "From embed" }]
        }));
        assert_eq!(alert.kind(), "embed");
        assert_eq!(alert.title(), "From embed");
    }
}
