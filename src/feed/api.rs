use std::fmt;

use serde_json::Value;

use crate::config::GateConfig;

/// URLs of the trolley back-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    api_base: String,
    ws_url: String,
}

impl ApiEndpoints {
    pub fn new(api_base: &str, ws_url: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            ws_url: ws_url.to_string(),
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(&config.api_base, &config.ws_url)
    }

    /// `GET` target for what a trolley must carry.
    pub fn required_contents(&self, trolley_id: i64) -> String {
        format!("{}/api/trolleys/{trolley_id}/required-contents/", self.api_base)
    }

    /// `POST` target for new scan records.
    pub fn qr_data(&self) -> String {
        format!("{}/api/qr-data/", self.api_base)
    }

    pub fn live_feed(&self) -> &str {
        &self.ws_url
    }
}

/// A failed REST call, shown to the operator next to a retry button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// HTTP status; 0 when the request never got a response.
    pub status: u16,
    pub message: String,
}

impl ApiFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
        }
    }

    /// Builds the failure from an error response body, preferring `detail`, then `message`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                ["detail", "message"]
                    .iter()
                    .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() || trimmed.starts_with('{') {
                    "Unknown error".to_string()
                } else {
                    trimmed.to_string()
                }
            });
        Self { status, message }
    }

    pub fn is_network(&self) -> bool {
        self.status == 0
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_network() {
            write!(f, "network error: {}", self.message)
        } else {
            write!(f, "HTTP {}: {}", self.status, self.message)
        }
    }
}

impl std::error::Error for ApiFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_built_from_base() {
        let api = ApiEndpoints::new("http://10.0.0.5:8000/", "ws://10.0.0.5:8000/ws/qr-data/");
        assert_eq!(
            api.required_contents(4),
            "http://10.0.0.5:8000/api/trolleys/4/required-contents/"
        );
        assert_eq!(api.qr_data(), "http://10.0.0.5:8000/api/qr-data/");
        assert_eq!(api.live_feed(), "ws://10.0.0.5:8000/ws/qr-data/");
    }

    #[test]
    fn failure_message_prefers_detail() {
        let failure = ApiFailure::from_response(404, r#"{"detail":"Not found.","message":"x"}"#);
        assert_eq!(failure.message, "Not found.");
        assert_eq!(failure.to_string(), "HTTP 404: Not found.");

        let failure = ApiFailure::from_response(400, r#"{"message":"bad drawer"}"#);
        assert_eq!(failure.message, "bad drawer");
    }

    #[test]
    fn failure_without_json_uses_text() {
        assert_eq!(ApiFailure::from_response(502, "Bad Gateway").message, "Bad Gateway");
        assert_eq!(ApiFailure::from_response(500, "{}").message, "Unknown error");
        assert!(ApiFailure::network("connection refused").is_network());
    }
}
