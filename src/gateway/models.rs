//! Wire payloads exchanged with the analysis server

use serde::{Deserialize, Serialize};

/// Body of `POST /search`
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
}

/// Body of `POST /generate-report`
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportRequest<'a> {
    pub analysis: &'a str,
}

/// Response of `POST /generate-report`; `success` is optional on the wire
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub success: Option<bool>,
    pub report_url: Option<String>,
    pub error: Option<String>,
}

/// Error body some endpoints attach to non-success statuses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extract the `error` text from a raw body, if it is JSON and has one
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|msg| !msg.trim().is_empty())
    }
}
