//! Error taxonomy shared by every controller in the crate

/// Result type for controller and gateway operations
pub type Result<T> = std::result::Result<T, InsightError>;

/// Error types surfaced by the gateway, the playback adapter and the controllers
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InsightError {
    /// Transport failure before any response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status (or an explicit `success: false` body)
    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    /// Success status with an unusable body
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Playback unsupported for {0}")]
    PlaybackUnsupported(String),

    /// Adaptive-bitrate runtime or media element reported an unrecoverable error
    #[error("Playback failed: {0}")]
    PlaybackFatal(String),

    /// Operation rejected locally without contacting the network
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InsightError {
    /// Text shown to the user in a banner or alert for this failure kind
    pub fn user_message(&self) -> String {
        match self {
            InsightError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            InsightError::Server { status, message } => match message {
                Some(msg) => format!("The server reported an error ({}): {}", status, msg),
                None => format!("The server reported an error ({}). Please try again.", status),
            },
            InsightError::MalformedResponse(_) => {
                "The server sent an unexpected response. Please try again.".to_string()
            }
            InsightError::PlaybackUnsupported(_) => {
                "Video playback is not supported in this browser.".to_string()
            }
            InsightError::PlaybackFatal(_) => "Video failed to load.".to_string(),
            InsightError::PreconditionFailed(reason) => reason.clone(),
            InsightError::InvalidQuery(reason) => reason.clone(),
            InsightError::Config(reason) => format!("Configuration error: {}", reason),
        }
    }

    /// Whether the failure happened locally, with no request sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            InsightError::PreconditionFailed(_) | InsightError::InvalidQuery(_) | InsightError::Config(_)
        )
    }
}

impl From<reqwest::Error> for InsightError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            InsightError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            InsightError::Server {
                status: status.as_u16(),
                message: None,
            }
        } else {
            InsightError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        InsightError::MalformedResponse(err.to_string())
    }
}
