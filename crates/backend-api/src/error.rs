//! Error types for backend API operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered but rejected the request (non-zero envelope code).
    #[error("Backend rejected request (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered success but the envelope carried no payload.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client-side configuration problem (malformed base URL and the like).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether retrying the same request later could plausibly succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// The message a UI layer should show for this failure.
    ///
    /// Backend rejections surface the backend's own message verbatim;
    /// everything else falls back to the error's display form.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
