//! Error types and handling for the console-core library
//!
//! This module defines all error types that can occur during console
//! operations. Nothing here is fatal to the process: every failure is meant
//! to degrade into a user-visible notice and a return to a stable
//! idle-equivalent state.
//!
//! # Error Categories
//!
//! - **Backend Errors** - the CRM backend rejected a request or the
//!   transport failed; surfaced as a transient message, no retry
//! - **Adapter Errors** - the calling SDK reported a failure; surfaced
//!   using the SDK's own text (login expiry is recovered silently instead)
//! - **State Errors** - an operation was attempted in a state that forbids
//!   it (call while not ready, duplicate token fetch, double start)
//! - **Lead Errors** - identity lookups that missed, or the protected
//!   first row

use thiserror::Error;

/// Result type alias for console-core operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Message shown when a call is triggered while the SDK is not ready
pub const NOT_READY_MESSAGE: &str = "socket not connected or already in a call";

/// Message rendered when an active call has no user context attached
pub const MISSING_USER_MESSAGE: &str = "no user information found";

/// Error types for CRM console operations
#[derive(Error, Debug, Clone)]
pub enum ConsoleError {
    /// The backend answered but rejected the request (non-zero code)
    #[error("Backend rejected request (code {code}): {message}")]
    BackendRejected { code: i64, message: String },

    /// Transport-level failure talking to the backend
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// The calling SDK reported an error
    #[error("Adapter error ({kind}): {message}")]
    AdapterFailed { kind: String, message: String },

    /// Readiness check failed; no backend request was sent
    #[error("{}", NOT_READY_MESSAGE)]
    NotReady,

    /// An active call has no user context to render
    #[error("{}", MISSING_USER_MESSAGE)]
    MissingCallUser,

    /// A token request is already in flight
    #[error("Token request already in flight")]
    FetchInFlight,

    /// Lead lookup by identity missed
    #[error("Lead not found: {key}")]
    LeadNotFound { key: String },

    /// The first lead row is protected from deletion
    #[error("Lead {key} is protected and cannot be deleted")]
    ProtectedLead { key: String },

    /// The adapter or manager was already constructed/started
    #[error("Already initialized: {what}")]
    AlreadyInitialized { what: String },

    /// Configuration errors
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfiguration { field: String, reason: String },
}

impl ConsoleError {
    /// Create an adapter error from the SDK's type code and message
    pub fn adapter_failed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AdapterFailed { kind: kind.into(), message: message.into() }
    }

    /// Check if this error is recoverable by retrying later
    pub fn is_recoverable(&self) -> bool {
        match self {
            ConsoleError::Network { .. }
            | ConsoleError::NotReady
            | ConsoleError::FetchInFlight => true,

            ConsoleError::BackendRejected { .. }
            | ConsoleError::AdapterFailed { .. }
            | ConsoleError::MissingCallUser
            | ConsoleError::LeadNotFound { .. }
            | ConsoleError::ProtectedLead { .. }
            | ConsoleError::AlreadyInitialized { .. }
            | ConsoleError::InvalidConfiguration { .. } => false,
        }
    }

    /// Get error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            ConsoleError::BackendRejected { .. } | ConsoleError::Network { .. } => "backend",
            ConsoleError::AdapterFailed { .. } => "adapter",
            ConsoleError::NotReady
            | ConsoleError::FetchInFlight
            | ConsoleError::AlreadyInitialized { .. } => "state",
            ConsoleError::MissingCallUser => "render",
            ConsoleError::LeadNotFound { .. } | ConsoleError::ProtectedLead { .. } => "leads",
            ConsoleError::InvalidConfiguration { .. } => "configuration",
        }
    }

    /// The message a UI layer should show for this failure
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::BackendRejected { message, .. } => message.clone(),
            ConsoleError::AdapterFailed { kind, message } => {
                if message.is_empty() {
                    kind.clone()
                } else {
                    message.clone()
                }
            }
            other => other.to_string(),
        }
    }
}

impl From<leadcall_backend_api::ApiError> for ConsoleError {
    fn from(err: leadcall_backend_api::ApiError) -> Self {
        use leadcall_backend_api::ApiError;
        match err {
            ApiError::Rejected { code, message } => ConsoleError::BackendRejected { code, message },
            ApiError::Transport(e) => ConsoleError::Network { reason: e.to_string() },
            ApiError::InvalidResponse(reason) => ConsoleError::Network { reason },
            ApiError::Config(reason) => ConsoleError::InvalidConfiguration {
                field: "backend_base_url".to_string(),
                reason,
            },
        }
    }
}
