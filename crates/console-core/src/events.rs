//! Event handling for console-core operations
//!
//! The console fans its output out two ways, matching how UI layers
//! consume it:
//!
//! - a registered [`ConsoleEventHandler`] for applications that want a
//!   callback-style integration
//! - a `tokio::sync::broadcast` channel, subscribed through
//!   [`EventSubscription`], for applications that prefer a stream
//!
//! Every user-visible transient message (backend rejections, adapter
//! errors, readiness failures) flows through a [`Notice`]; session state
//! changes flow through [`ConsoleEvent::SessionChanged`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::session::CallSessionState;

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational message
    Info,
    /// Transient error message; the console has already returned to a
    /// stable state
    Error,
}

/// A user-visible transient message
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Severity for rendering
    pub level: NoticeLevel,
    /// Operator-facing text (backend or SDK wording, verbatim)
    pub message: String,
    /// When the notice was emitted
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    /// Create an error notice stamped now
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into(), timestamp: Utc::now() }
    }

    /// Create an info notice stamped now
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into(), timestamp: Utc::now() }
    }
}

/// Event emitted by the console manager
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    /// The call-session state changed; carries the full new state
    SessionChanged(CallSessionState),
    /// A user-visible transient message
    Notice(Notice),
}

/// Handler trait for applications consuming console events
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use leadcall_console_core::{CallSessionState, ConsoleEventHandler, Notice};
///
/// struct PrintHandler;
///
/// #[async_trait]
/// impl ConsoleEventHandler for PrintHandler {
///     async fn on_session_changed(&self, state: CallSessionState) {
///         println!("callout state: {}", state.callout_state);
///     }
///
///     async fn on_notice(&self, notice: Notice) {
///         eprintln!("{}", notice.message);
///     }
/// }
/// ```
#[async_trait]
pub trait ConsoleEventHandler: Send + Sync {
    /// Called whenever the call-session state changes
    async fn on_session_changed(&self, state: CallSessionState);

    /// Called for every user-visible transient message
    async fn on_notice(&self, notice: Notice);
}

/// A subscription to the console's broadcast event stream
pub struct EventSubscription {
    id: Uuid,
    /// Receiver for the subscribed events
    pub receiver: broadcast::Receiver<ConsoleEvent>,
}

impl EventSubscription {
    /// Create a subscription over the given receiver
    pub fn new(receiver: broadcast::Receiver<ConsoleEvent>) -> Self {
        Self { id: Uuid::new_v4(), receiver }
    }

    /// Unique id of this subscription
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Shared handler slot used by the console manager
pub(crate) type HandlerSlot = tokio::sync::RwLock<Option<Arc<dyn ConsoleEventHandler>>>;
