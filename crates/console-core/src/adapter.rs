//! Contract with the external calling SDK
//!
//! The calling SDK is an opaque third-party component that owns signaling,
//! media negotiation and the real call state machine. This module defines
//! the typed seam the console talks through:
//!
//! - [`CallAdapter`] - the operations the console invokes (login, logout,
//!   readiness check, hang up, answer, refuse, quality check)
//! - [`AdapterEvent`] - the state changes the SDK pushes back, delivered
//!   over an explicit `mpsc` channel supplied at adapter construction
//!   instead of the SDK's original ambient global callbacks
//! - [`AdapterLifecycle`] - the process-wide construction guard ("one
//!   physical calling line per session")
//!
//! User intents never mutate console state directly; the console applies
//! only the events the adapter pushes, so the displayed state cannot drift
//! from the SDK's actual state even when the SDK rejects an action.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::call::{CallUser, CalloutState};
use crate::error::ConsoleResult;

/// Sender half of the adapter event channel
pub type AdapterEventSender = mpsc::UnboundedSender<AdapterEvent>;

/// Receiver half of the adapter event channel
pub type AdapterEventReceiver = mpsc::UnboundedReceiver<AdapterEvent>;

/// Create the channel an adapter implementation pushes its events into.
///
/// The sender goes to the adapter at construction; the receiver goes to
/// [`ConsoleManager::start`](crate::client::ConsoleManager::start).
pub fn adapter_event_channel() -> (AdapterEventSender, AdapterEventReceiver) {
    mpsc::unbounded_channel()
}

/// Classification of SDK-reported errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterErrorKind {
    /// The SDK session expired; the console silently re-acquires a token
    LoginExpired,
    /// Any other SDK error type code, surfaced to the operator
    Other(String),
}

impl AdapterErrorKind {
    /// Decode the SDK's string type code
    pub fn from_code(code: &str) -> Self {
        match code {
            "login_expired" => AdapterErrorKind::LoginExpired,
            other => AdapterErrorKind::Other(other.to_string()),
        }
    }

    /// The SDK's string type code for this kind
    pub fn as_str(&self) -> &str {
        match self {
            AdapterErrorKind::LoginExpired => "login_expired",
            AdapterErrorKind::Other(code) => code,
        }
    }
}

/// State change pushed asynchronously by the calling SDK
///
/// Events arrive at arbitrary times relative to user actions and backend
/// responses; the console must tolerate any interleaving since the SDK is
/// the sole source of truth for call state.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent {
    /// Login session state changed
    LoginStateChanged {
        /// Whether the SDK now holds a logged-in session
        logged_in: bool,
    },
    /// Outbound call state changed
    CalloutStateChanged {
        /// New outbound call state
        state: CalloutState,
        /// The callee, when the SDK attached user context to the event
        user: Option<CallUser>,
    },
    /// Inbound call presentation changed
    CallinStateChanged {
        /// The pending caller, or `None` once no inbound call awaits a decision
        user: Option<CallUser>,
    },
    /// The SDK reported an error
    Error {
        /// Error classification; `LoginExpired` triggers silent recovery
        kind: AdapterErrorKind,
        /// SDK-supplied message, possibly empty
        message: String,
    },
    /// A call finished and the SDK completed its own cleanup (`cbAfterCall`)
    CallFinished,
}

/// Parameters for the synchronous readiness predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyCallCheck {
    /// Callee display name
    pub callee_name: String,
    /// Callee phone number
    pub callee_phone_num: String,
}

/// Configuration handed to an adapter implementation at construction
///
/// The real SDK requires two fixed page anchors to exist at all times it is
/// active: a login anchor and an audio/video stream anchor. Their absence
/// breaks the SDK; the ids are carried here as a documented external
/// constraint, not interpreted by the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Id of the page element the SDK mounts its login surface into
    pub login_anchor: String,
    /// Id of the page element the SDK attaches the remote media stream to
    pub remote_stream_anchor: String,
    /// Whether the SDK renders its own built-in call view
    pub view: bool,
    /// Enable the SDK's verbose logging
    pub debug: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            login_anchor: "login".to_string(),
            remote_stream_anchor: "remote_stream".to_string(),
            view: true,
            debug: false,
        }
    }
}

impl AdapterConfig {
    /// Enable the SDK's verbose logging
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Disable the SDK's built-in call view (custom UI mode)
    pub fn without_view(mut self) -> Self {
        self.view = false;
        self
    }
}

/// Operations the console invokes on the external calling SDK
///
/// Implementations wrap the vendor SDK and push [`AdapterEvent`]s into the
/// sender supplied at construction. All methods are intent forwarding: an
/// implementation must not report success as a state change by itself, the
/// resulting state arrives through the event channel.
#[async_trait]
pub trait CallAdapter: Send + Sync {
    /// One-time setup; must run after construction and before any call
    async fn init(&self) -> ConsoleResult<()>;

    /// Log in with a call-capability token
    async fn login(&self, token: &str) -> ConsoleResult<()>;

    /// End the SDK session
    async fn logout(&self) -> ConsoleResult<()>;

    /// Synchronous readiness predicate: connection open and not already in
    /// a call. Gates every outbound call request.
    fn check_ready_call(&self, check: &ReadyCallCheck) -> bool;

    /// Hang up the given call party
    async fn hang_up(&self, user: &CallUser) -> ConsoleResult<()>;

    /// Answer the pending inbound call from the given party
    async fn answer(&self, user: &CallUser) -> ConsoleResult<()>;

    /// Refuse the pending inbound call from the given party
    async fn refuse(&self, user: &CallUser) -> ConsoleResult<()>;

    /// Forward a call quality check to the SDK; no local state change
    async fn check_quality(&self) -> ConsoleResult<()>;
}

// One physical calling line per process.
static ADAPTER_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Process-wide adapter construction guard
///
/// The SDK supports exactly one instance per process. Claim the lifecycle
/// before constructing an adapter; the claim is released on drop, after
/// which a fresh adapter may be constructed.
///
/// # Examples
///
/// ```rust
/// use leadcall_console_core::AdapterLifecycle;
///
/// let claim = AdapterLifecycle::claim().unwrap();
/// assert!(AdapterLifecycle::claim().is_err());
/// drop(claim);
/// assert!(AdapterLifecycle::claim().is_ok());
/// ```
#[derive(Debug)]
pub struct AdapterLifecycle {
    _private: (),
}

impl AdapterLifecycle {
    /// Claim the single adapter slot for this process.
    ///
    /// Fails with `AlreadyInitialized` while a previous claim is alive;
    /// re-construction while already holding a session is forbidden.
    pub fn claim() -> ConsoleResult<Self> {
        if ADAPTER_CLAIMED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(crate::error::ConsoleError::AlreadyInitialized {
                what: "calling SDK adapter".to_string(),
            });
        }
        tracing::debug!("adapter lifecycle claimed");
        Ok(Self { _private: () })
    }

    /// Whether an adapter claim is currently held somewhere in the process
    pub fn is_claimed() -> bool {
        ADAPTER_CLAIMED.load(Ordering::SeqCst)
    }
}

impl Drop for AdapterLifecycle {
    fn drop(&mut self) {
        ADAPTER_CLAIMED.store(false, Ordering::SeqCst);
        tracing::debug!("adapter lifecycle released");
    }
}
