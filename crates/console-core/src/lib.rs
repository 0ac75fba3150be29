//! Console-core: CRM agent console coordination layer
//!
//! This crate provides the core of a demonstration CRM agent console that
//! drives an opaque third-party calling SDK. The SDK owns the hard parts
//! (signaling, media, its own call state machine); this crate is the
//! presentation plumbing around it:
//!
//! - **Call-session view model** - maps SDK-reported login/callout/callin
//!   state to renderable descriptors and the actions permitted per state
//! - **Adapter contract** - the typed seam to the external calling SDK,
//!   with events delivered over an explicit channel instead of ambient
//!   global callbacks
//! - **Lead table controller** - in-memory CRUD over the lead records one
//!   of which triggers an outbound call
//! - **Console manager** - token acquisition, backend call creation, and
//!   the event pump reconciling adapter events into session state
//!
//! ## Layer separation
//! ```text
//! UI layer -> console-core -> { calling SDK adapter, backend-api }
//! ```
//!
//! The displayed call state never diverges from the SDK's actual state:
//! user intents are forwarded to the adapter and local state updates only
//! when the adapter pushes the resulting event back.

pub mod adapter;
pub mod call;
pub mod client;
pub mod error;
pub mod events;
pub mod leads;
pub mod session;

// Public API exports (only high-level console-core types)
pub use adapter::{
    adapter_event_channel, AdapterConfig, AdapterErrorKind, AdapterEvent,
    AdapterEventReceiver, AdapterEventSender, AdapterLifecycle, CallAdapter, ReadyCallCheck,
};
pub use call::{CallUser, CalloutState};
pub use client::{ConsoleConfig, ConsoleManager, SessionCredentials};
pub use error::{ConsoleError, ConsoleResult, MISSING_USER_MESSAGE, NOT_READY_MESSAGE};
pub use events::{ConsoleEvent, ConsoleEventHandler, EventSubscription, Notice, NoticeLevel};
pub use leads::{seed_leads, Lead, LeadTable};
pub use session::{CallSessionState, CallinView, CalloutView};

/// Console-core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
