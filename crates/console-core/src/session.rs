//! Call-session view model
//!
//! The core of the console: a pure reducer mapping adapter-pushed events
//! into one coherent renderable state, plus the render operations that
//! derive UI descriptors from it.
//!
//! Invariants:
//! - `callout_user` is present iff `callout_state != NotStart`
//! - `callin_user` is present iff an unanswered inbound call exists
//! - at most one outbound call and one pending inbound call are tracked;
//!   the SDK serializes calls, the view model does not queue
//!
//! The reducer never synthesizes a transition of its own. User intents go
//! to the adapter; the resulting state comes back as the next event.
//!
//! # Examples
//!
//! ```rust
//! use leadcall_console_core::{
//!     AdapterEvent, CallSessionState, CallUser, CalloutState, CalloutView,
//! };
//!
//! let mut session = CallSessionState::default();
//! assert_eq!(session.render_callout(), CalloutView::Hidden);
//!
//! session.apply(&AdapterEvent::CalloutStateChanged {
//!     state: CalloutState::Calling,
//!     user: Some(CallUser::new("colin", "13810433402")),
//! });
//!
//! match session.render_callout() {
//!     CalloutView::Panel { hangup_enabled, phone, .. } => {
//!         assert!(hangup_enabled);
//!         assert_eq!(phone, "13810433402");
//!     }
//!     other => panic!("unexpected view: {:?}", other),
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::adapter::AdapterEvent;
use crate::call::{CallUser, CalloutState};
use crate::error::MISSING_USER_MESSAGE;

/// The one coherent renderable state of the call session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallSessionState {
    /// Whether the SDK holds a logged-in session
    pub logged_in: bool,
    /// Outbound call state as last reported by the SDK
    pub callout_state: CalloutState,
    /// The callee of the active outbound call, if any
    pub callout_user: Option<CallUser>,
    /// The caller of the pending inbound call, if any
    pub callin_user: Option<CallUser>,
}

/// Render descriptor for the outbound call panel
#[derive(Debug, Clone, PartialEq)]
pub enum CalloutView {
    /// No outbound call; render nothing
    Hidden,
    /// A call is active but the SDK attached no user context; render an
    /// inline error panel instead of call controls
    MissingUser {
        /// Operator-facing error text
        message: &'static str,
    },
    /// Active outbound call panel
    Panel {
        /// Whether the hang-up button is rendered enabled
        hangup_enabled: bool,
        /// Human-readable state label
        state_label: String,
        /// Callee phone number
        phone: String,
        /// Callee display name
        name: String,
    },
}

/// Render descriptor for the inbound call panel
///
/// Carries answer/refuse affordances implicitly; the panel is keyed by the
/// caller's phone number so a changed phone replaces the prior panel.
#[derive(Debug, Clone, PartialEq)]
pub struct CallinView {
    /// Render key; equals the caller's phone number
    pub key: String,
    /// Caller phone number
    pub phone: String,
    /// Caller display name
    pub name: String,
}

impl CallSessionState {
    /// Apply one adapter-pushed event to the session state.
    ///
    /// Error and call-finished events carry no state; they are handled by
    /// the console manager (notice emission, silent token recovery) and
    /// leave the session untouched here.
    pub fn apply(&mut self, event: &AdapterEvent) {
        match event {
            AdapterEvent::LoginStateChanged { logged_in } => {
                self.logged_in = *logged_in;
            }
            AdapterEvent::CalloutStateChanged { state, user } => {
                self.callout_state = *state;
                // Invariant: no user context is tracked while idle.
                self.callout_user = if *state == CalloutState::NotStart {
                    None
                } else {
                    user.clone()
                };
            }
            AdapterEvent::CallinStateChanged { user } => {
                self.callin_user = user.clone();
            }
            AdapterEvent::Error { .. } | AdapterEvent::CallFinished => {}
        }
    }

    /// Derive the outbound call panel descriptor.
    pub fn render_callout(&self) -> CalloutView {
        if self.callout_state == CalloutState::NotStart {
            return CalloutView::Hidden;
        }
        match &self.callout_user {
            None => CalloutView::MissingUser { message: MISSING_USER_MESSAGE },
            Some(user) => CalloutView::Panel {
                hangup_enabled: self.callout_state.hangup_enabled(),
                state_label: self.callout_state.to_string(),
                phone: user.phone.clone(),
                name: user.name.clone(),
            },
        }
    }

    /// Derive the inbound call panel descriptor, if an inbound call is pending.
    pub fn render_callin(&self) -> Option<CallinView> {
        self.callin_user.as_ref().map(|user| CallinView {
            key: user.phone.clone(),
            phone: user.phone.clone(),
            name: user.name.clone(),
        })
    }
}
