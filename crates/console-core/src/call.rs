//! Call state and call party types for the agent console
//!
//! This module mirrors the calling SDK's outbound call state machine. The
//! numeric values are fixed by the external SDK contract and must be
//! reproduced exactly for compatibility; the console never invents a
//! transition of its own, it only reflects what the SDK reports.

use serde::{Deserialize, Serialize};

/// Outbound call state as reported by the calling SDK
///
/// The discriminants are part of the SDK wire contract (`0..=8`, value `7`
/// is call setup failure and `8` is the pre-ring initiation phase). Use
/// [`CalloutState::from_code`] when decoding SDK payloads.
///
/// # Examples
///
/// ```rust
/// use leadcall_console_core::CalloutState;
///
/// let state = CalloutState::from_code(2).unwrap();
/// assert_eq!(state, CalloutState::Connecting);
/// assert!(state.hangup_enabled());
/// assert_eq!(state.to_string(), "Connecting");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CalloutState {
    /// Idle, no outbound call; call controls are hidden
    NotStart = 0,
    /// Outbound dialing in progress
    Calling = 1,
    /// Ringing at the callee / bridging
    Connecting = 2,
    /// Connected, media flowing
    Talking = 3,
    /// Agent ended the call (terminal, display only)
    HangupLocal = 4,
    /// Callee ended the call (terminal, display only)
    HangupRemote = 5,
    /// Callee did not pick up (terminal, display only)
    NoAnswer = 6,
    /// Call setup failed (terminal, display only)
    Failed = 7,
    /// Call initiation requested, pre-ring
    DialingInit = 8,
}

impl CalloutState {
    /// Decode a state from the SDK's numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CalloutState::NotStart),
            1 => Some(CalloutState::Calling),
            2 => Some(CalloutState::Connecting),
            3 => Some(CalloutState::Talking),
            4 => Some(CalloutState::HangupLocal),
            5 => Some(CalloutState::HangupRemote),
            6 => Some(CalloutState::NoAnswer),
            7 => Some(CalloutState::Failed),
            8 => Some(CalloutState::DialingInit),
            _ => None,
        }
    }

    /// The SDK's numeric code for this state
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Whether the hang-up control is rendered enabled in this state
    ///
    /// Compatibility behavior carried from the reference console: the
    /// button is enabled only during the dialing phase, not while
    /// `Talking`, even though hanging up a connected call works through
    /// the SDK. Preserved verbatim rather than "corrected".
    pub fn hangup_enabled(&self) -> bool {
        matches!(self, CalloutState::Calling | CalloutState::Connecting)
    }

    /// Check if the call has reached a terminal, display-only state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CalloutState::HangupLocal
                | CalloutState::HangupRemote
                | CalloutState::NoAnswer
                | CalloutState::Failed
        )
    }

    /// Check if an outbound call attempt is still in progress
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, CalloutState::NotStart) && !self.is_terminal()
    }
}

impl Default for CalloutState {
    fn default() -> Self {
        CalloutState::NotStart
    }
}

impl std::fmt::Display for CalloutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CalloutState::NotStart => "Idle",
            CalloutState::Calling => "Calling",
            CalloutState::Connecting => "Connecting",
            CalloutState::Talking => "Talking",
            CalloutState::HangupLocal => "Hung up",
            CalloutState::HangupRemote => "Remote party hung up",
            CalloutState::NoAnswer => "No answer",
            CalloutState::Failed => "Call failed",
            CalloutState::DialingInit => "Initiating call",
        };
        write!(f, "{}", label)
    }
}

/// The party on the other end of an active or incoming call
///
/// Exists only while an outbound call is active or an inbound call is
/// pending; the session state holds `None` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallUser {
    /// Display name of the call party
    pub name: String,
    /// Phone number; also the render key for inbound call panels
    pub phone: String,
    /// Region hint, when the SDK provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl CallUser {
    /// Create a call user without region information
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self { name: name.into(), phone: phone.into(), region: None }
    }

    /// Attach a region hint
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}
