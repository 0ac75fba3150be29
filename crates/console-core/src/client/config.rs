//! Configuration for the console manager

use serde::{Deserialize, Serialize};

/// Configuration for a [`ConsoleManager`](crate::client::ConsoleManager)
///
/// # Examples
///
/// ```rust
/// use leadcall_console_core::ConsoleConfig;
///
/// let config = ConsoleConfig::new("http://127.0.0.1:3000")
///     .with_account_id(20458)
///     .with_user_id(20458);
///
/// assert_eq!(config.account_id, 20458);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL the backend's `voipcall_token` and `voipcall` prefixes are
    /// served from (the development proxy, or a real gateway)
    pub backend_base_url: String,

    /// Advertiser account id used for token acquisition
    pub account_id: u64,

    /// Agent user id used for token acquisition and call creation
    pub user_id: u64,

    /// `User-Agent` header sent on backend requests
    pub user_agent: String,
}

impl ConsoleConfig {
    /// Create a configuration against the given backend base URL
    ///
    /// Account and user ids default to the reference demo pair (20458).
    pub fn new(backend_base_url: impl Into<String>) -> Self {
        Self {
            backend_base_url: backend_base_url.into(),
            account_id: 20458,
            user_id: 20458,
            user_agent: format!("leadcall-console/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the advertiser account id
    pub fn with_account_id(mut self, account_id: u64) -> Self {
        self.account_id = account_id;
        self
    }

    /// Set the agent user id
    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Set the `User-Agent` header sent on backend requests
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
