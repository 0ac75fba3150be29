//! HTTP client for the CRM backend
//!
//! Two endpoints are consumed by the agent console:
//!
//! 1. `POST voipcall_token/get` - issue a call-capability token for an
//!    (account_id, user_id) pair.
//! 2. `POST voipcall/create` - ask the backend to create an outbound call
//!    once the calling SDK has reported readiness.
//!
//! Both return the shared [`ApiEnvelope`](crate::types::ApiEnvelope); a
//! non-zero `code` is mapped to [`ApiError::Rejected`] so callers can
//! surface the backend's message verbatim.
//!
//! # Examples
//!
//! ```rust,no_run
//! use leadcall_backend_api::{BackendClient, TokenRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BackendClient::new("http://127.0.0.1:3000")?;
//! let token = client
//!     .fetch_token(&TokenRequest { account_id: 20458, user_id: 20458 })
//!     .await?;
//! println!("token: {}", token.token);
//! # Ok(())
//! # }
//! ```

use url::Url;

use crate::error::{ApiError, Result};
use crate::types::{
    ApiEnvelope, CreateCallData, CreateCallRequest, TokenData, TokenRequest,
};

/// Path of the token issuance endpoint, relative to the base URL
pub const TOKEN_PATH: &str = "voipcall_token/get";

/// Path of the call creation endpoint, relative to the base URL
pub const CREATE_CALL_PATH: &str = "voipcall/create";

/// Typed client for the CRM backend
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client against the given base URL.
    ///
    /// The base URL is the host the development proxy (or a real gateway)
    /// serves the `voipcall_token` and `voipcall` prefixes from.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::build(base_url.as_ref(), None)
    }

    /// Create a client that sends a custom `User-Agent` header.
    pub fn with_user_agent(base_url: impl AsRef<str>, user_agent: &str) -> Result<Self> {
        Self::build(base_url.as_ref(), Some(user_agent))
    }

    fn build(base_url: &str, user_agent: Option<&str>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL: {}", e)))?;
        let mut builder = reqwest::Client::builder();
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        let http = builder.build().map_err(ApiError::Transport)?;
        Ok(Self { http, base_url })
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Request a call-capability token for an (account_id, user_id) pair.
    ///
    /// # Errors
    ///
    /// * [`ApiError::Rejected`] - backend answered with a non-zero code
    /// * [`ApiError::Transport`] - network-level failure
    /// * [`ApiError::InvalidResponse`] - success envelope without payload
    pub async fn fetch_token(&self, request: &TokenRequest) -> Result<TokenData> {
        let data: TokenData = self.post(TOKEN_PATH, request).await?;
        tracing::debug!(request_id = %data.request_id, "token issued");
        Ok(data)
    }

    /// Ask the backend to create an outbound call.
    ///
    /// Must only be called after the calling SDK's readiness check passed;
    /// the backend side-channel does not drive call state.
    pub async fn create_call(&self, request: &CreateCallRequest) -> Result<CreateCallData> {
        let data: CreateCallData = self.post(CREATE_CALL_PATH, request).await?;
        tracing::debug!(
            request_id = %data.request_id,
            contact_id = %data.contact_id,
            "call creation accepted"
        );
        Ok(data)
    }

    /// POST a JSON body and unwrap the backend envelope.
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Config(format!("invalid endpoint path {}: {}", path, e)))?;

        let envelope: ApiEnvelope<T> = self
            .http
            .post(url)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if !envelope.is_success() {
            tracing::warn!(code = envelope.code, message = %envelope.message, path, "backend rejected request");
            return Err(ApiError::Rejected {
                code: envelope.code,
                message: envelope.message,
            });
        }

        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse(format!("{}: success envelope without data", path)))
    }
}
