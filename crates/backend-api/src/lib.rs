//! # Backend-API - CRM backend client for leadcall
//!
//! This crate provides the typed HTTP client for the two CRM backend
//! endpoints the agent console depends on: call-capability token issuance
//! and outbound call creation. All responses share the backend's
//! `{code, message, data}` envelope, where `code == 0` means success.
//!
//! The client never interprets call state; it only carries requests and
//! surfaces backend rejections. Call state is owned by the calling SDK and
//! reported through the console's adapter events.

pub mod client;
pub mod error;
pub mod types;

pub use client::BackendClient;
pub use error::{ApiError, Result};
pub use types::{
    ApiEnvelope, CreateCallData, CreateCallRequest, TokenData, TokenRequest,
};
