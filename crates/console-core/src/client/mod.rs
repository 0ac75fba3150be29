//! High-level console management
//!
//! This module contains the [`ConsoleManager`], which wires the adapter,
//! the backend client, the call-session view model and the event system
//! into one coordination point for UI layers, plus its configuration.

pub mod config;
pub mod manager;

pub use config::ConsoleConfig;
pub use manager::{ConsoleManager, SessionCredentials};
