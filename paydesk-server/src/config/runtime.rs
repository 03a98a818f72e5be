//! Runtime configuration re-exports and utilities.
//!
//! The actual config types are defined in `paydesk-core::config`.
//! This module re-exports them for convenience.

pub use paydesk_core::config::{
    AdminConfig, AuthConfig, DecryptConfig, PushConfig, ServerConfig, SharedConfig,
};
