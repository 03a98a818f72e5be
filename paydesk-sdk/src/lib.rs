//! Shared types and clients for the Paydesk APIs.
//!
//! This crate holds everything a Paydesk integration needs without pulling
//! in the server: request/response DTOs, WebSocket frame types, the HMAC
//! signature scheme, and the seller bearer-token format. Enable the
//! `client` feature for typed HTTP/WebSocket clients built on `reqwest`
//! and `tokio-tungstenite`.

#![forbid(unsafe_code)]

pub mod objects;
pub mod signature;
pub mod token;

#[cfg(feature = "client")]
pub mod client;
