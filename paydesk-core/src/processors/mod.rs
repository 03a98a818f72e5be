//! Pipeline processors.
//!
//! Ingest validates and records an incoming notification event, then hands
//! it to the dispatcher, which fans one payment row out per active seller
//! and enqueues the pushes.

pub mod dispatcher;
pub mod ingest;

pub use dispatcher::{DispatchError, FanoutDispatcher, FanoutReceipt};
pub use ingest::{IngestError, MAX_EVENT_SKEW_SECS, NotificationIngest};
