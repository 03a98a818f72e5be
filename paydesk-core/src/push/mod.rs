//! In-memory push subsystem.
//!
//! The registry maps each seller to at most one live WebSocket connection;
//! the queue sits in front of it and coalesces notifications that land in
//! the same flush window.  Nothing here is durable: a seller who is
//! offline simply fetches missed rows over the REST listing.

pub mod queue;
pub mod registry;

pub use queue::NotificationQueue;
pub use registry::{ConnectionHandle, ConnectionRegistry, ConnectionSweeper, SendError};
