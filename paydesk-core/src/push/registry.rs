//! Seller connection registry.
//!
//! Maps each seller to at most one live push connection.  Registering a
//! second connection for the same seller supersedes the first: the new
//! sender takes the map slot and the old one is nudged with a
//! [`WsCloseCode::REPLACED`] error frame so its socket task can close.

use dashmap::DashMap;
use paydesk_sdk::objects::ws::{WsCloseCode, WsServerMessage};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::PushFrameSender;

/// One live push connection.
pub struct ConnectionHandle {
    /// The seller this connection belongs to.
    pub seller_id: Uuid,
    /// Identifier of this connection instance; a reconnect gets a new one.
    pub connection_id: Uuid,
    /// Channel to the socket task.
    sender: PushFrameSender,
    /// Unix timestamp of the last inbound activity.
    last_activity: AtomicI64,
}

impl ConnectionHandle {
    fn new(seller_id: Uuid, sender: PushFrameSender) -> Self {
        Self {
            seller_id,
            connection_id: Uuid::now_v7(),
            sender,
            last_activity: AtomicI64::new(unix_now()),
        }
    }

    /// Refresh the activity stamp.
    pub fn touch(&self) {
        self.last_activity.store(unix_now(), Ordering::Relaxed);
    }

    /// Unix timestamp of the last inbound activity.
    pub fn last_activity(&self) -> i64 {
        self.last_activity.load(Ordering::Relaxed)
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("seller_id", &self.seller_id)
            .field("connection_id", &self.connection_id)
            .field("channel_closed", &self.sender.is_closed())
            .field("last_activity", &self.last_activity())
            .finish()
    }
}

/// Why a push frame did not reach the seller.
#[derive(Debug, Error)]
pub enum SendError {
    /// The seller has no open push connection
    #[error("seller has no open push connection")]
    NotConnected,

    /// The connection's channel closed mid-send; the entry has been
    /// removed from the registry
    #[error("push channel closed")]
    ChannelClosed,
}

/// Registry of live seller push connections.
pub struct ConnectionRegistry {
    connections: DashMap<Uuid, Arc<ConnectionHandle>>,
    idle_timeout: Duration,
}

impl ConnectionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            connections: DashMap::new(),
            idle_timeout,
        }
    }

    /// Register a connection for a seller, superseding any existing one.
    ///
    /// The superseded handle gets a [`WsCloseCode::REPLACED`] error frame
    /// so its socket task closes itself; its later `unregister_if` is then
    /// a no-op because the slot already belongs to the new connection.
    pub fn register(&self, seller_id: Uuid, sender: PushFrameSender) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(seller_id, sender));
        if let Some(old) = self.connections.insert(seller_id, Arc::clone(&handle)) {
            debug!(%seller_id, old_connection = %old.connection_id, "replacing push connection");
            let _ = old.sender.try_send(WsServerMessage::Error {
                code: WsCloseCode::REPLACED,
                reason: "replaced by a newer connection".into(),
            });
        }
        handle
    }

    /// Remove a seller's connection unconditionally.
    pub fn unregister(&self, seller_id: Uuid) -> bool {
        self.connections.remove(&seller_id).is_some()
    }

    /// Remove a seller's connection only if it is still the one identified
    /// by `connection_id`.  Socket tasks use this on exit so a task that
    /// was superseded cannot evict its replacement.
    pub fn unregister_if(&self, seller_id: Uuid, connection_id: Uuid) -> bool {
        self.connections
            .remove_if(&seller_id, |_, handle| handle.connection_id == connection_id)
            .is_some()
    }

    /// Send one frame to a seller's connection.
    ///
    /// A closed channel removes the entry on the spot; delivery to the
    /// socket itself is the socket task's problem.
    pub async fn send(&self, seller_id: Uuid, frame: WsServerMessage) -> Result<(), SendError> {
        let Some(handle) = self
            .connections
            .get(&seller_id)
            .map(|entry| Arc::clone(entry.value()))
        else {
            return Err(SendError::NotConnected);
        };
        // The map guard is dropped above; never hold it across an await.
        if handle.sender.send(frame).await.is_err() {
            self.unregister_if(seller_id, handle.connection_id);
            return Err(SendError::ChannelClosed);
        }
        Ok(())
    }

    /// Refresh the activity stamp of a seller's current connection.
    pub fn touch(&self, seller_id: Uuid) {
        if let Some(handle) = self.connections.get(&seller_id) {
            handle.touch();
        }
    }

    /// Whether the seller currently has a registered connection.
    pub fn is_connected(&self, seller_id: Uuid) -> bool {
        self.connections.contains_key(&seller_id)
    }

    /// Number of registered connections.
    pub fn connected_count(&self) -> usize {
        self.connections.len()
    }

    /// Ids of the currently connected sellers, in no particular order.
    pub fn connected_sellers(&self) -> Vec<Uuid> {
        self.connections.iter().map(|entry| *entry.key()).collect()
    }

    /// Drop connections that are closed or idle past the cutoff.
    ///
    /// Returns how many entries were removed.
    pub fn purge_idle(&self, now: i64) -> usize {
        let cutoff = now - self.idle_timeout.as_secs() as i64;
        let before = self.connections.len();
        self.connections
            .retain(|_, handle| !handle.is_closed() && handle.last_activity() >= cutoff);
        before.saturating_sub(self.connections.len())
    }
}

/// Periodic reaper for dead push connections.
///
/// A socket task normally unregisters itself on exit; the sweeper catches
/// the rest (tasks that never ran their cleanup, clients that silently
/// vanished without closing the TCP stream).
pub struct ConnectionSweeper {
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl ConnectionSweeper {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        interval: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            registry,
            interval,
            shutdown_rx,
        }
    }

    /// Run the sweep loop until shutdown is signalled.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "connection sweeper started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("connection sweeper received shutdown signal");
                        break;
                    }
                }

                _ = tokio::time::sleep(self.interval) => {
                    let purged = self.registry.purge_idle(unix_now());
                    if purged > 0 {
                        warn!(purged, "purged dead push connections");
                    }
                }
            }
        }

        info!("connection sweeper shutdown complete");
    }
}

fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::events::push_frame_channel;

    fn registry() -> ConnectionRegistry {
        ConnectionRegistry::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn send_without_connection_errors() {
        let reg = registry();
        let result = reg.send(Uuid::now_v7(), WsServerMessage::Pong).await;
        assert!(matches!(result, Err(SendError::NotConnected)));
    }

    #[tokio::test]
    async fn registered_connection_receives_frames() {
        let reg = registry();
        let seller_id = Uuid::now_v7();
        let (tx, mut rx) = push_frame_channel();
        reg.register(seller_id, tx);

        reg.send(seller_id, WsServerMessage::Pong).await.unwrap();
        assert!(matches!(rx.recv().await, Some(WsServerMessage::Pong)));
    }

    #[tokio::test]
    async fn register_supersedes_previous_connection() {
        let reg = registry();
        let seller_id = Uuid::now_v7();
        let (tx1, mut rx1) = push_frame_channel();
        let first = reg.register(seller_id, tx1);
        let (tx2, mut rx2) = push_frame_channel();
        let second = reg.register(seller_id, tx2);

        assert_ne!(first.connection_id, second.connection_id);
        assert_eq!(reg.connected_count(), 1);

        // The superseded handle got the replacement signal.
        assert!(matches!(
            rx1.recv().await,
            Some(WsServerMessage::Error { code, .. }) if code == WsCloseCode::REPLACED
        ));

        // New frames go to the new connection.
        reg.send(seller_id, WsServerMessage::Pong).await.unwrap();
        assert!(matches!(rx2.recv().await, Some(WsServerMessage::Pong)));
    }

    #[tokio::test]
    async fn stale_unregister_leaves_newer_connection() {
        let reg = registry();
        let seller_id = Uuid::now_v7();
        let (tx1, _rx1) = push_frame_channel();
        let first = reg.register(seller_id, tx1);
        let (tx2, _rx2) = push_frame_channel();
        reg.register(seller_id, tx2);

        assert!(!reg.unregister_if(seller_id, first.connection_id));
        assert!(reg.is_connected(seller_id));
    }

    #[tokio::test]
    async fn send_on_closed_channel_unregisters() {
        let reg = registry();
        let seller_id = Uuid::now_v7();
        let (tx, rx) = push_frame_channel();
        reg.register(seller_id, tx);
        drop(rx);

        let result = reg.send(seller_id, WsServerMessage::Pong).await;
        assert!(matches!(result, Err(SendError::ChannelClosed)));
        assert!(!reg.is_connected(seller_id));
    }

    #[tokio::test]
    async fn purge_drops_idle_connections() {
        let reg = registry();
        let (tx1, _rx1) = push_frame_channel();
        reg.register(Uuid::now_v7(), tx1);
        let (tx2, _rx2) = push_frame_channel();
        reg.register(Uuid::now_v7(), tx2);

        assert_eq!(reg.purge_idle(unix_now()), 0);
        assert_eq!(reg.purge_idle(unix_now() + 120), 2);
        assert_eq!(reg.connected_count(), 0);
    }

    #[tokio::test]
    async fn purge_drops_closed_connections_regardless_of_age() {
        let reg = registry();
        let seller_id = Uuid::now_v7();
        let (tx, rx) = push_frame_channel();
        reg.register(seller_id, tx);
        drop(rx);

        assert_eq!(reg.purge_idle(unix_now()), 1);
        assert!(!reg.is_connected(seller_id));
    }

    #[tokio::test]
    async fn sweeper_stops_on_shutdown() {
        let reg = Arc::new(registry());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = ConnectionSweeper::new(Arc::clone(&reg), Duration::from_secs(3600), shutdown_rx);
        let handle = tokio::spawn(sweeper.run());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
