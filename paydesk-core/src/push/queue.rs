//! Outbound notification queue.
//!
//! Fan-out enqueues one notification per target seller here instead of
//! writing to sockets directly.  Each seller has a buffer; every enqueue
//! (re)schedules a flush after the debounce window, superseding any flush
//! still waiting.  A buffer holding one item flushes as a
//! `PaymentNotification` frame, a larger one as a single
//! `GroupedPaymentNotification`.
//!
//! Delivery is fire-and-forget: a seller without a live connection loses
//! the frame (they catch up over the REST listing), and failures never
//! propagate back to ingest.

use dashmap::DashMap;
use paydesk_sdk::objects::payment::PaymentResponse;
use paydesk_sdk::objects::ws::WsServerMessage;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::push::registry::ConnectionRegistry;

#[derive(Default)]
struct SellerBuffer {
    items: Vec<PaymentResponse>,
    /// Bumped on every enqueue; a scheduled flush only drains the buffer
    /// when no later enqueue has superseded it.
    epoch: u64,
}

/// Per-seller buffering queue in front of the connection registry.
pub struct NotificationQueue {
    buffers: DashMap<Uuid, SellerBuffer>,
    registry: Arc<ConnectionRegistry>,
    debounce: Duration,
}

impl NotificationQueue {
    pub fn new(registry: Arc<ConnectionRegistry>, debounce: Duration) -> Self {
        Self {
            buffers: DashMap::new(),
            registry,
            debounce,
        }
    }

    /// Buffer one notification for a seller and schedule its flush.
    ///
    /// Returns immediately; the flush runs on its own task after the
    /// debounce window (right away when the debounce is zero).
    pub fn enqueue(self: &Arc<Self>, seller_id: Uuid, payment: PaymentResponse) {
        let epoch = {
            let mut buffer = self.buffers.entry(seller_id).or_default();
            buffer.items.push(payment);
            buffer.epoch += 1;
            buffer.epoch
        };

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            if !queue.debounce.is_zero() {
                tokio::time::sleep(queue.debounce).await;
            }
            queue.flush_epoch(seller_id, epoch).await;
        });
    }

    /// Drain and deliver a seller's buffer unconditionally.
    pub async fn flush(&self, seller_id: Uuid) {
        let drained = {
            let Some(mut buffer) = self.buffers.get_mut(&seller_id) else {
                return;
            };
            std::mem::take(&mut buffer.items)
        };
        self.deliver(seller_id, drained).await;
    }

    /// Number of notifications currently buffered for a seller.
    pub fn buffered_count(&self, seller_id: Uuid) -> usize {
        self.buffers
            .get(&seller_id)
            .map(|buffer| buffer.items.len())
            .unwrap_or(0)
    }

    async fn flush_epoch(&self, seller_id: Uuid, epoch: u64) {
        let drained = {
            let Some(mut buffer) = self.buffers.get_mut(&seller_id) else {
                return;
            };
            if buffer.epoch != epoch {
                // A later enqueue rescheduled this flush.
                return;
            }
            std::mem::take(&mut buffer.items)
        };
        // The shard lock is released before delivery awaits.
        self.deliver(seller_id, drained).await;
    }

    async fn deliver(&self, seller_id: Uuid, mut items: Vec<PaymentResponse>) {
        let frame = if items.len() > 1 {
            WsServerMessage::GroupedPaymentNotification {
                count: items.len() as u32,
                total_amount: items.iter().map(|p| p.amount).sum(),
                items,
            }
        } else if let Some(payment) = items.pop() {
            WsServerMessage::PaymentNotification { payment }
        } else {
            return;
        };

        if let Err(e) = self.registry.send(seller_id, frame).await {
            warn!(%seller_id, error = %e, "push delivery failed, dropping notification");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::events::push_frame_channel;
    use paydesk_sdk::objects::payment::PaymentStatus;
    use rust_decimal::Decimal;

    fn payment(seller_id: Uuid, amount: &str) -> PaymentResponse {
        PaymentResponse {
            payment_id: Uuid::now_v7(),
            admin_id: Uuid::now_v7(),
            seller_id,
            amount: amount.parse().unwrap(),
            sender_name: "Ayşe K.".to_string(),
            reference_code: "TXN-1".to_string(),
            status: PaymentStatus::Pending,
            claimed_by: None,
            rejected_by: None,
            rejection_reason: None,
            created_at: 0,
            confirmed_at: None,
            rejected_at: None,
        }
    }

    fn stack(debounce: Duration) -> (Arc<ConnectionRegistry>, Arc<NotificationQueue>) {
        let registry = Arc::new(ConnectionRegistry::new(Duration::from_secs(60)));
        let queue = Arc::new(NotificationQueue::new(Arc::clone(&registry), debounce));
        (registry, queue)
    }

    #[tokio::test]
    async fn single_item_flushes_as_individual_frame() {
        let (registry, queue) = stack(Duration::ZERO);
        let seller_id = Uuid::now_v7();
        let (tx, mut rx) = push_frame_channel();
        registry.register(seller_id, tx);

        queue.enqueue(seller_id, payment(seller_id, "10.00"));

        let frame = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert!(matches!(
            frame,
            Some(WsServerMessage::PaymentNotification { .. })
        ));
        assert_eq!(queue.buffered_count(seller_id), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_coalesces_into_grouped_frame() {
        let (registry, queue) = stack(Duration::from_millis(50));
        let seller_id = Uuid::now_v7();
        let (tx, mut rx) = push_frame_channel();
        registry.register(seller_id, tx);

        queue.enqueue(seller_id, payment(seller_id, "10.00"));
        queue.enqueue(seller_id, payment(seller_id, "20.50"));
        queue.enqueue(seller_id, payment(seller_id, "5.00"));

        match rx.recv().await {
            Some(WsServerMessage::GroupedPaymentNotification {
                count,
                total_amount,
                items,
            }) => {
                assert_eq!(count, 3);
                assert_eq!(total_amount, "35.50".parse::<Decimal>().unwrap());
                assert_eq!(items.len(), 3);
            }
            other => panic!("expected grouped frame, got {other:?}"),
        }

        // The two superseded flushes must not deliver anything again.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_windows_flush_independently() {
        let (registry, queue) = stack(Duration::from_millis(50));
        let seller_id = Uuid::now_v7();
        let (tx, mut rx) = push_frame_channel();
        registry.register(seller_id, tx);

        queue.enqueue(seller_id, payment(seller_id, "10.00"));
        assert!(matches!(
            rx.recv().await,
            Some(WsServerMessage::PaymentNotification { .. })
        ));

        queue.enqueue(seller_id, payment(seller_id, "20.00"));
        queue.enqueue(seller_id, payment(seller_id, "30.00"));
        match rx.recv().await {
            Some(WsServerMessage::GroupedPaymentNotification { count, .. }) => {
                assert_eq!(count, 2)
            }
            other => panic!("expected grouped frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delivery_without_connection_is_dropped() {
        let (_registry, queue) = stack(Duration::ZERO);
        let seller_id = Uuid::now_v7();

        queue.enqueue(seller_id, payment(seller_id, "10.00"));
        queue.flush(seller_id).await;

        assert_eq!(queue.buffered_count(seller_id), 0);
    }
}
