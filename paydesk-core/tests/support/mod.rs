//! Shared fixtures for the database integration tests.
//!
//! Included via `#[path]` from several test binaries; not every binary
//! uses every helper.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use paydesk_core::decrypt::{AlertDecryptor, DecryptError, DecryptedAlert};
use paydesk_core::directory::DbSellerDirectory;
use paydesk_core::processors::{FanoutDispatcher, NotificationIngest};
use paydesk_core::push::{ConnectionRegistry, NotificationQueue};
use paydesk_sdk::objects::submit::SubmitNotification;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Insert one admin row and return its id.
pub async fn seed_admin(pool: &PgPool, name: &str) -> Result<Uuid> {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO admins (id, name, device_secret) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind("integration-secret")
        .execute(pool)
        .await?;
    Ok(id)
}

/// Insert one seller row under an admin and return its id.
pub async fn seed_seller(
    pool: &PgPool,
    admin_id: Uuid,
    display_name: &str,
    active: bool,
) -> Result<Uuid> {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO sellers (id, admin_id, display_name, active) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(admin_id)
        .bind(display_name)
        .bind(active)
        .execute(pool)
        .await?;
    Ok(id)
}

/// Decryptor stub with a fixed outcome.
pub struct StubDecryptor(std::result::Result<DecryptedAlert, String>);

impl StubDecryptor {
    /// Always decrypts to the given alert.
    pub fn ok(amount: &str, sender: &str, reference: &str) -> Arc<Self> {
        Arc::new(Self(Ok(DecryptedAlert {
            amount: amount.parse().expect("literal decimal"),
            sender_name: sender.to_string(),
            sender_phone: Some("+90 555 000 0001".to_string()),
            receiver_phone: None,
            transaction_id: reference.to_string(),
        })))
    }

    /// Always fails with the given reason.
    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self(Err(reason.to_string())))
    }
}

#[async_trait]
impl AlertDecryptor for StubDecryptor {
    async fn decrypt(
        &self,
        _payload: &str,
        _device_fingerprint: &str,
    ) -> std::result::Result<DecryptedAlert, DecryptError> {
        match &self.0 {
            Ok(alert) => Ok(alert.clone()),
            Err(reason) => Err(DecryptError::Rejected {
                reason: reason.clone(),
            }),
        }
    }
}

/// The pipeline wired the way the server wires it, minus HTTP.
pub struct TestStack {
    pub registry: Arc<ConnectionRegistry>,
    pub queue: Arc<NotificationQueue>,
    pub ingest: NotificationIngest,
}

pub fn build_stack(pool: PgPool, decryptor: Arc<dyn AlertDecryptor>) -> TestStack {
    let registry = Arc::new(ConnectionRegistry::new(Duration::from_secs(60)));
    let queue = Arc::new(NotificationQueue::new(Arc::clone(&registry), Duration::ZERO));
    let directory = Arc::new(DbSellerDirectory::new(pool.clone()));
    let dispatcher = FanoutDispatcher::new(pool.clone(), directory, Arc::clone(&queue));
    let ingest = NotificationIngest::new(pool, decryptor, dispatcher);
    TestStack {
        registry,
        queue,
        ingest,
    }
}

/// A well-formed submission stamped with the current time.
pub fn submit(admin_id: Uuid, dedup_hash: &str) -> SubmitNotification {
    SubmitNotification {
        admin_id,
        payload: "ZW5jcnlwdGVkLXBheWxvYWQ=".to_string(),
        device_fingerprint: "sm-a54/9f31".to_string(),
        event_timestamp: time::OffsetDateTime::now_utc().unix_timestamp(),
        dedup_hash: dedup_hash.to_string(),
    }
}
