#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod decrypt;
pub mod directory;
pub mod entities;
pub mod events;
pub mod framework;
pub mod processors;
pub mod push;

/// Workspace migrations, exposed for `#[sqlx::test(migrator = …)]` and the
/// server's `--migrate` flag.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../migrations");
