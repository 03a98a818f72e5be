//! Push delivery tuning.

use std::time::Duration;

/// How long the outbound queue waits before flushing a seller's buffer.
/// Zero means every notification flushes as soon as it is enqueued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::ZERO;

/// How often the sweeper scans the registry for dead connections.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// How long a connection may stay silent before the sweeper drops it.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Push subsystem configuration.
///
/// Read once at startup when the registry, queue, and sweeper are built;
/// changing these requires a restart.
#[derive(Debug, Clone, Copy)]
pub struct PushConfig {
    /// Flush debounce for the outbound notification queue.
    pub debounce: Duration,
    /// Sweep interval for the connection sweeper.
    pub sweep_interval: Duration,
    /// Idle cutoff for open connections.
    pub idle_timeout: Duration,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}
