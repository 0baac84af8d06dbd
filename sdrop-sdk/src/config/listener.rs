use std::time::Duration;

/// Block polling parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// First height to process when no progress has been persisted.
    pub start_block: u64,
    /// Number of blocks that must follow a block before it is processed.
    pub confirmations: u64,
    /// Pause between polls while waiting for finality or after a failure.
    pub poll_interval: Duration,
    /// Consecutive failures tolerated before the loop gives up.
    pub retry_limit: u32,
}

impl ListenerConfig {
    pub const DEFAULT_CONFIRMATIONS: u64 = 3;
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(6);
    pub const DEFAULT_RETRY_LIMIT: u32 = 50;
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            start_block: 0,
            confirmations: Self::DEFAULT_CONFIRMATIONS,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            retry_limit: Self::DEFAULT_RETRY_LIMIT,
        }
    }
}
