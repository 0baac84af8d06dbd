//! Lifecycle of the drop service.
//!
//! [`DropService`] validates its inputs once, then runs a [`PollingLoop`] as
//! a background task. The owner keeps two handles: [`DropService::stop`] to
//! request a cooperative shutdown, and the [`FatalErrorReceiver`] returned by
//! [`DropService::start`], which yields at most one error if the loop gives
//! up.

use crate::chain::{BlockHeight, ChainClient, ChainError};
use crate::config::{ConfigError, DropTable, validate_listener};
use crate::processors::{DropPolicy, EventProcessor, PollError, PollingLoop};
use crate::progress::{ProgressError, ProgressStore};
use sdrop_sdk::config::ListenerConfig;
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Delivers the fatal error of a failed polling loop.
///
/// Resolves with `Err(RecvError)` if the loop stopped without failing.
pub type FatalErrorReceiver = oneshot::Receiver<PollError>;

/// Errors that prevent the service from starting.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load progress: {0}")]
    Progress(#[from] ProgressError),

    #[error("failed to query chain: {0}")]
    Chain(#[from] ChainError),

    #[error("starting block ({start}) is greater than latest known block ({latest})")]
    StartAheadOfChain {
        start: BlockHeight,
        latest: BlockHeight,
    },

    #[error("service already started")]
    AlreadyStarted,
}

/// First height to process given the configured start and stored progress.
pub fn start_cursor(start_block: BlockHeight, stored: Option<BlockHeight>) -> BlockHeight {
    match stored {
        Some(height) => start_block.max(height.saturating_add(1)),
        None => start_block,
    }
}

pub struct DropService<C, S> {
    polling: Option<PollingLoop<C, S>>,
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl<C, S> DropService<C, S>
where
    C: ChainClient + 'static,
    S: ProgressStore + 'static,
{
    /// Validate the configuration and restore the cursor from `store`.
    pub async fn initialize(
        config: &ListenerConfig,
        drops: DropTable,
        client: C,
        store: S,
    ) -> Result<Self, StartError> {
        validate_listener(config)?;

        let stored = store.load().await?;
        let cursor = start_cursor(config.start_block, stored);
        info!(
            start_block = config.start_block,
            stored = ?stored,
            cursor,
            symbols = drops.len(),
            "DropService initialized"
        );

        let processor = EventProcessor::new(client, DropPolicy::new(drops));
        let polling = PollingLoop::new(processor, store, cursor, config);
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            polling: Some(polling),
            shutdown_tx,
            handle: None,
        })
    }

    /// Cursor the loop will start from, if it has not started yet.
    pub fn cursor(&self) -> Option<BlockHeight> {
        self.polling.as_ref().map(PollingLoop::cursor)
    }

    /// Launch the polling loop in the background and return immediately.
    ///
    /// Fails if the starting block is ahead of the chain. On failure the
    /// service stays startable.
    pub async fn start(&mut self) -> Result<FatalErrorReceiver, StartError> {
        let Some(polling) = self.polling.as_ref() else {
            return Err(StartError::AlreadyStarted);
        };

        let latest = polling.client().latest_finalized_height().await?;
        let start = polling.cursor();
        if latest < start {
            return Err(StartError::StartAheadOfChain { start, latest });
        }

        let Some(polling) = self.polling.take() else {
            return Err(StartError::AlreadyStarted);
        };
        let (fatal_tx, fatal_rx) = oneshot::channel();
        let shutdown_rx = self.shutdown_tx.subscribe();

        self.handle = Some(tokio::spawn(async move {
            if let Err(e) = polling.run(shutdown_rx).await {
                error!(error = %e, "Polling blocks failed");
                let _ = fatal_tx.send(e);
            }
        }));

        info!(start, latest, "DropService started");
        Ok(fatal_rx)
    }

    /// Request shutdown. Does not wait for the loop to exit.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Wait for the background loop to exit.
    pub async fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "Polling task panicked or was aborted");
            }
        }
    }
}
