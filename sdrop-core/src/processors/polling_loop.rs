//! PollingLoop.
//!
//! Walks finalized blocks in ascending order:
//! - Waits until `cursor + confirmations <= latest finalized height`
//! - Runs the [`EventProcessor`] on the block at the cursor
//! - Persists progress and advances the cursor on success
//! - Retries the same block after a failure, up to the retry limit
//!
//! Waiting for finality does not consume retries. Both the finality wait and
//! the post-failure pause race against the shutdown signal.

use super::event_processor::{EventProcessor, ProcessError};
use crate::chain::{BlockHeight, ChainClient, ChainError};
use crate::progress::ProgressStore;
use crate::utils::retry_budget::RetryBudget;
use kanau::processor::Processor;
use sdrop_sdk::config::ListenerConfig;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// A failure that consumed one retry.
#[derive(Debug, Error)]
pub enum LoopFailure {
    #[error("failed to fetch latest finalized height: {0}")]
    LatestHeight(#[source] ChainError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Fatal termination of the polling loop.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("reached retry limit of {retry_limit} at block {height}: {source}")]
    RetryLimitReached {
        height: BlockHeight,
        retry_limit: u32,
        #[source]
        source: LoopFailure,
    },
}

enum Step {
    Advanced,
    Waiting { latest: BlockHeight },
    Failed(LoopFailure),
}

pub struct PollingLoop<C, S> {
    processor: EventProcessor<C>,
    store: S,
    cursor: BlockHeight,
    confirmations: u64,
    poll_interval: Duration,
    budget: RetryBudget,
}

impl<C, S> PollingLoop<C, S>
where
    C: ChainClient,
    S: ProgressStore,
{
    pub fn new(
        processor: EventProcessor<C>,
        store: S,
        cursor: BlockHeight,
        config: &ListenerConfig,
    ) -> Self {
        Self {
            processor,
            store,
            cursor,
            confirmations: config.confirmations,
            poll_interval: config.poll_interval,
            budget: RetryBudget::new(config.retry_limit),
        }
    }

    /// Height of the next block to process.
    pub fn cursor(&self) -> BlockHeight {
        self.cursor
    }

    pub fn client(&self) -> &C {
        self.processor.client()
    }

    /// Run until shutdown is signaled or the retry budget runs out.
    ///
    /// Returns `Ok(())` on shutdown.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), PollError> {
        info!(
            cursor = self.cursor,
            confirmations = self.confirmations,
            retry_limit = self.budget.limit(),
            "PollingLoop started"
        );

        loop {
            if *shutdown_rx.borrow() {
                info!(cursor = self.cursor, "PollingLoop received shutdown signal");
                return Ok(());
            }

            match self.step().await {
                Step::Advanced => continue,
                Step::Waiting { latest } => {
                    debug!(cursor = self.cursor, latest, "Waiting for block to finalize");
                }
                Step::Failed(failure) => {
                    warn!(
                        height = self.cursor,
                        error = %failure,
                        remaining = self.budget.remaining().saturating_sub(1),
                        "Block polling failed, will retry"
                    );
                    if self.budget.consume() {
                        error!(
                            height = self.cursor,
                            error = %failure,
                            "PollingLoop reached retry limit"
                        );
                        return Err(PollError::RetryLimitReached {
                            height: self.cursor,
                            retry_limit: self.budget.limit(),
                            source: failure,
                        });
                    }
                }
            }

            if self.pause(&mut shutdown_rx).await {
                info!(cursor = self.cursor, "PollingLoop received shutdown signal");
                return Ok(());
            }
        }
    }

    async fn step(&mut self) -> Step {
        let latest = match self.processor.client().latest_finalized_height().await {
            Ok(latest) => latest,
            Err(e) => return Step::Failed(LoopFailure::LatestHeight(e)),
        };

        if self.cursor.saturating_add(self.confirmations) > latest {
            return Step::Waiting { latest };
        }

        match self.processor.process(self.cursor).await {
            Ok(report) => {
                if report.matched > 0 {
                    debug!(
                        height = report.height,
                        matched = report.matched,
                        dropped = report.dropped,
                        skipped = report.skipped,
                        "Processed bond events"
                    );
                }
                self.commit().await;
                Step::Advanced
            }
            Err(e) => Step::Failed(e.into()),
        }
    }

    /// Persist the processed height and move on. A failed write only costs
    /// a re-run of this block after a restart.
    async fn commit(&mut self) {
        if let Err(e) = self.store.store(self.cursor).await {
            error!(height = self.cursor, error = %e, "Failed to persist progress");
        }
        if self.cursor % 1000 == 0 {
            info!(height = self.cursor, "Have dealt block");
        } else if self.cursor % 100 == 0 {
            debug!(height = self.cursor, "Have dealt block");
        }
        self.budget.reset();
        self.cursor += 1;
    }

    /// Sleep for the poll interval. Returns `true` if shutdown was requested
    /// meanwhile, or the shutdown sender is gone.
    async fn pause(&self, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => changed.is_err() || *shutdown_rx.borrow(),

            _ = tokio::time::sleep(self.poll_interval) => false,
        }
    }
}
