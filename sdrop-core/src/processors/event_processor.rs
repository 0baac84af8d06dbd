//! EventProcessor.
//!
//! Handles one block at a time:
//! - Fetching the block's events from the chain client
//! - Decoding every `ExecuteBondAndSwap` event
//! - Asking the [`DropPolicy`] for a decision and submitting drops
//!
//! Any failure fails the whole block. The polling loop then retries the
//! block from its first event, so a drop submitted before the failure is
//! evaluated again on the retry. The balance guard usually turns that second
//! evaluation into a skip, but it is not a guarantee.

use super::drop_policy::{DropDecision, DropPolicy, SkipReason};
use crate::chain::{BlockHeight, ChainClient, ChainError};
use crate::events::{BondSwapEvent, DecodeError};
use crate::utils::units::format_tokens;
use kanau::processor::Processor;
use sdrop_sdk::objects::AccountId;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Errors that fail a block.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to fetch events of block {height}: {source}")]
    FetchEvents {
        height: BlockHeight,
        #[source]
        source: ChainError,
    },

    #[error("failed to decode event #{index} of block {height}: {source}")]
    Decode {
        height: BlockHeight,
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("failed to query balance of {account}: {source}")]
    Balance {
        account: AccountId,
        #[source]
        source: ChainError,
    },

    #[error("failed to transfer drop to {account}: {source}")]
    Transfer {
        account: AccountId,
        #[source]
        source: ChainError,
    },
}

/// Outcome of a successfully processed block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockReport {
    pub height: BlockHeight,
    /// Number of `ExecuteBondAndSwap` events in the block.
    pub matched: usize,
    pub dropped: usize,
    pub skipped: usize,
}

/// Processes the events of a single block.
pub struct EventProcessor<C> {
    client: C,
    policy: DropPolicy,
}

impl<C: ChainClient> EventProcessor<C> {
    pub fn new(client: C, policy: DropPolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn handle_event(
        &self,
        event: &BondSwapEvent,
        report: &mut BlockReport,
    ) -> Result<(), ProcessError> {
        let decision = self
            .policy
            .evaluate(&self.client, event)
            .await
            .map_err(|source| ProcessError::Balance {
                account: event.account_id,
                source,
            })?;

        match decision {
            DropDecision::Skip(reason) => {
                report.skipped += 1;
                match reason {
                    SkipReason::UnsupportedSymbol => warn!(
                        account = %event.account_id,
                        symbol = %event.symbol,
                        "Liquidity bond for a symbol without drops, skipping"
                    ),
                    SkipReason::BelowThreshold => debug!(
                        account = %event.account_id,
                        symbol = %event.symbol,
                        amount = %event.amount,
                        "Bond amount below threshold, skipping"
                    ),
                    SkipReason::AlreadyFunded { balance } => warn!(
                        account = %event.account_id,
                        symbol = %event.symbol,
                        amount = %event.amount,
                        balance = %format_tokens(balance),
                        "Account already holds a balance, skipping"
                    ),
                }
            }
            DropDecision::Drop { amount } => {
                self.client
                    .transfer(&event.account_id, amount)
                    .await
                    .map_err(|source| ProcessError::Transfer {
                        account: event.account_id,
                        source,
                    })?;
                report.dropped += 1;
                info!(
                    account = %event.account_id,
                    symbol = %event.symbol,
                    bond_id = %event.bond_id,
                    amount = %event.amount,
                    drop_amount = %amount,
                    drop_tokens = %format_tokens(amount),
                    "Drop transferred"
                );
            }
        }

        Ok(())
    }
}

impl<C: ChainClient> Processor<BlockHeight> for EventProcessor<C> {
    type Output = BlockReport;
    type Error = ProcessError;

    async fn process(&self, height: BlockHeight) -> Result<BlockReport, ProcessError> {
        if height % 100 == 0 {
            debug!(height, "Processing block events");
        }

        let events = self
            .client
            .block_events(height)
            .await
            .map_err(|source| ProcessError::FetchEvents { height, source })?;

        let mut report = BlockReport {
            height,
            ..BlockReport::default()
        };

        for (index, raw) in events.iter().enumerate() {
            if !BondSwapEvent::matches(raw) {
                continue;
            }
            trace!(height, index, "Handling ExecuteBondAndSwap");
            report.matched += 1;

            let event = BondSwapEvent::decode(raw).map_err(|source| ProcessError::Decode {
                height,
                index,
                source,
            })?;
            self.handle_event(&event, &mut report).await?;
        }

        Ok(report)
    }
}
