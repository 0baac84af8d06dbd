//! The chain client seam.
//!
//! Connection setup, signing and wire decoding belong to the implementor;
//! the polling loop only sees these four operations.

use async_trait::async_trait;
use sdrop_sdk::objects::{AccountId, RawEvent};
use std::sync::Arc;
use thiserror::Error;

/// Height of a block.
pub type BlockHeight = u64;

/// Balance in base units.
pub type Balance = u128;

/// Errors reported by a [`ChainClient`].
#[derive(Debug, Error)]
pub enum ChainError {
    /// The account has no record on chain yet.
    #[error("account {0} not found on chain")]
    AccountNotFound(AccountId),

    /// The node could not be reached or the request timed out.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with an error.
    #[error("rpc error: {message}")]
    Rpc { message: String },

    /// The node answered with something we could not interpret.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A submitted transfer was rejected.
    #[error("transfer rejected: {0}")]
    TransferRejected(String),
}

impl ChainError {
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, ChainError::AccountNotFound(_))
    }
}

/// Read and submit access to a chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Height of the most recent finalized block.
    async fn latest_finalized_height(&self) -> Result<BlockHeight, ChainError>;

    /// All events of the block at `height`, in emission order.
    async fn block_events(&self, height: BlockHeight) -> Result<Vec<RawEvent>, ChainError>;

    /// Free balance of `account`.
    ///
    /// Returns [`ChainError::AccountNotFound`] when the chain has no record
    /// of the account.
    async fn free_balance(&self, account: &AccountId) -> Result<Balance, ChainError>;

    /// Submit a single transfer of `amount` to `dest` and wait for inclusion.
    async fn transfer(&self, dest: &AccountId, amount: Balance) -> Result<(), ChainError>;
}

#[async_trait]
impl<C: ChainClient + ?Sized> ChainClient for Arc<C> {
    async fn latest_finalized_height(&self) -> Result<BlockHeight, ChainError> {
        (**self).latest_finalized_height().await
    }

    async fn block_events(&self, height: BlockHeight) -> Result<Vec<RawEvent>, ChainError> {
        (**self).block_events(height).await
    }

    async fn free_balance(&self, account: &AccountId) -> Result<Balance, ChainError> {
        (**self).free_balance(account).await
    }

    async fn transfer(&self, dest: &AccountId, amount: Balance) -> Result<(), ChainError> {
        (**self).transfer(dest, amount).await
    }
}
