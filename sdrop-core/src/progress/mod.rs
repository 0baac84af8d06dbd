//! Persistence of the last processed block height.

mod file_store;

pub use file_store::FileProgressStore;

use crate::chain::BlockHeight;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while loading or storing progress.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt progress record {content:?}: {reason}")]
    Corrupt { content: String, reason: String },
}

/// Durable record of the last fully processed block.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Last stored height, or `None` if nothing was stored yet.
    async fn load(&self) -> Result<Option<BlockHeight>, ProgressError>;

    /// Record `height` as fully processed.
    async fn store(&self, height: BlockHeight) -> Result<(), ProgressError>;
}

#[async_trait]
impl<S: ProgressStore + ?Sized> ProgressStore for Arc<S> {
    async fn load(&self) -> Result<Option<BlockHeight>, ProgressError> {
        (**self).load().await
    }

    async fn store(&self, height: BlockHeight) -> Result<(), ProgressError> {
        (**self).store(height).await
    }
}
