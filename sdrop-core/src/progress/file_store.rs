use super::{ProgressError, ProgressStore};
use crate::chain::BlockHeight;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the height as a decimal number in `<dir>/<name>.block`.
///
/// Writes go to a temporary sibling first and are renamed into place so a
/// crash never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    path: PathBuf,
}

impl FileProgressStore {
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{name}.block")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProgressStore for FileProgressStore {
    async fn load(&self) -> Result<Option<BlockHeight>, ProgressError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed
            .parse::<BlockHeight>()
            .map(Some)
            .map_err(|e| ProgressError::Corrupt {
                content: trimmed.to_string(),
                reason: e.to_string(),
            })
    }

    async fn store(&self, height: BlockHeight) -> Result<(), ProgressError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.path.with_extension("block.tmp");
        tokio::fs::write(&temp_path, height.to_string()).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!(height, path = %self.path.display(), "Stored progress");
        Ok(())
    }
}
