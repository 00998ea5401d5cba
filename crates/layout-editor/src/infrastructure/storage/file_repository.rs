//! [`LayoutRepository`] backed by a directory of `<id>.json` files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use layout_core::LayoutRecord;
use tracing::debug;
use uuid::Uuid;

use crate::application::save_layout::{LayoutId, LayoutRepository, RepositoryError};

/// Stores each layout as pretty-printed JSON in `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `id`.
    ///
    /// Ids are used as file names, so anything that could escape the
    /// directory is refused.
    fn path_for(&self, id: &LayoutId) -> Result<PathBuf, RepositoryError> {
        let raw = id.as_str();
        let usable = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !usable {
            return Err(RepositoryError::InvalidId(raw.to_string()));
        }
        Ok(self.dir.join(format!("{raw}.json")))
    }

    async fn write(&self, path: &Path, record: &LayoutRecord) -> Result<(), RepositoryError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RepositoryError::Storage(format!("{}: {e}", self.dir.display())))?;
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| RepositoryError::Malformed(e.to_string()))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| RepositoryError::Storage(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl LayoutRepository for JsonFileRepository {
    async fn create(&self, record: &LayoutRecord) -> Result<LayoutId, RepositoryError> {
        let id = LayoutId::new(Uuid::new_v4().simple().to_string());
        let path = self.path_for(&id)?;
        self.write(&path, record).await?;
        debug!("created {}", path.display());
        Ok(id)
    }

    async fn replace(&self, id: &LayoutId, record: &LayoutRecord) -> Result<(), RepositoryError> {
        let path = self.path_for(id)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        self.write(&path, record).await?;
        debug!("replaced {}", path.display());
        Ok(())
    }

    async fn fetch(&self, id: &LayoutId) -> Result<LayoutRecord, RepositoryError> {
        let path = self.path_for(id)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(id.clone()))
            }
            Err(e) => return Err(RepositoryError::Storage(format!("{}: {e}", path.display()))),
        };
        serde_json::from_str(&json).map_err(|e| RepositoryError::Malformed(e.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
