//! Persistence backends for conversation history.
//!
//! `MemoryBackend` keeps nothing beyond the process lifetime. `FileBackend`
//! stores the whole history as one JSON array, the same blob a browser keeps
//! in local storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::types::Conversation;
use super::HistoryResult;

#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Load every stored conversation
    async fn load(&self) -> HistoryResult<Vec<Conversation>>;

    /// Replace the stored history with `conversations`
    async fn persist(&self, conversations: &[Conversation]) -> HistoryResult<()>;

    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackend;

#[async_trait]
impl HistoryBackend for MemoryBackend {
    async fn load(&self) -> HistoryResult<Vec<Conversation>> {
        Ok(Vec::new())
    }

    async fn persist(&self, _conversations: &[Conversation]) -> HistoryResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl HistoryBackend for FileBackend {
    async fn load(&self) -> HistoryResult<Vec<Conversation>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "History file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<Conversation>>(&contents) {
            Ok(conversations) => {
                debug!(
                    path = %self.path.display(),
                    count = conversations.len(),
                    "Loaded conversation history"
                );
                Ok(conversations)
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "History file is corrupt, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, conversations: &[Conversation]) -> HistoryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(conversations)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), count = conversations.len(), "Persisted conversation history");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_backend_is_empty() {
        let backend = MemoryBackend;
        backend
            .persist(&[Conversation::new(None, None)])
            .await
            .unwrap();
        assert!(backend.load().await.unwrap().is_empty());
        assert_eq!(backend.name(), "memory");
    }

    #[tokio::test]
    async fn test_file_backend_missing_file() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("history.json"));
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_backend_persist_and_load() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("history.json"));

        let conversation = Conversation::new(Some("Saved".to_string()), None);
        backend.persist(std::slice::from_ref(&conversation)).await.unwrap();

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, conversation.id);
        assert_eq!(loaded[0].title, "Saved");
        assert!(!dir.path().join("nested").join("history.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_backend_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();

        let backend = FileBackend::new(&path);
        assert!(backend.load().await.unwrap().is_empty());
    }
}
