use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::backend::{FileBackend, HistoryBackend, MemoryBackend};
use super::ledger::ConversationLog;
use super::types::{ChatMessage, Conversation, ConversationSummary};
use super::HistoryResult;
use crate::config::ServerConfig;

/// Shared, persisted conversation history
///
/// Every mutation is staged on a copy of the log and written through to the
/// backend while the lock is held. A failed write leaves the log untouched.
pub struct HistoryStore {
    log: Mutex<ConversationLog>,
    backend: Arc<dyn HistoryBackend>,
}

impl HistoryStore {
    /// Load existing history from `backend`
    pub async fn new(
        backend: Arc<dyn HistoryBackend>,
        max_conversations: usize,
    ) -> HistoryResult<Self> {
        let conversations = backend.load().await?;
        info!(
            backend = backend.name(),
            count = conversations.len(),
            max_conversations,
            "Conversation history ready"
        );
        Ok(Self {
            log: Mutex::new(ConversationLog::new(conversations, max_conversations)),
            backend,
        })
    }

    /// File-backed store when `history_path` is configured, in-memory otherwise
    pub async fn from_config(config: &ServerConfig) -> HistoryResult<Self> {
        let backend: Arc<dyn HistoryBackend> = match &config.history_path {
            Some(path) => Arc::new(FileBackend::new(path)),
            None => Arc::new(MemoryBackend),
        };
        Self::new(backend, config.history_max_conversations).await
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn list(&self) -> Vec<ConversationSummary> {
        self.log.lock().await.list()
    }

    pub async fn get(&self, id: &str) -> HistoryResult<Conversation> {
        self.log.lock().await.get(id).cloned()
    }

    /// Apply `change` to a copy of the log and keep it only once persisted
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut ConversationLog) -> HistoryResult<T>,
    ) -> HistoryResult<T> {
        let mut log = self.log.lock().await;
        let mut next = log.clone();
        let value = change(&mut next)?;
        self.backend.persist(next.conversations()).await?;
        *log = next;
        Ok(value)
    }

    pub async fn create(
        &self,
        title: Option<String>,
        agent_instance_id: Option<String>,
    ) -> HistoryResult<Conversation> {
        let (conversation, evicted) = self
            .commit(|log| Ok(log.create(title, agent_instance_id)))
            .await?;
        if let Some(evicted) = evicted {
            debug!(conversation_id = %evicted, "Evicted stalest conversation");
        }
        Ok(conversation)
    }

    pub async fn upsert_message(
        &self,
        conversation_id: &str,
        message: ChatMessage,
    ) -> HistoryResult<Conversation> {
        self.commit(|log| log.upsert_message(conversation_id, message))
            .await
    }

    pub async fn rename(&self, conversation_id: &str, title: &str) -> HistoryResult<Conversation> {
        self.commit(|log| log.rename(conversation_id, title)).await
    }

    pub async fn attach_agent_instance(
        &self,
        conversation_id: &str,
        agent_instance_id: &str,
    ) -> HistoryResult<Conversation> {
        self.commit(|log| log.attach_agent_instance(conversation_id, agent_instance_id))
            .await
    }

    pub async fn delete(&self, conversation_id: &str) -> HistoryResult<()> {
        self.commit(|log| log.delete(conversation_id)).await
    }

    pub async fn clear(&self) -> HistoryResult<()> {
        self.commit(|log| {
            log.clear();
            Ok(())
        })
        .await
    }

    pub async fn len(&self) -> usize {
        self.log.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.log.lock().await.is_empty()
    }
}
