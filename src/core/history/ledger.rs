//! In-memory conversation bookkeeping.

use chrono::Utc;

use super::types::{ChatMessage, Conversation, ConversationSummary, DEFAULT_TITLE, Sender, derive_title};
use super::{HistoryError, HistoryResult};

/// Ordered conversations with a capacity limit
///
/// Conversations are kept in creation order; listing sorts by last update.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    conversations: Vec<Conversation>,
    max_conversations: usize,
}

impl ConversationLog {
    /// Wrap loaded conversations, trimming to capacity
    pub fn new(conversations: Vec<Conversation>, max_conversations: usize) -> Self {
        let mut log = Self {
            conversations,
            max_conversations: max_conversations.max(1),
        };
        while log.conversations.len() > log.max_conversations {
            log.evict_oldest();
        }
        log
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Summaries, most recently updated first
    pub fn list(&self) -> Vec<ConversationSummary> {
        let mut summaries: Vec<_> = self.conversations.iter().map(Conversation::summary).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    pub fn get(&self, id: &str) -> HistoryResult<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> HistoryResult<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))
    }

    /// Start a new conversation, evicting the stalest one when full
    ///
    /// Returns the new conversation and the id of the evicted one, if any.
    pub fn create(
        &mut self,
        title: Option<String>,
        agent_instance_id: Option<String>,
    ) -> (Conversation, Option<String>) {
        let evicted = if self.conversations.len() >= self.max_conversations {
            self.evict_oldest()
        } else {
            None
        };

        let conversation = Conversation::new(title, agent_instance_id);
        self.conversations.push(conversation.clone());
        (conversation, evicted)
    }

    /// Insert a message, or replace the content of the message with the same id
    ///
    /// The first user message names a conversation that still has the default title.
    pub fn upsert_message(
        &mut self,
        conversation_id: &str,
        message: ChatMessage,
    ) -> HistoryResult<Conversation> {
        if message.id.trim().is_empty() {
            return Err(HistoryError::InvalidMessage(
                "message id must not be empty".to_string(),
            ));
        }

        let conversation = self.get_mut(conversation_id)?;

        match conversation.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => {
                existing.content = message.content;
                existing.message_type = message.message_type;
            }
            None => {
                if message.sender == Sender::User
                    && conversation.title == DEFAULT_TITLE
                    && !message.content.trim().is_empty()
                {
                    conversation.title = derive_title(&message.content);
                }
                conversation.messages.push(message);
            }
        }

        conversation.updated_at = Utc::now();
        Ok(conversation.clone())
    }

    pub fn rename(&mut self, conversation_id: &str, title: &str) -> HistoryResult<Conversation> {
        let title = title.trim();
        if title.is_empty() {
            return Err(HistoryError::InvalidMessage(
                "title must not be empty".to_string(),
            ));
        }
        let conversation = self.get_mut(conversation_id)?;
        conversation.title = title.to_string();
        conversation.updated_at = Utc::now();
        Ok(conversation.clone())
    }

    /// Bind a conversation to the agent instance answering in it
    pub fn attach_agent_instance(
        &mut self,
        conversation_id: &str,
        agent_instance_id: &str,
    ) -> HistoryResult<Conversation> {
        let conversation = self.get_mut(conversation_id)?;
        conversation.agent_instance_id = Some(agent_instance_id.to_string());
        conversation.updated_at = Utc::now();
        Ok(conversation.clone())
    }

    pub fn delete(&mut self, conversation_id: &str) -> HistoryResult<()> {
        let index = self
            .conversations
            .iter()
            .position(|c| c.id == conversation_id)
            .ok_or_else(|| HistoryError::NotFound(conversation_id.to_string()))?;
        self.conversations.remove(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let index = self
            .conversations
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.updated_at)
            .map(|(i, _)| i)?;
        Some(self.conversations.remove(index).id)
    }
}
