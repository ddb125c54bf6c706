//! Conversation history
//!
//! Mirrors what the browser client keeps in local storage: an ordered list of
//! conversations, each holding the chat messages shown in the UI. The
//! bookkeeping lives in [`ConversationLog`]; [`HistoryStore`] adds locking and
//! persistence through a [`HistoryBackend`].

pub mod backend;
pub mod ledger;
pub mod store;
pub mod types;

use thiserror::Error;

pub use backend::{FileBackend, HistoryBackend, MemoryBackend};
pub use ledger::ConversationLog;
pub use store::HistoryStore;
pub use types::{ChatMessage, Conversation, ConversationSummary, MessageType, Sender};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("History storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type HistoryResult<T> = Result<T, HistoryError>;
