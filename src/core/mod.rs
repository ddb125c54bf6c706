pub mod history;
pub mod llm;
pub mod zego;

// Re-export commonly used types for convenience
pub use history::{
    ChatMessage, Conversation, ConversationSummary, HistoryError, HistoryResult, HistoryStore,
    MessageType, Sender,
};
pub use llm::{LlmError, LlmRelay, LlmResult, RelayResponse};
pub use zego::{AgentService, AgentSession, TokenError, ZegoClient, ZegoError, ZegoResult};
