//! OpenAI-compatible LLM relay
//!
//! The vendor agent (or any other caller) posts chat-completions requests to
//! the gateway, which forwards them to the configured upstream and pipes the
//! answer back, streamed or buffered.

pub mod relay;
pub mod sse;

use thiserror::Error;

pub use relay::{LlmRelay, RelayResponse};
pub use sse::SseDecoder;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Invalid completion request: {0}")]
    InvalidRequest(String),

    /// Upstream answered with a non-2xx status; relayed to the caller as-is
    #[error("LLM upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub type LlmResult<T> = Result<T, LlmError>;
