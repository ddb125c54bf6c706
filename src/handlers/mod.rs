//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `agent` - Agent instance lifecycle (start, send message, stop)
//! - `token` - RTC login tokens for browser clients
//! - `llm` - OpenAI-compatible completion relay used by the agent
//! - `conversations` - Conversation history

pub mod agent;
pub mod api;
pub mod conversations;
pub mod llm;
pub mod token;

/// Trimmed value of a required string field, or a 400 naming the field
pub(crate) fn required<'a>(
    value: &'a str,
    field: &str,
) -> crate::errors::app_error::AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::errors::app_error::AppError::bad_request(format!(
            "{field} is required"
        )));
    }
    Ok(trimmed)
}
