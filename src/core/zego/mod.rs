//! ZEGO AI-agent platform integration
//!
//! - `signature`: canonical query construction and HMAC-SHA256 request signing
//! - `client`: signed JSON POSTs against the vendor REST API
//! - `messages`: request/response payloads of the agent actions
//! - `agent`: agent registration and instance lifecycle
//! - `token`: version 04 RTC login tokens for browser clients

pub mod agent;
pub mod client;
pub mod messages;
pub mod signature;
pub mod token;

use thiserror::Error;

pub use agent::{AgentService, AgentSession};
pub use client::ZegoClient;
pub use signature::{SIGNATURE_VERSION, canonical_query, generate_nonce, sign, signed_query};
pub use token::{IssuedToken, TokenError, generate_token04};

/// Vendor code returned by `RegisterAgent` when the agent id is already taken
pub const AGENT_ALREADY_EXISTS: i64 = 410001008;

/// Errors produced while talking to the ZEGO REST API
#[derive(Debug, Error)]
pub enum ZegoError {
    /// The vendor accepted the request but answered with a non-zero code
    #[error("ZEGO API error {code}: {message}")]
    Api {
        code: i64,
        message: String,
        request_id: Option<String>,
    },

    /// Non-2xx HTTP status from the vendor
    #[error("ZEGO API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("ZEGO request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid ZEGO response: {0}")]
    InvalidResponse(String),

    #[error("Invalid ZEGO server secret")]
    InvalidSecret,
}

pub type ZegoResult<T> = Result<T, ZegoError>;
