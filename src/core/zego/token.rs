//! RTC login tokens (vendor token format version 04).
//!
//! Layout before base64, all integers big-endian:
//!
//! ```text
//! expire: i64 | iv_len: u16 | iv | ciphertext_len: u16 | ciphertext
//! ```
//!
//! The ciphertext is the JSON token info encrypted with AES-CBC/PKCS#7,
//! keyed by the server secret (16, 24 or 32 bytes selects AES-128/192/256).
//! The final token is `"04"` followed by the base64 text.

use aes::{Aes128, Aes192, Aes256};
use base64::{Engine, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOKEN_VERSION: &str = "04";
const IV_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("token lifetime must be positive, got {0}")]
    InvalidLifetime(i64),

    #[error("server secret must be 16, 24 or 32 bytes, got {0}")]
    InvalidSecretLength(usize),

    #[error("encrypted token payload too large")]
    PayloadTooLarge,

    #[error("failed to encode token info: {0}")]
    Encoding(String),
}

/// Plaintext carried inside the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub app_id: u32,
    pub user_id: String,
    pub nonce: i32,
    pub ctime: i64,
    pub expire: i64,
    pub payload: String,
}

/// A freshly generated token and the expiry sealed inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Unix seconds
    pub expire_at: i64,
}

/// Generate a token for `user_id` valid for `effective_seconds` from now
pub fn generate_token04(
    app_id: u32,
    user_id: &str,
    server_secret: &str,
    effective_seconds: i64,
    payload: &str,
) -> Result<IssuedToken, TokenError> {
    let random = uuid::Uuid::new_v4();
    let bytes = random.as_bytes();
    let nonce = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

    let iv_text = uuid::Uuid::new_v4().simple().to_string();
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&iv_text.as_bytes()[..IV_LEN]);

    let ctime = chrono::Utc::now().timestamp();
    let token = build_token04(
        app_id,
        user_id,
        server_secret,
        ctime,
        effective_seconds,
        nonce,
        &iv,
        payload,
    )?;
    Ok(IssuedToken {
        token,
        expire_at: ctime + effective_seconds,
    })
}

/// Deterministic token construction
#[allow(clippy::too_many_arguments)]
pub fn build_token04(
    app_id: u32,
    user_id: &str,
    server_secret: &str,
    ctime: i64,
    effective_seconds: i64,
    nonce: i32,
    iv: &[u8; IV_LEN],
    payload: &str,
) -> Result<String, TokenError> {
    if user_id.is_empty() {
        return Err(TokenError::EmptyUserId);
    }
    if effective_seconds <= 0 {
        return Err(TokenError::InvalidLifetime(effective_seconds));
    }

    let info = TokenInfo {
        app_id,
        user_id: user_id.to_string(),
        nonce,
        ctime,
        expire: ctime + effective_seconds,
        payload: payload.to_string(),
    };
    let plaintext =
        serde_json::to_vec(&info).map_err(|e| TokenError::Encoding(e.to_string()))?;

    let ciphertext = encrypt(server_secret.as_bytes(), iv, &plaintext)?;
    let ciphertext_len =
        u16::try_from(ciphertext.len()).map_err(|_| TokenError::PayloadTooLarge)?;

    let mut packed = Vec::with_capacity(8 + 2 + IV_LEN + 2 + ciphertext.len());
    packed.extend_from_slice(&info.expire.to_be_bytes());
    packed.extend_from_slice(&(IV_LEN as u16).to_be_bytes());
    packed.extend_from_slice(iv);
    packed.extend_from_slice(&ciphertext_len.to_be_bytes());
    packed.extend_from_slice(&ciphertext);

    Ok(format!("{TOKEN_VERSION}{}", STANDARD.encode(packed)))
}

fn encrypt(key: &[u8], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>, TokenError> {
    let invalid = |_| TokenError::InvalidSecretLength(key.len());
    let ciphertext = match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        n => return Err(TokenError::InvalidSecretLength(n)),
    };
    Ok(ciphertext)
}
