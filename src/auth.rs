//! Request authentication context and API secret matching

use subtle::ConstantTimeEq;

use crate::config::AuthApiSecret;

/// Identity attached to every request that passed the auth middleware
///
/// `id` is the id of the matching API secret, or `None` when authentication
/// is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auth {
    pub id: Option<String>,
}

impl Auth {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Compare two secrets in constant time
pub fn secrets_match(candidate: &str, expected: &str) -> bool {
    candidate.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Find the id of the API secret matching `token`
///
/// Every configured secret is compared so the timing does not reveal which
/// entry matched.
pub fn match_api_secret_id(token: &str, secrets: &[AuthApiSecret]) -> Option<String> {
    let mut matched = None;
    for entry in secrets {
        if secrets_match(token, &entry.secret) && matched.is_none() {
            matched = Some(entry.id.clone());
        }
    }
    matched
}
