use thiserror::Error;

/// Reasons an `/store` request is denied and re-challenged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("unknown, expired or already used nonce")]
    UnknownNonce,
    #[error("hash mismatch")]
    HashMismatch,
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::MissingHeader => 1001,
            AuthError::MalformedHeader => 1002,
            AuthError::UnknownNonce => 1003,
            AuthError::HashMismatch => 1004,
        }
    }
}
