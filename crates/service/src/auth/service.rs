use std::time::Duration;

use common::observability::{AUTH_CHALLENGES_TOTAL, AUTH_SUCCESSES_TOTAL};
use tracing::debug;

use super::errors::AuthError;
use super::nonce::NonceRegistry;
use super::otp::{self, OtpCredentials};

/// Challenge/response verifier for the `OTP` scheme.
///
/// Holds the shared secret and the nonce registry. Without a secret every
/// request is let through.
#[derive(Clone)]
pub struct OtpAuthenticator {
    secret: Option<String>,
    nonces: NonceRegistry,
}

impl OtpAuthenticator {
    pub fn new(secret: Option<String>, nonce_ttl: Duration) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            nonces: NonceRegistry::new(nonce_ttl),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn nonces(&self) -> &NonceRegistry {
        &self.nonces
    }

    /// Verify an `Authorization` header value. Any nonce named by a
    /// well-formed header is consumed, whatever the outcome.
    pub async fn verify(&self, header: Option<&str>) -> Result<(), AuthError> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(());
        };

        self.nonces.sweep_expired().await;

        let header = header.ok_or(AuthError::MissingHeader)?;
        let creds = OtpCredentials::parse(header).ok_or(AuthError::MalformedHeader)?;

        if !self.nonces.consume(creds.nonce).await {
            return Err(AuthError::UnknownNonce);
        }
        if !otp::hash_matches(creds.nonce, secret, creds.hash) {
            return Err(AuthError::HashMismatch);
        }

        AUTH_SUCCESSES_TOTAL.inc();
        Ok(())
    }

    /// Issue a fresh nonce and return the `WWW-Authenticate` header value.
    pub async fn challenge(&self) -> String {
        let nonce = self.nonces.issue().await;
        AUTH_CHALLENGES_TOTAL.inc();
        debug!("issued OTP challenge");
        otp::challenge_header(&nonce)
    }
}
