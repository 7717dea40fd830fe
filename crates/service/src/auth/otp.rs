//! `OTP` authorization scheme codec.
//!
//! Request:  `Authorization: OTP nonce="<nonce>", hash="<hex>"`
//! Response: `WWW-Authenticate: OTP nonce="<nonce>"`
//!
//! where `hash = hex(sha256(nonce + ":" + secret))`.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const SCHEME: &str = "OTP";

/// Parameters carried by an `Authorization: OTP ...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCredentials<'a> {
    pub nonce: &'a str,
    pub hash: &'a str,
}

impl<'a> OtpCredentials<'a> {
    /// Parse the header value. Both parameters must be present in this order
    /// and consist of `[a-z0-9]+`; at least one space follows the scheme and
    /// optional spaces surround the comma.
    pub fn parse(header: &'a str) -> Option<Self> {
        let after_scheme = header.strip_prefix(SCHEME)?;
        let rest = after_scheme.trim_start();
        if rest.len() == after_scheme.len() {
            return None;
        }
        let (nonce, rest) = quoted_param(rest, "nonce")?;
        let rest = rest.trim_start().strip_prefix(',')?.trim_start();
        let (hash, rest) = quoted_param(rest, "hash")?;
        if !rest.is_empty() {
            return None;
        }
        Some(Self { nonce, hash })
    }
}

fn quoted_param<'a>(input: &'a str, name: &str) -> Option<(&'a str, &'a str)> {
    let rest = input.strip_prefix(name)?.strip_prefix("=\"")?;
    let end = rest.find('"')?;
    let value = &rest[..end];
    let valid = !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    valid.then(|| (value, &rest[end + 1..]))
}

/// `hex(sha256(nonce ":" secret))`
pub fn expected_hash(nonce: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison of the client hash against the expected one.
pub fn hash_matches(nonce: &str, secret: &str, client_hash: &str) -> bool {
    let expected = expected_hash(nonce, secret);
    expected.as_bytes().ct_eq(client_hash.as_bytes()).into()
}

/// Value for the `WWW-Authenticate` challenge header.
pub fn challenge_header(nonce: &str) -> String {
    format!("{SCHEME} nonce=\"{nonce}\"")
}

/// Value for the `Authorization` header a client sends for `nonce`.
pub fn authorization_header(nonce: &str, secret: &str) -> String {
    format!("{SCHEME} nonce=\"{nonce}\", hash=\"{}\"", expected_hash(nonce, secret))
}

/// Extract the nonce from a `WWW-Authenticate: OTP nonce="..."` value.
pub fn parse_challenge(header: &str) -> Option<&str> {
    let rest = header.strip_prefix(SCHEME)?.trim_start();
    let (nonce, rest) = quoted_param(rest, "nonce")?;
    rest.is_empty().then_some(nonce)
}
