use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{rngs::OsRng, RngCore};
use tokio::sync::Mutex;
use tracing::debug;

/// Default lifetime of an issued nonce.
pub const NONCE_TTL: Duration = Duration::from_secs(5 * 60);

const NONCE_BYTES: usize = 16;

/// Nonce -> expiry bookkeeping. Time is passed in so expiry can be tested
/// without sleeping.
#[derive(Debug)]
pub struct NonceTable {
    ttl: Duration,
    entries: HashMap<String, Instant>,
}

impl NonceTable {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    /// Generate a fresh hex nonce valid until `now + ttl`.
    ///
    /// Panics if the OS entropy source is unavailable.
    pub fn issue_at(&mut self, now: Instant) -> String {
        let mut bytes = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let nonce = hex::encode(bytes);
        self.entries.insert(nonce.clone(), now + self.ttl);
        nonce
    }

    /// Drop every entry whose expiry is at or before `now`.
    pub fn sweep_expired(&mut self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, expiry| *expiry > now);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "expired nonces swept");
        }
    }

    /// Remove the nonce; true if it was present.
    pub fn consume(&mut self, nonce: &str) -> bool {
        self.entries.remove(nonce).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared handle to the nonce table.
#[derive(Clone)]
pub struct NonceRegistry {
    table: Arc<Mutex<NonceTable>>,
}

impl NonceRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self { table: Arc::new(Mutex::new(NonceTable::new(ttl))) }
    }

    pub async fn issue(&self) -> String {
        self.table.lock().await.issue_at(Instant::now())
    }

    pub async fn sweep_expired(&self) {
        self.table.lock().await.sweep_expired(Instant::now());
    }

    pub async fn consume(&self, nonce: &str) -> bool {
        self.table.lock().await.consume(nonce)
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }
}

impl Default for NonceRegistry {
    fn default() -> Self {
        Self::new(NONCE_TTL)
    }
}
