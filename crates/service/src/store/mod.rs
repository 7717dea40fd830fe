use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Trait abstraction for the box store behind `/store`.
/// Implementations must persist a mutation before returning from it.
#[async_trait]
pub trait BoxStore: Send + Sync {
    /// Whole root when `key` is `None`, the box value when present, `Value::Null` otherwise.
    async fn get(&self, key: Option<&str>) -> Value;
    /// Deep-merge `payload` into the root and persist.
    async fn merge(&self, payload: Map<String, Value>) -> Result<(), ServiceError>;
    /// Remove a box and persist; returns whether it existed.
    async fn delete_box(&self, key: &str) -> Result<bool, ServiceError>;
}
