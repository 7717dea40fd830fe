//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server crate prepares the store
//! directory without knowing its layout.

use std::path::Path;

use crate::storage::json_tree_store::STORE_DIR;

/// Ensure `<storage_root>/storeroom` exists; only warns on failure.
pub async fn ensure_store_dir(storage_root: &Path) -> bool {
    common::env::ensure_data_dir(&storage_root.join(STORE_DIR)).await
}
