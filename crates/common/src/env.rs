//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Ensure the data directory exists. A failure is only warned about: the
/// store can still serve reads and will retry creation on every save.
pub async fn ensure_data_dir(data_dir: &Path) -> bool {
    match tokio::fs::create_dir_all(data_dir).await {
        Ok(()) => true,
        Err(e) => {
            warn!(data_dir = %data_dir.display(), error = %e, "cannot create data directory");
            false
        }
    }
}
