//! Template archive placement and removal.
//!
//! - Async I/O only (tokio)
//! - Copy overwrites an existing archive; the destination folder must already exist
//! - Removing an archive that is already gone is not an error

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

/// Copy the template archive, replacing any file already at `dst`.
pub async fn copy_template(src: &Path, dst: &Path) -> Result<u64> {
    let started = Instant::now();
    debug!(
        "[PHASE: install] [STEP: copy] copy_template entered (src={:?}, dst={:?})",
        src, dst
    );

    let bytes = tokio::fs::copy(src, dst)
        .await
        .with_context(|| format!("Failed to copy template archive {:?} to {:?}", src, dst))?;

    info!(
        "[PHASE: install] [STEP: copy] copy_template exit (bytes={}, duration_ms={})",
        bytes,
        started.elapsed().as_millis()
    );
    Ok(bytes)
}

/// Delete the template archive. Returns whether a file was actually removed.
pub async fn remove_template(path: &Path) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!("[PHASE: uninstall] [STEP: delete] Removed {:?}", path);
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "[PHASE: uninstall] [STEP: delete] {:?} already absent; nothing to remove",
                path
            );
            Ok(false)
        }
        Err(e) => Err(anyhow::Error::new(e))
            .with_context(|| format!("Failed to delete template archive {:?}", path)),
    }
}
