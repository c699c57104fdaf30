//! Staging: copy the rendered artifact into the destination directory.
//!
//! The copy is written to a uniquely named hidden temporary file in the
//! destination directory and renamed into place, so a concurrent reader of
//! the destination sees either an older complete file or the new one, and
//! two runs staging the same name never share a temporary file.

use crate::error::Md2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where `artifact` lands inside `destination_dir`.
pub fn staged_path(artifact: &Path, destination_dir: &Path) -> Result<PathBuf, Md2PdfError> {
    let name = artifact.file_name().ok_or_else(|| {
        Md2PdfError::Internal(format!(
            "artifact path '{}' has no file name",
            artifact.display()
        ))
    })?;
    Ok(destination_dir.join(name))
}

/// Copy `artifact` into `destination_dir`, returning the copy's path.
///
/// The directory is created when missing. An existing file with the same
/// name is replaced.
pub async fn stage_artifact(artifact: &Path, destination_dir: &Path) -> Result<PathBuf, Md2PdfError> {
    let dest = staged_path(artifact, destination_dir)?;
    let from = artifact.to_path_buf();
    let dir = destination_dir.to_path_buf();
    let to = dest.clone();

    tokio::task::spawn_blocking(move || copy_then_persist(&from, &dir, &to))
        .await
        .map_err(|e| Md2PdfError::Internal(format!("Staging task panicked: {}", e)))??;

    debug!("Staged {} → {}", artifact.display(), dest.display());
    Ok(dest)
}

/// Blocking implementation of staging.
///
/// The temporary file is removed on drop if anything fails before
/// `persist`.
fn copy_then_persist(artifact: &Path, destination_dir: &Path, dest: &Path) -> Result<(), Md2PdfError> {
    let fail = |source: std::io::Error| Md2PdfError::StageFailed {
        from: artifact.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(destination_dir).map_err(fail)?;

    let prefix = format!(
        ".{}.",
        dest.file_name().unwrap_or_default().to_string_lossy()
    );
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(destination_dir)
        .map_err(fail)?;

    let mut src = std::fs::File::open(artifact).map_err(fail)?;
    std::io::copy(&mut src, tmp.as_file_mut()).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;

    tmp.persist(dest).map_err(|e| fail(e.error))?;
    Ok(())
}
