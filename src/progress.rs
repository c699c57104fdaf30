//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! when each stage starts and ends. The CLI uses it to print status lines
//! around the renderer's own terminal output.
//!
//! # Example
//!
//! ```rust
//! use md2pdf::{ConversionProgressCallback, ConversionConfig, RenderStatus};
//! use std::sync::Arc;
//!
//! struct Announce;
//!
//! impl ConversionProgressCallback for Announce {
//!     fn on_render_complete(&self, status: &RenderStatus) {
//!         eprintln!("{} exited with {:?}", status.program, status.code);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Announce) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ViewError;
use crate::output::{RenderStatus, ViewStatus};
use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in pipeline order from a single task.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called just before the renderer is launched.
    fn on_render_start(&self, input: &Path, output: &Path) {
        let _ = (input, output);
    }

    /// Called once the renderer has exited.
    fn on_render_complete(&self, status: &RenderStatus) {
        let _ = status;
    }

    /// Called when no artifact exists after the renderer returned.
    ///
    /// Nothing else happens after this event.
    fn on_artifact_missing(&self, output: &Path) {
        let _ = output;
    }

    /// Called just before the artifact is copied into `destination_dir`.
    fn on_stage_start(&self, artifact: &Path, destination_dir: &Path) {
        let _ = (artifact, destination_dir);
    }

    /// Called after the artifact was copied to the destination directory.
    fn on_staged(&self, from: &Path, to: &Path) {
        let _ = (from, to);
    }

    /// Called just before the viewer is launched.
    fn on_view_start(&self, path: &Path) {
        let _ = path;
    }

    /// Called once the viewer has exited.
    fn on_view_complete(&self, status: &ViewStatus) {
        let _ = status;
    }

    /// Called when the viewer could not be launched.
    fn on_view_error(&self, error: &ViewError) {
        let _ = error;
    }
}

/// A no-op implementation for callers that need a callback value but no
/// events. Leaving `progress_callback` unset has the same effect.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
