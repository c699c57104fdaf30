//! Result types produced by a conversion.
//!
//! The renderer's exit status and the presence of the artifact on disk are
//! reported as two separate facts. A renderer can exit 0 and write nothing,
//! or exit non-zero after writing a usable file; callers see both.

use crate::error::ViewError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the renderer child process ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStatus {
    /// Program that was run.
    pub program: String,
    /// Exit code, or `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Wall-clock time spent waiting for the renderer.
    pub duration_ms: u64,
}

impl RenderStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code to propagate; termination by signal is reported as 1.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(1)
    }
}

/// How the viewer child process ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewStatus {
    pub program: String,
    pub code: Option<i32>,
}

/// Timing for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub render_duration_ms: u64,
    pub stage_duration_ms: u64,
    pub view_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything the pipeline did for one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// The path exactly as supplied.
    pub input: PathBuf,
    /// The derived artifact path the renderer was told to write.
    pub output: PathBuf,
    /// Renderer exit status.
    pub render: RenderStatus,
    /// Whether a file existed at `output` after the renderer returned.
    pub artifact_produced: bool,
    /// Where the artifact was copied, when staging ran.
    pub staged_path: Option<PathBuf>,
    /// Viewer exit status, when the viewer ran.
    pub view: Option<ViewStatus>,
    /// Set when the viewer could not be launched.
    pub view_error: Option<ViewError>,
    pub stats: ConversionStats,
}

impl ConversionOutcome {
    /// Process exit status for this outcome.
    ///
    /// 0 once the artifact exists; otherwise whatever the renderer returned.
    /// The viewer never influences it.
    pub fn exit_code(&self) -> i32 {
        if self.artifact_produced {
            0
        } else {
            self.render.exit_code()
        }
    }
}

/// Where the configured external tools resolve on this machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolReport {
    pub renderer: ToolLocation,
    pub viewer: ToolLocation,
}

impl ToolReport {
    pub fn all_found(&self) -> bool {
        self.renderer.resolved.is_some() && self.viewer.resolved.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolLocation {
    pub program: String,
    pub resolved: Option<PathBuf>,
}
