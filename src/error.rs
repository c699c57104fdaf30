//! Error types for the md2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Md2PdfError`] — **Fatal**: the pipeline cannot continue (the renderer
//!   could not be launched, the staging copy failed, the configuration is
//!   invalid). Returned as `Err(Md2PdfError)` from the top-level `convert*`
//!   functions.
//!
//! * [`ViewError`] — **Non-fatal**: the artifact was produced and staged, but
//!   the viewer could not be launched. Stored inside
//!   [`crate::output::ConversionOutcome`] because opening the document never
//!   changes the outcome of the conversion.
//!
//! A renderer that runs but exits non-zero is not an error at all: its
//! status is recorded in [`crate::output::RenderStatus`] and the pipeline
//! decides what to do by checking for the artifact on disk.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status used by shells when a command cannot be found.
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Exit status used by shells when a command exists but cannot be executed.
pub const EXIT_COMMAND_NOT_EXECUTABLE: i32 = 126;

/// All fatal errors returned by the md2pdf library.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Renderer errors ───────────────────────────────────────────────────
    /// The renderer program could not be found on `PATH`.
    #[error("Renderer '{program}' not found.\nInstall it or point --renderer / MD2PDF_RENDERER at it.")]
    RendererNotFound { program: String },

    /// The renderer program exists but is not executable.
    #[error("Renderer '{program}' is not executable.\nTry: chmod +x {program}")]
    RendererNotExecutable { program: String },

    /// The renderer could not be spawned for another reason.
    #[error("Failed to launch renderer '{program}': {source}")]
    RendererSpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // ── Staging errors ────────────────────────────────────────────────────
    /// Could not copy the rendered artifact to the destination directory.
    #[error("Failed to copy '{from}' to '{to}': {source}")]
    StageFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Md2PdfError {
    /// Process exit status the CLI reports for this error.
    ///
    /// Launch failures follow the POSIX shell convention so that a missing
    /// renderer looks the same as it would from a shell script.
    pub fn exit_code(&self) -> i32 {
        match self {
            Md2PdfError::RendererNotFound { .. } => EXIT_COMMAND_NOT_FOUND,
            Md2PdfError::RendererNotExecutable { .. } => EXIT_COMMAND_NOT_EXECUTABLE,
            _ => 1,
        }
    }

    /// Classify an I/O error raised while spawning the renderer.
    pub(crate) fn from_renderer_spawn(program: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Md2PdfError::RendererNotFound {
                program: program.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => Md2PdfError::RendererNotExecutable {
                program: program.to_string(),
            },
            _ => Md2PdfError::RendererSpawnFailed {
                program: program.to_string(),
                source,
            },
        }
    }
}

/// A non-fatal error raised while opening the rendered artifact.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ViewError {
    /// The viewer program could not be found on `PATH`.
    #[error("Viewer '{program}' not found")]
    NotFound { program: String },

    /// The viewer could not be launched.
    #[error("Failed to launch viewer '{program}': {detail}")]
    LaunchFailed { program: String, detail: String },
}

impl ViewError {
    pub(crate) fn from_spawn(program: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ViewError::NotFound {
                program: program.to_string(),
            }
        } else {
            ViewError::LaunchFailed {
                program: program.to_string(),
                detail: source.to_string(),
            }
        }
    }
}
