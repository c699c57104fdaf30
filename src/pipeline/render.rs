//! Rendering: hand the source document to an external renderer.
//!
//! The pipeline only depends on the [`Renderer`] trait. [`CommandRenderer`]
//! is the stock implementation and runs a program such as pandoc as a child
//! process, waiting for it to exit. The child inherits the terminal, so
//! whatever the renderer prints reaches the user untouched.

use crate::config::ToolCommand;
use crate::error::Md2PdfError;
use crate::output::RenderStatus;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

/// Something that turns a source document into a rendered artifact.
///
/// Implementations report how the render ended; they do not need to check
/// whether `output` was written. The pipeline does that itself.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Human-readable name used in logs and reports.
    fn name(&self) -> &str;

    /// Render `input` into `output`, returning once the work has finished.
    async fn render(&self, input: &Path, output: &Path) -> Result<RenderStatus, Md2PdfError>;
}

/// Runs `program [args…] <input> <output_flag> <output>`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: ToolCommand,
    output_flag: String,
}

impl CommandRenderer {
    pub fn new(command: ToolCommand, output_flag: impl Into<String>) -> Self {
        Self {
            command,
            output_flag: output_flag.into(),
        }
    }

    /// Full argument list for one invocation.
    pub fn command_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.command.args.iter().map(OsString::from).collect();
        args.push(input.as_os_str().to_os_string());
        if !self.output_flag.is_empty() {
            args.push(OsString::from(&self.output_flag));
        }
        args.push(output.as_os_str().to_os_string());
        args
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    fn name(&self) -> &str {
        &self.command.program
    }

    async fn render(&self, input: &Path, output: &Path) -> Result<RenderStatus, Md2PdfError> {
        let program = &self.command.program;
        let args = self.command_args(input, output);
        debug!("Running renderer: {} {:?}", program, args);

        let start = Instant::now();
        let status = Command::new(program)
            .args(&args)
            .status()
            .await
            .map_err(|e| Md2PdfError::from_renderer_spawn(program, e))?;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Renderer '{}' exited with {:?} after {}ms",
            program,
            status.code(),
            duration_ms
        );

        Ok(RenderStatus {
            program: program.clone(),
            code: status.code(),
            duration_ms,
        })
    }
}
