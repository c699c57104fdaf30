//! Viewing: open the rendered artifact for the user.
//!
//! The stock [`CommandViewer`] waits for the viewer process to exit. Many
//! platform openers (`open`, `xdg-open`) hand the file to a desktop
//! application and return straight away; others stay in the foreground
//! until their window closes.

use crate::config::ToolCommand;
use crate::error::ViewError;
use crate::output::ViewStatus;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Something that can display a rendered artifact.
#[async_trait]
pub trait Viewer: Send + Sync {
    fn name(&self) -> &str;

    /// Open `path`, returning once the viewer has finished.
    async fn open(&self, path: &Path) -> Result<ViewStatus, ViewError>;
}

/// Runs `program [args…] <path>`.
#[derive(Debug, Clone)]
pub struct CommandViewer {
    command: ToolCommand,
}

impl CommandViewer {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Viewer for CommandViewer {
    fn name(&self) -> &str {
        &self.command.program
    }

    async fn open(&self, path: &Path) -> Result<ViewStatus, ViewError> {
        let program = &self.command.program;
        debug!("Running viewer: {} {:?} {}", program, self.command.args, path.display());

        let status = Command::new(program)
            .args(&self.command.args)
            .arg(path)
            .status()
            .await
            .map_err(|e| ViewError::from_spawn(program, e))?;

        Ok(ViewStatus {
            program: program.clone(),
            code: status.code(),
        })
    }
}
