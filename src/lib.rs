//! # md2pdf
//!
//! Render a Markdown document to PDF with an external renderer, copy the
//! result to a staging directory and open it in a viewer.
//!
//! ## Pipeline Overview
//!
//! ```text
//! doc.md
//!  │
//!  ├─ 1. Derive  doc.md → doc.pdf (final extension only)
//!  ├─ 2. Render  pandoc doc.md -o doc.pdf, wait for exit
//!  ├─ 3. Verify  does doc.pdf exist now?  no → stop, report renderer status
//!  ├─ 4. Stage   copy doc.pdf → ../../doc.pdf
//!  └─ 5. View    open ../../doc.pdf, wait for exit
//! ```
//!
//! Rendering and viewing go through the [`Renderer`] and [`Viewer`] traits.
//! The defaults run external commands; tests and embedders can plug in
//! their own implementations via [`ConversionConfigBuilder::renderer`] and
//! [`ConversionConfigBuilder::viewer`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .destination_dir("/tmp/pdfs")
//!         .view(false)
//!         .build()?;
//!     let outcome = convert("report.md", &config).await?;
//!     if let Some(ref path) = outcome.staged_path {
//!         println!("staged at {}", path.display());
//!     }
//!     std::process::exit(outcome.exit_code());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2pdf` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ToolCommand};
pub use convert::{check_tools, convert, convert_sync};
pub use error::{Md2PdfError, ViewError};
pub use output::{
    ConversionOutcome, ConversionStats, RenderStatus, ToolLocation, ToolReport, ViewStatus,
};
pub use pipeline::derive::derive_output_path;
pub use pipeline::render::{CommandRenderer, Renderer};
pub use pipeline::stage::stage_artifact;
pub use pipeline::view::{CommandViewer, Viewer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
