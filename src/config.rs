//! Configuration types for Markdown-to-PDF conversion.
//!
//! All pipeline behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults reproduce the classic
//! behaviour: `pandoc <in> -o <out>`, copy the PDF two directories up, open
//! it with the platform's document opener.

use crate::error::Md2PdfError;
use crate::pipeline::render::Renderer;
use crate::pipeline::view::Viewer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default renderer program.
pub const DEFAULT_RENDERER: &str = "pandoc";

/// Flag that tells the renderer where to write its output.
pub const DEFAULT_OUTPUT_FLAG: &str = "-o";

/// Extension recognised on source documents.
pub const DEFAULT_SOURCE_EXTENSION: &str = "md";

/// Extension given to rendered artifacts.
pub const DEFAULT_TARGET_EXTENSION: &str = "pdf";

/// Default staging directory, relative to the working directory.
pub const DEFAULT_DESTINATION_DIR: &str = "../..";

/// The platform's "open this document" program.
pub fn default_viewer_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// An external program plus the arguments that always precede the
/// per-invocation ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Configuration for one conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .renderer_program("pandoc")
///     .renderer_arg("--pdf-engine=xelatex")
///     .destination_dir("/tmp/pdfs")
///     .view(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Renderer command. Invoked as `program [args…] <input> <output_flag> <output>`.
    pub renderer_command: ToolCommand,

    /// Flag placed before the output path. Default: `-o`.
    pub output_flag: String,

    /// Viewer command. Invoked as `program [args…] <path>`.
    pub viewer_command: ToolCommand,

    /// Pre-constructed renderer. Takes precedence over `renderer_command`.
    pub renderer: Option<Arc<dyn Renderer>>,

    /// Pre-constructed viewer. Takes precedence over `viewer_command`.
    pub viewer: Option<Arc<dyn Viewer>>,

    /// Directory the artifact is copied into. Default: `../..`.
    ///
    /// Relative paths resolve against the process working directory.
    pub destination_dir: PathBuf,

    /// Copy the artifact into `destination_dir`. Default: true.
    pub stage: bool,

    /// Open the artifact with the viewer. Default: true.
    ///
    /// With staging disabled the viewer opens the artifact where the
    /// renderer wrote it.
    pub view: bool,

    /// Extension (without the dot) replaced on the input. Default: `md`.
    pub source_extension: String,

    /// Extension (without the dot) of the artifact. Default: `pdf`.
    pub target_extension: String,

    /// Optional stage event sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            renderer_command: ToolCommand::new(DEFAULT_RENDERER),
            output_flag: DEFAULT_OUTPUT_FLAG.to_string(),
            viewer_command: ToolCommand::new(default_viewer_program()),
            renderer: None,
            viewer: None,
            destination_dir: PathBuf::from(DEFAULT_DESTINATION_DIR),
            stage: true,
            view: true,
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("renderer_command", &self.renderer_command)
            .field("output_flag", &self.output_flag)
            .field("viewer_command", &self.viewer_command)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn Renderer>"))
            .field("viewer", &self.viewer.as_ref().map(|_| "<dyn Viewer>"))
            .field("destination_dir", &self.destination_dir)
            .field("stage", &self.stage)
            .field("view", &self.view)
            .field("source_extension", &self.source_extension)
            .field("target_extension", &self.target_extension)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn renderer_program(mut self, program: impl Into<String>) -> Self {
        self.config.renderer_command.program = program.into();
        self
    }

    /// Append an argument placed before the input path.
    pub fn renderer_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.renderer_command.args.push(arg.into());
        self
    }

    pub fn renderer_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.renderer_command = self.config.renderer_command.args(args);
        self
    }

    pub fn output_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.output_flag = flag.into();
        self
    }

    pub fn viewer_program(mut self, program: impl Into<String>) -> Self {
        self.config.viewer_command.program = program.into();
        self
    }

    /// Append an argument placed before the document path.
    pub fn viewer_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.viewer_command.args.push(arg.into());
        self
    }

    pub fn viewer_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.viewer_command = self.config.viewer_command.args(args);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn viewer(mut self, viewer: Arc<dyn Viewer>) -> Self {
        self.config.viewer = Some(viewer);
        self
    }

    pub fn destination_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.destination_dir = dir.into();
        self
    }

    pub fn stage(mut self, v: bool) -> Self {
        self.config.stage = v;
        self
    }

    pub fn view(mut self, v: bool) -> Self {
        self.config.view = v;
        self
    }

    /// Accepts `md` or `.md`.
    pub fn source_extension(mut self, ext: impl AsRef<str>) -> Self {
        self.config.source_extension = strip_dot(ext.as_ref());
        self
    }

    /// Accepts `pdf` or `.pdf`.
    pub fn target_extension(mut self, ext: impl AsRef<str>) -> Self {
        self.config.target_extension = strip_dot(ext.as_ref());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        let c = &self.config;
        if c.renderer.is_none() && c.renderer_command.program.trim().is_empty() {
            return Err(Md2PdfError::InvalidConfig(
                "renderer program must not be empty".into(),
            ));
        }
        if c.view && c.viewer.is_none() && c.viewer_command.program.trim().is_empty() {
            return Err(Md2PdfError::InvalidConfig(
                "viewer program must not be empty".into(),
            ));
        }
        if c.source_extension.is_empty() || c.target_extension.is_empty() {
            return Err(Md2PdfError::InvalidConfig(
                "source and target extensions must not be empty".into(),
            ));
        }
        if c.source_extension == c.target_extension {
            return Err(Md2PdfError::InvalidConfig(format!(
                "source and target extensions are both '{}'",
                c.source_extension
            )));
        }
        if c.stage && c.destination_dir.as_os_str().is_empty() {
            return Err(Md2PdfError::InvalidConfig(
                "destination directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

fn strip_dot(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_behaviour() {
        let c = ConversionConfig::default();
        assert_eq!(c.renderer_command, ToolCommand::new("pandoc"));
        assert_eq!(c.output_flag, "-o");
        assert_eq!(c.destination_dir, PathBuf::from("../.."));
        assert_eq!(c.source_extension, "md");
        assert_eq!(c.target_extension, "pdf");
        assert!(c.stage && c.view);
        assert!(c.viewer_command.args.is_empty());
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let c = ConversionConfig::builder()
            .renderer_program("./render.sh")
            .renderer_arg("--standalone")
            .renderer_args(["--toc", "-V", "geometry:margin=1in"])
            .output_flag("--output")
            .viewer_program("zathura")
            .viewer_arg("--fork")
            .destination_dir("/srv/pdf")
            .stage(false)
            .build()
            .unwrap();

        assert_eq!(c.renderer_command.program, "./render.sh");
        assert_eq!(
            c.renderer_command.args,
            vec!["--standalone", "--toc", "-V", "geometry:margin=1in"]
        );
        assert_eq!(c.output_flag, "--output");
        assert_eq!(c.viewer_command, ToolCommand::new("zathura").arg("--fork"));
        assert_eq!(c.destination_dir, PathBuf::from("/srv/pdf"));
        assert!(!c.stage);
    }

    #[test]
    fn extensions_accept_leading_dot() {
        let c = ConversionConfig::builder()
            .source_extension(".markdown")
            .target_extension(".html")
            .build()
            .unwrap();
        assert_eq!(c.source_extension, "markdown");
        assert_eq!(c.target_extension, "html");
    }

    #[test]
    fn empty_renderer_is_rejected() {
        let err = ConversionConfig::builder()
            .renderer_program("  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, Md2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn empty_viewer_is_fine_when_not_viewing() {
        assert!(ConversionConfig::builder()
            .viewer_program("")
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .viewer_program("")
            .view(false)
            .build()
            .is_ok());
    }

    #[test]
    fn identical_extensions_are_rejected() {
        let err = ConversionConfig::builder()
            .target_extension("md")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'md'"), "got: {err}");
    }

    #[test]
    fn debug_hides_trait_objects() {
        let dbg = format!("{:?}", ConversionConfig::default());
        assert!(dbg.contains("pandoc"));
        assert!(dbg.contains("renderer: None"));
    }
}
