//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline for one input: derive the artifact
//! path, render, and, only if the artifact is then on disk, stage and view
//! it. Every step waits for the previous one to finish.

use crate::config::ConversionConfig;
use crate::error::{Md2PdfError, ViewError};
use crate::output::{ConversionOutcome, ConversionStats, ToolLocation, ToolReport, ViewStatus};
use crate::pipeline::derive::derive_output_path;
use crate::pipeline::render::{CommandRenderer, Renderer};
use crate::pipeline::stage::stage_artifact;
use crate::pipeline::view::{CommandViewer, Viewer};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render a Markdown file to PDF, stage the result and open it.
///
/// # Arguments
/// * `input`  — path to the source document, used as given
/// * `config` — conversion configuration
///
/// # Returns
/// `Ok(ConversionOutcome)` whenever the renderer could be launched, including
/// when it produced nothing; check [`ConversionOutcome::artifact_produced`]
/// or [`ConversionOutcome::exit_code`].
///
/// # Errors
/// Returns `Err(Md2PdfError)` only for fatal errors:
/// - the renderer could not be launched
/// - the staging copy failed
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutcome, Md2PdfError> {
    let total_start = Instant::now();
    let input = input.as_ref();

    // ── Step 1: Derive the artifact path ─────────────────────────────────
    let output = derive_output_path(input, &config.source_extension, &config.target_extension);
    if output == input {
        warn!(
            "'{}' has no .{} extension; the renderer will be asked to write over its input",
            input.display(),
            config.source_extension
        );
    }
    info!("Converting {} → {}", input.display(), output.display());

    // ── Step 2: Render ───────────────────────────────────────────────────
    let renderer = resolve_renderer(config);
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_start(input, &output);
    }
    let render = renderer.render(input, &output).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_complete(&render);
    }

    let mut stats = ConversionStats {
        render_duration_ms: render.duration_ms,
        ..ConversionStats::default()
    };

    // ── Step 3: Verify the artifact ──────────────────────────────────────
    let artifact_produced = tokio::fs::metadata(&output)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);

    if !artifact_produced {
        if render.success() {
            warn!(
                "Renderer '{}' reported success but '{}' does not exist",
                render.program,
                output.display()
            );
        } else {
            debug!("No artifact at '{}'; skipping stage and view", output.display());
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_artifact_missing(&output);
        }
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        return Ok(ConversionOutcome {
            input: input.to_path_buf(),
            output,
            render,
            artifact_produced,
            staged_path: None,
            view: None,
            view_error: None,
            stats,
        });
    }

    // ── Step 4: Stage ────────────────────────────────────────────────────
    let staged_path = if config.stage {
        if let Some(ref cb) = config.progress_callback {
            cb.on_stage_start(&output, &config.destination_dir);
        }
        let stage_start = Instant::now();
        let staged = stage_artifact(&output, &config.destination_dir).await?;
        stats.stage_duration_ms = stage_start.elapsed().as_millis() as u64;
        info!("Copied {} → {}", output.display(), staged.display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_staged(&output, &staged);
        }
        Some(staged)
    } else {
        None
    };

    // ── Step 5: View ─────────────────────────────────────────────────────
    let (view, view_error) = if config.view {
        let target = staged_path.as_deref().unwrap_or(&output);
        let view_start = Instant::now();
        let (view, view_error) = open_with_viewer(config, target).await;
        stats.view_duration_ms = view_start.elapsed().as_millis() as u64;
        (view, view_error)
    } else {
        (None, None)
    };

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!("Conversion complete in {}ms", stats.total_duration_ms);

    Ok(ConversionOutcome {
        input: input.to_path_buf(),
        output,
        render,
        artifact_produced,
        staged_path,
        view,
        view_error,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a single-threaded tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutcome, Md2PdfError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Md2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, config))
}

/// Look up the configured renderer and viewer programs on `PATH`.
///
/// Does not run either tool. Pre-constructed renderers and viewers in the
/// config are not inspected; the command settings are reported as-is.
pub fn check_tools(config: &ConversionConfig) -> ToolReport {
    ToolReport {
        renderer: locate(&config.renderer_command.program),
        viewer: locate(&config.viewer_command.program),
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn locate(program: &str) -> ToolLocation {
    let resolved = which::which(program).ok();
    debug!("Resolved '{}' to {:?}", program, resolved);
    ToolLocation {
        program: program.to_string(),
        resolved,
    }
}

/// A pre-built renderer wins over the configured command.
fn resolve_renderer(config: &ConversionConfig) -> Arc<dyn Renderer> {
    match config.renderer {
        Some(ref r) => Arc::clone(r),
        None => Arc::new(CommandRenderer::new(
            config.renderer_command.clone(),
            config.output_flag.clone(),
        )),
    }
}

fn resolve_viewer(config: &ConversionConfig) -> Arc<dyn Viewer> {
    match config.viewer {
        Some(ref v) => Arc::clone(v),
        None => Arc::new(CommandViewer::new(config.viewer_command.clone())),
    }
}

/// Launch the viewer. Failures are logged and returned, never propagated.
async fn open_with_viewer(
    config: &ConversionConfig,
    target: &Path,
) -> (Option<ViewStatus>, Option<ViewError>) {
    let viewer = resolve_viewer(config);
    if let Some(ref cb) = config.progress_callback {
        cb.on_view_start(target);
    }

    match viewer.open(target).await {
        Ok(status) => {
            if status.code != Some(0) {
                warn!("Viewer '{}' exited with {:?}", status.program, status.code);
            }
            if let Some(ref cb) = config.progress_callback {
                cb.on_view_complete(&status);
            }
            (Some(status), None)
        }
        Err(e) => {
            warn!("{}", e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_view_error(&e);
            }
            (None, Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RenderStatus;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Writes fixed bytes to the output path, or nothing at all.
    struct StubRenderer {
        writes: Option<&'static [u8]>,
        code: i32,
    }

    #[async_trait]
    impl Renderer for StubRenderer {
        fn name(&self) -> &str {
            "stub-renderer"
        }

        async fn render(&self, _input: &Path, output: &Path) -> Result<RenderStatus, Md2PdfError> {
            if let Some(bytes) = self.writes {
                tokio::fs::write(output, bytes).await.unwrap();
            }
            Ok(RenderStatus {
                program: "stub-renderer".into(),
                code: Some(self.code),
                duration_ms: 0,
            })
        }
    }

    #[derive(Default)]
    struct RecordingViewer {
        opened: Mutex<Vec<PathBuf>>,
        fail: bool,
    }

    #[async_trait]
    impl Viewer for RecordingViewer {
        fn name(&self) -> &str {
            "recording-viewer"
        }

        async fn open(&self, path: &Path) -> Result<ViewStatus, ViewError> {
            self.opened.lock().unwrap().push(path.to_path_buf());
            if self.fail {
                return Err(ViewError::LaunchFailed {
                    program: "recording-viewer".into(),
                    detail: "no display".into(),
                });
            }
            Ok(ViewStatus {
                program: "recording-viewer".into(),
                code: Some(0),
            })
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        input: PathBuf,
        dest: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "# Doc\n").unwrap();
        let dest = dir.path().join("dest");
        Fixture {
            input,
            dest,
            _dir: dir,
        }
    }

    fn config(
        f: &Fixture,
        renderer: StubRenderer,
        viewer: Arc<RecordingViewer>,
    ) -> crate::config::ConversionConfigBuilder {
        ConversionConfig::builder()
            .renderer(Arc::new(renderer))
            .viewer(viewer)
            .destination_dir(&f.dest)
    }

    #[tokio::test]
    async fn produced_artifact_is_staged_and_viewed() {
        let f = fixture();
        let viewer = Arc::new(RecordingViewer::default());
        let cfg = config(
            &f,
            StubRenderer {
                writes: Some(b"%PDF-1.7 stub"),
                code: 0,
            },
            viewer.clone(),
        )
        .build()
        .unwrap();

        let out = convert(&f.input, &cfg).await.unwrap();

        let staged = f.dest.join("doc.pdf");
        assert!(out.artifact_produced);
        assert_eq!(out.output, f.input.with_extension("pdf"));
        assert_eq!(out.staged_path.as_deref(), Some(staged.as_path()));
        assert_eq!(std::fs::read(&staged).unwrap(), b"%PDF-1.7 stub");
        assert_eq!(*viewer.opened.lock().unwrap(), vec![staged]);
        assert_eq!(out.exit_code(), 0);
    }

    #[tokio::test]
    async fn missing_artifact_skips_stage_and_view() {
        let f = fixture();
        let viewer = Arc::new(RecordingViewer::default());
        let cfg = config(&f, StubRenderer { writes: None, code: 43 }, viewer.clone())
            .build()
            .unwrap();

        let out = convert(&f.input, &cfg).await.unwrap();

        assert!(!out.artifact_produced);
        assert!(out.staged_path.is_none());
        assert!(out.view.is_none());
        assert!(!f.dest.exists());
        assert!(viewer.opened.lock().unwrap().is_empty());
        assert_eq!(out.exit_code(), 43);
    }

    #[tokio::test]
    async fn renderer_success_without_artifact_exits_zero() {
        let f = fixture();
        let viewer = Arc::new(RecordingViewer::default());
        let cfg = config(&f, StubRenderer { writes: None, code: 0 }, viewer.clone())
            .build()
            .unwrap();

        let out = convert(&f.input, &cfg).await.unwrap();
        assert!(out.render.success());
        assert!(!out.artifact_produced);
        assert_eq!(out.exit_code(), 0);
        assert!(viewer.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn artifact_counts_even_when_renderer_failed() {
        let f = fixture();
        let viewer = Arc::new(RecordingViewer::default());
        let cfg = config(
            &f,
            StubRenderer {
                writes: Some(b"partial"),
                code: 1,
            },
            viewer.clone(),
        )
        .build()
        .unwrap();

        let out = convert(&f.input, &cfg).await.unwrap();
        assert!(out.artifact_produced);
        assert_eq!(out.render.code, Some(1));
        assert_eq!(out.exit_code(), 0);
        assert_eq!(viewer.opened.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn without_staging_viewer_opens_the_artifact_in_place() {
        let f = fixture();
        let viewer = Arc::new(RecordingViewer::default());
        let cfg = config(
            &f,
            StubRenderer {
                writes: Some(b"pdf"),
                code: 0,
            },
            viewer.clone(),
        )
        .stage(false)
        .build()
        .unwrap();

        let out = convert(&f.input, &cfg).await.unwrap();
        assert!(out.staged_path.is_none());
        assert!(!f.dest.exists());
        assert_eq!(
            *viewer.opened.lock().unwrap(),
            vec![f.input.with_extension("pdf")]
        );
    }

    #[tokio::test]
    async fn without_viewing_nothing_is_opened() {
        let f = fixture();
        let viewer = Arc::new(RecordingViewer::default());
        let cfg = config(
            &f,
            StubRenderer {
                writes: Some(b"pdf"),
                code: 0,
            },
            viewer.clone(),
        )
        .view(false)
        .build()
        .unwrap();

        let out = convert(&f.input, &cfg).await.unwrap();
        assert!(f.dest.join("doc.pdf").exists());
        assert!(out.view.is_none());
        assert!(viewer.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn viewer_failure_does_not_change_outcome() {
        let f = fixture();
        let viewer = Arc::new(RecordingViewer {
            fail: true,
            ..Default::default()
        });
        let cfg = config(
            &f,
            StubRenderer {
                writes: Some(b"pdf"),
                code: 0,
            },
            viewer,
        )
        .build()
        .unwrap();

        let out = convert(&f.input, &cfg).await.unwrap();
        assert!(matches!(out.view_error, Some(ViewError::LaunchFailed { .. })));
        assert_eq!(out.exit_code(), 0);
    }

    #[tokio::test]
    async fn input_without_source_extension_renders_onto_itself() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "plain").unwrap();
        let viewer = Arc::new(RecordingViewer::default());
        let cfg = ConversionConfig::builder()
            .renderer(Arc::new(StubRenderer { writes: None, code: 0 }))
            .viewer(viewer.clone())
            .destination_dir(dir.path().join("dest"))
            .build()
            .unwrap();

        let out = convert(&input, &cfg).await.unwrap();
        assert_eq!(out.output, input);
        // The input itself exists, so it counts as the artifact.
        assert!(out.artifact_produced);
        assert_eq!(
            std::fs::read(dir.path().join("dest/notes.txt")).unwrap(),
            b"plain"
        );
    }

    #[derive(Default)]
    struct EventLog(Mutex<Vec<&'static str>>);

    impl crate::progress::ConversionProgressCallback for EventLog {
        fn on_render_start(&self, _input: &Path, _output: &Path) {
            self.0.lock().unwrap().push("render_start");
        }
        fn on_render_complete(&self, _status: &RenderStatus) {
            self.0.lock().unwrap().push("render_complete");
        }
        fn on_artifact_missing(&self, _output: &Path) {
            self.0.lock().unwrap().push("artifact_missing");
        }
        fn on_stage_start(&self, _artifact: &Path, _destination_dir: &Path) {
            self.0.lock().unwrap().push("stage_start");
        }
        fn on_staged(&self, _from: &Path, _to: &Path) {
            self.0.lock().unwrap().push("staged");
        }
        fn on_view_start(&self, _path: &Path) {
            self.0.lock().unwrap().push("view_start");
        }
        fn on_view_complete(&self, _status: &ViewStatus) {
            self.0.lock().unwrap().push("view_complete");
        }
    }

    #[tokio::test]
    async fn progress_events_follow_pipeline_order() {
        let f = fixture();
        let log = Arc::new(EventLog::default());
        let cfg = config(
            &f,
            StubRenderer {
                writes: Some(b"pdf"),
                code: 0,
            },
            Arc::new(RecordingViewer::default()),
        )
        .progress_callback(log.clone())
        .build()
        .unwrap();

        convert(&f.input, &cfg).await.unwrap();
        assert_eq!(
            *log.0.lock().unwrap(),
            vec![
                "render_start",
                "render_complete",
                "stage_start",
                "staged",
                "view_start",
                "view_complete"
            ]
        );
    }

    #[tokio::test]
    async fn progress_stops_at_missing_artifact() {
        let f = fixture();
        let log = Arc::new(EventLog::default());
        let cfg = config(
            &f,
            StubRenderer { writes: None, code: 2 },
            Arc::new(RecordingViewer::default()),
        )
        .progress_callback(log.clone())
        .build()
        .unwrap();

        convert(&f.input, &cfg).await.unwrap();
        assert_eq!(
            *log.0.lock().unwrap(),
            vec!["render_start", "render_complete", "artifact_missing"]
        );
    }

    #[test]
    fn convert_sync_runs_the_pipeline() {
        let f = fixture();
        let viewer = Arc::new(RecordingViewer::default());
        let cfg = config(
            &f,
            StubRenderer {
                writes: Some(b"pdf"),
                code: 0,
            },
            viewer.clone(),
        )
        .build()
        .unwrap();

        let out = convert_sync(&f.input, &cfg).unwrap();
        assert!(out.artifact_produced);
        assert_eq!(viewer.opened.lock().unwrap().len(), 1);
    }

    #[test]
    fn check_tools_reports_missing_programs() {
        let cfg = ConversionConfig::builder()
            .renderer_program("md2pdf-no-such-renderer-xyz")
            .viewer_program("md2pdf-no-such-viewer-xyz")
            .build()
            .unwrap();
        let report = check_tools(&cfg);
        assert!(report.renderer.resolved.is_none());
        assert!(report.viewer.resolved.is_none());
        assert!(!report.all_found());
    }

    #[cfg(unix)]
    #[test]
    fn check_tools_finds_programs_on_path() {
        let cfg = ConversionConfig::builder()
            .renderer_program("sh")
            .viewer_program("sh")
            .build()
            .unwrap();
        assert!(check_tools(&cfg).all_found());
    }
}
