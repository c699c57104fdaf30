//! CLI binary for md2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and turns the outcome into an exit status.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md2pdf::{
    check_tools, convert, ConversionConfig, ConversionProgressCallback, Md2PdfError,
    ProgressCallback, RenderStatus, ViewError, ViewStatus,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status for a malformed command line.
const USAGE_EXIT_CODE: u8 = 10;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints one status line per stage on stderr.
///
/// The renderer and viewer share the terminal with us, so the spinner only
/// runs while no child process is alive: during the staging copy.
struct CliProgressCallback {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn start_spinner(&self, msg: String) {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message(msg);
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Some(old) = self.lock().replace(bar) {
            old.finish_and_clear();
        }
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.lock().take() {
            bar.finish_and_clear();
        }
    }

    /// Print a line above the spinner, or plainly when none is running.
    /// `suspend` still prints when stderr is not a terminal.
    fn line(&self, text: String) {
        match self.lock().as_ref() {
            Some(bar) => bar.suspend(|| eprintln!("{text}")),
            None => eprintln!("{text}"),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_render_start(&self, input: &Path, output: &Path) {
        self.stop_spinner();
        self.line(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(&format!("Rendering {}", input.display())),
            dim(&format!("→ {}", output.display()))
        ));
    }

    fn on_render_complete(&self, status: &RenderStatus) {
        let secs = status.duration_ms as f64 / 1000.0;
        self.line(match status.code {
            Some(0) => format!("  {} {}  {}", green("✓"), status.program, dim(&format!("{secs:.1}s"))),
            code => format!(
                "  {} {} exited with {}  {}",
                red("✗"),
                status.program,
                code.map_or_else(|| "a signal".to_string(), |c| c.to_string()),
                dim(&format!("{secs:.1}s"))
            ),
        });
    }

    fn on_artifact_missing(&self, output: &Path) {
        self.stop_spinner();
        self.line(format!("  {} no {} produced", red("✘"), bold(&output.display().to_string())));
    }

    fn on_stage_start(&self, artifact: &Path, destination_dir: &Path) {
        self.start_spinner(format!(
            "copying {} to {}",
            artifact.display(),
            destination_dir.display()
        ));
    }

    fn on_staged(&self, _from: &Path, to: &Path) {
        self.stop_spinner();
        self.line(format!("  {} copied to {}", green("✓"), bold(&to.display().to_string())));
    }

    fn on_view_start(&self, path: &Path) {
        self.stop_spinner();
        self.line(format!("  {} opening {}", cyan("◆"), dim(&path.display().to_string())));
    }

    fn on_view_complete(&self, status: &ViewStatus) {
        if status.code != Some(0) {
            self.line(format!("  {} {} exited with {:?}", cyan("⚠"), status.program, status.code));
        }
    }

    fn on_view_error(&self, error: &ViewError) {
        self.line(format!("  {} {}", cyan("⚠"), error));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render notes.md to notes.pdf, copy it two directories up, open it
  md2pdf notes.md

  # Keep the PDF where it is and don't open anything
  md2pdf --no-stage --no-view notes.md

  # Copy into a specific directory
  md2pdf --dest ~/Documents/pdf notes.md

  # Pass extra options to pandoc
  md2pdf --renderer-arg=--pdf-engine=xelatex --renderer-arg=--toc book.md

  # Use another opener
  md2pdf --viewer zathura notes.md

  # Check that the renderer and viewer can be found
  md2pdf --check-tools

EXIT STATUS:
  0     the PDF was produced (copied and opened when enabled)
  10    wrong number of arguments or unknown option
  126   the renderer is not executable
  127   the renderer was not found
  N     the renderer's own status when no PDF was produced

ENVIRONMENT VARIABLES:
  MD2PDF_RENDERER   Renderer program (default: pandoc)
  MD2PDF_VIEWER     Viewer program (default: open / xdg-open / explorer)
  MD2PDF_DEST       Staging directory (default: ../..)
  RUST_LOG          Override log filter (e.g. md2pdf=debug)
"#;

/// Render a Markdown file to PDF, stage a copy and open it.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Render a Markdown file to PDF, stage a copy and open it",
    long_about = "Render a Markdown document to PDF with an external renderer (pandoc by default). \
When the PDF appears, copy it to a staging directory and open it in a viewer.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file to render. The PDF is written next to it.
    #[arg(required_unless_present = "check_tools")]
    input: Option<PathBuf>,

    /// Renderer program.
    #[arg(long, env = "MD2PDF_RENDERER", default_value = md2pdf::config::DEFAULT_RENDERER)]
    renderer: String,

    /// Extra renderer argument, placed before the input path. Repeatable.
    #[arg(long = "renderer-arg", value_name = "ARG", allow_hyphen_values = true)]
    renderer_args: Vec<String>,

    /// Flag that introduces the output path on the renderer command line.
    #[arg(long, env = "MD2PDF_OUTPUT_FLAG", default_value = md2pdf::config::DEFAULT_OUTPUT_FLAG,
          allow_hyphen_values = true)]
    output_flag: String,

    /// Viewer program.
    #[arg(long, env = "MD2PDF_VIEWER")]
    viewer: Option<String>,

    /// Extra viewer argument, placed before the document path. Repeatable.
    #[arg(long = "viewer-arg", value_name = "ARG", allow_hyphen_values = true)]
    viewer_args: Vec<String>,

    /// Directory the PDF is copied into.
    #[arg(long = "dest", env = "MD2PDF_DEST", default_value = md2pdf::config::DEFAULT_DESTINATION_DIR)]
    destination: PathBuf,

    /// Source extension replaced on the input path.
    #[arg(long, env = "MD2PDF_FROM_EXT", default_value = md2pdf::config::DEFAULT_SOURCE_EXTENSION)]
    from_ext: String,

    /// Extension of the rendered file.
    #[arg(long, env = "MD2PDF_TO_EXT", default_value = md2pdf::config::DEFAULT_TARGET_EXTENSION)]
    to_ext: String,

    /// Do not copy the PDF to the staging directory.
    #[arg(long, env = "MD2PDF_NO_STAGE")]
    no_stage: bool,

    /// Do not open the PDF.
    #[arg(long, env = "MD2PDF_NO_VIEW")]
    no_view: bool,

    /// Print the outcome as JSON on stdout.
    #[arg(long, env = "MD2PDF_JSON")]
    json: bool,

    /// Disable per-stage status lines.
    #[arg(long, env = "MD2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Report where the renderer and viewer resolve on PATH, then exit.
    #[arg(long)]
    check_tools: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Nothing else may happen before the command line is known to be valid.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(USAGE_EXIT_CODE),
            };
        }
    };

    // ── Logging setup ────────────────────────────────────────────────────
    // Status lines already cover what INFO logs would say.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            exit_code(
                e.downcast_ref::<Md2PdfError>()
                    .map(Md2PdfError::exit_code)
                    .unwrap_or(1),
            )
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<i32> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(Arc::new(CliProgressCallback::new()) as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, progress_cb)?;

    // ── Tool check mode ──────────────────────────────────────────────────
    if cli.check_tools {
        let report = check_tools(&config);
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise tool report")?
            );
        } else {
            for (role, tool) in [("Renderer", &report.renderer), ("Viewer", &report.viewer)] {
                match tool.resolved {
                    Some(ref path) => {
                        println!("{role:<10}{}  {}", tool.program, dim(&path.display().to_string()))
                    }
                    None => println!("{role:<10}{}  {}", tool.program, red("not found")),
                }
            }
        }
        return Ok(if report.all_found() { 0 } else { 1 });
    }

    let input = cli
        .input
        .as_deref()
        .context("No input file given")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = convert(input, &config).await?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
    } else if !cli.quiet && !show_progress && outcome.artifact_produced {
        // Without status lines, say where the file ended up.
        let shown = outcome.staged_path.as_ref().unwrap_or(&outcome.output);
        eprintln!("{} {}", green("✔"), bold(&shown.display().to_string()));
    }

    Ok(outcome.exit_code())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .renderer_program(&cli.renderer)
        .renderer_args(&cli.renderer_args)
        .output_flag(&cli.output_flag)
        .viewer_args(&cli.viewer_args)
        .destination_dir(&cli.destination)
        .source_extension(&cli.from_ext)
        .target_extension(&cli.to_ext)
        .stage(!cli.no_stage)
        .view(!cli.no_view);

    if let Some(ref viewer) = cli.viewer {
        builder = builder.viewer_program(viewer);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
