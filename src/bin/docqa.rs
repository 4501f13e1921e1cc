//! CLI binary for docqa-client.
//!
//! A thin shim over the library crate: flags become a `ClientConfig`, the
//! PDF path becomes the selected file, the questions become the raw text of
//! one submission, and the outcome is printed.

use anyhow::{Context, Result};
use clap::Parser;
use docqa_client::{
    render_plain, ClientConfig, FileCandidate, SharedObserver, SubmissionController,
    SubmissionObserver, SubmissionState, DEFAULT_BASE_URL, SAMPLE_QUESTIONS,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Spinner observer ─────────────────────────────────────────────────────────

/// Shows a spinner for as long as the request is in flight.
struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Asking");
        Arc::new(Self { bar })
    }
}

impl SubmissionObserver for SpinnerObserver {
    fn on_file_selected(&self, file: &FileCandidate) {
        self.bar.set_message(file.label());
    }

    fn on_state_change(&self, state: &SubmissionState) {
        match state {
            SubmissionState::InFlight => {
                self.bar.set_draw_target(ProgressDrawTarget::stderr());
                self.bar.enable_steady_tick(Duration::from_millis(80));
            }
            SubmissionState::ShowingResults { .. }
            | SubmissionState::ShowingError { .. }
            | SubmissionState::Idle => self.bar.finish_and_clear(),
            SubmissionState::Validating => {}
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One question
  docqa policy.pdf -q "What is the grace period for premium payment?"

  # Several questions
  docqa policy.pdf -q "What is covered?" -q "What is excluded?"

  # Questions from a file (one per line), or from stdin with '-'
  docqa policy.pdf --questions-file questions.txt
  cat questions.txt | docqa policy.pdf --questions-file -

  # Try the built-in sample questions against a remote backend
  docqa policy.pdf --sample-questions --base-url https://qa.example.com

  # HTML fragment or raw JSON instead of text
  docqa policy.pdf -q "Summary?" --format html > answers.html
  docqa policy.pdf -q "Summary?" --format json

LIMITS:
  Only PDF files (by extension) up to 10 MB are accepted.
  Blank lines in the questions are ignored.

ENVIRONMENT VARIABLES:
  DOCQA_BASE_URL   Backend base URL (default http://localhost:10000)
  RUST_LOG         Log filter, overrides --verbose / --quiet
"#;

/// Ask questions about a PDF using a document-QA service.
#[derive(Parser, Debug)]
#[command(
    name = "docqa",
    version,
    about = "Ask questions about a PDF using a document-QA service",
    long_about = "Upload a PDF together with a list of questions to a document question-answering \
service and print the answers. The file and all questions travel in a single multipart request.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF document (max 10 MB).
    file: PathBuf,

    /// A question to ask. Repeat for several questions.
    #[arg(short = 'q', long = "question", value_name = "TEXT")]
    questions: Vec<String>,

    /// Read questions from a file, one per line ('-' for stdin).
    #[arg(long, value_name = "PATH")]
    questions_file: Option<PathBuf>,

    /// Use the built-in sample questions when no others are given.
    #[arg(long)]
    sample_questions: bool,

    /// Backend base URL.
    #[arg(long, env = "DOCQA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Disable the spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except answers and errors.
    #[arg(long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters while waiting, so
    // library INFO logs are suppressed when it is active.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    // ── Build controller ─────────────────────────────────────────────────
    let config = ClientConfig::builder()
        .base_url(cli.base_url.clone())
        .request_timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")?;

    let mut controller =
        SubmissionController::from_config(config).context("Failed to create client")?;
    if show_progress {
        controller = controller.with_observer(SpinnerObserver::new() as SharedObserver);
    }

    // ── Select file ──────────────────────────────────────────────────────
    let candidate = FileCandidate::from_path(&cli.file)
        .with_context(|| format!("Cannot open {}", cli.file.display()))?;
    controller.select_file(candidate)?;
    if !cli.quiet {
        if let Some(label) = controller.file_label() {
            eprintln!("{} {}", green("◆"), bold(&label));
        }
    }

    // ── Submit ───────────────────────────────────────────────────────────
    let raw_questions = collect_questions(&cli)?;
    controller.submit(&raw_questions).await?;

    // ── Output ───────────────────────────────────────────────────────────
    let state = controller.state();
    let (Some(response), Some(rendered)) = (state.response(), state.rendered()) else {
        anyhow::bail!("Submission finished without results");
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match cli.format {
        OutputFormat::Text => handle
            .write_all(render_plain(response).as_bytes())
            .context("Failed to write to stdout")?,
        OutputFormat::Html => handle
            .write_all(rendered.to_html().as_bytes())
            .context("Failed to write to stdout")?,
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(response).context("Failed to serialise answers")?;
            writeln!(handle, "{json}").context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet && cli.format == OutputFormat::Text {
        eprintln!("{} {} answers", green("✔"), bold(&rendered.count.to_string()));
    }
    Ok(())
}

/// Assemble the raw questions text: `-q` values first, then the questions
/// file, each contributing lines. Sample questions fill in only when both
/// are absent.
fn collect_questions(cli: &Cli) -> Result<String> {
    let mut lines: Vec<String> = cli.questions.clone();

    if let Some(ref path) = cli.questions_file {
        let text = if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read questions from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read questions from {:?}", path))?
        };
        lines.push(text);
    }

    if lines.is_empty() && cli.sample_questions {
        lines.push(SAMPLE_QUESTIONS.to_string());
    }

    Ok(lines.join("\n"))
}
