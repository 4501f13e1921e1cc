//! # docqa-client
//!
//! Client for a document question-answering service: pick one PDF, enter
//! questions one per line, upload both in a single request, and render the
//! answers that come back.
//!
//! ## Submission cycle
//!
//! ```text
//! select_file ─┐
//!              ├─ 1. Validate  PDF media type, ≤ 10 MiB, questions present
//! submit ──────┘
//!                 2. Upload    one multipart POST (file + JSON question array)
//!                 3. Interpret non-2xx / `error` field / empty answers → error
//!                 4. Render    escaped HTML blocks, in response order
//! ```
//!
//! All state lives in one [`SubmissionController`]; the UI (or the `docqa`
//! binary, or a test) drives it through plain method calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docqa_client::{ClientConfig, FileCandidate, SubmissionController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:10000")
//!         .build()?;
//!     let mut controller = SubmissionController::from_config(config)?;
//!
//!     controller.select_file(FileCandidate::from_path("policy.pdf")?)?;
//!     let rendered = controller
//!         .submit("What is the grace period?\nWhat is excluded?")
//!         .await?;
//!     println!("{}", rendered.to_html());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docqa` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod file;
pub mod observer;
pub mod questions;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{AnswerItem, AnswersResponse, QaBackend, RemoteQaClient};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, UPLOAD_PATH};
pub use controller::{SubmissionController, SubmissionState};
pub use error::{DocQaError, ErrorKind, ValidationError};
pub use file::{format_file_size, FileCandidate, MAX_FILE_SIZE, PDF_MEDIA_TYPE};
pub use observer::{NoopObserver, SharedObserver, SubmissionObserver};
pub use questions::{QuestionList, SAMPLE_QUESTIONS};
pub use render::{escape_html, render_answers, render_error, render_plain, RenderedAnswers};
