//! Error types for the docqa-client library.
//!
//! Every failure ends the current submission cycle and nothing more. The
//! controller turns any [`DocQaError`] into a plain message on the error
//! panel and stays usable, so the user can fix the input and submit again.
//!
//! Three families are distinguished internally through [`ErrorKind`]:
//!
//! * **Validation**: client-side, pre-flight. These never reach the network.
//! * **Transport**: the request did not produce a usable 2xx JSON body.
//! * **Application**: the server answered 2xx but reported an error, or sent
//!   no answers.
//!
//! The user sees the same thing for all three (message, retry manually); the
//! tag only feeds logging.

use std::fmt;
use thiserror::Error;

/// A single client-side rule violation.
///
/// File rules come from [`crate::controller::SubmissionController::select_file`];
/// presence rules from [`crate::controller::SubmissionController::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Media type of the candidate is not exactly `application/pdf`.
    #[error("Please select a PDF file")]
    UnsupportedFileType { media_type: String },

    /// Candidate exceeds [`crate::file::MAX_FILE_SIZE`].
    #[error("File size must be less than 10MB")]
    FileTooLarge { size: u64, max: u64 },

    /// Submit was attempted with no file selected.
    #[error("Please select a PDF file")]
    NoFileSelected,

    /// Submit was attempted with an empty questions field.
    #[error("Please enter at least one question")]
    NoQuestions,
}

/// Coarse classification of a [`DocQaError`], used for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Application,
    Config,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Application => "application",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// All errors returned by the docqa-client library.
#[derive(Debug, Error)]
pub enum DocQaError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// One or more client-side rules failed. Messages are joined by line
    /// breaks, in the order the rules were checked.
    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    // ── Transport errors ──────────────────────────────────────────────────
    /// The service could not be reached (DNS, refused connection, TLS, …).
    #[error("Could not reach the server at '{url}': {reason}")]
    Unreachable { url: String, reason: String },

    /// The request did not complete within the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The service answered with a non-2xx status. `body` is the raw
    /// response text, verbatim.
    #[error("Server error ({status}): {body}")]
    HttpStatus { status: u16, body: String },

    /// A 2xx body that is not the expected JSON shape.
    #[error("Invalid response from server: {reason}")]
    InvalidResponse { reason: String },

    /// The selected file's bytes could not be read when building the request.
    #[error("Failed to read '{name}': {source}")]
    FileRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Application errors ────────────────────────────────────────────────
    /// A 2xx body carried a truthy `error` field; the message is its value.
    #[error("{message}")]
    Application { message: String },

    /// A 2xx body with a missing or empty `answers` array.
    #[error("No answers received from the server")]
    NoAnswers,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocQaError {
    /// Classify this error for logging.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocQaError::Validation(_) => ErrorKind::Validation,
            DocQaError::Unreachable { .. }
            | DocQaError::Timeout { .. }
            | DocQaError::HttpStatus { .. }
            | DocQaError::InvalidResponse { .. }
            | DocQaError::FileRead { .. } => ErrorKind::Transport,
            DocQaError::Application { .. } | DocQaError::NoAnswers => ErrorKind::Application,
            DocQaError::InvalidConfig(_) => ErrorKind::Config,
            DocQaError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The individual rule violations, if this is a validation error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            DocQaError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<ValidationError> for DocQaError {
    fn from(e: ValidationError) -> Self {
        DocQaError::Validation(vec![e])
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_join_with_newlines() {
        let e = DocQaError::Validation(vec![
            ValidationError::NoFileSelected,
            ValidationError::NoQuestions,
        ]);
        assert_eq!(
            e.to_string(),
            "Please select a PDF file\nPlease enter at least one question"
        );
        assert_eq!(e.kind(), ErrorKind::Validation);
    }

    #[test]
    fn http_status_display_includes_code_and_body() {
        let e = DocQaError::HttpStatus {
            status: 502,
            body: "upstream down".into(),
        };
        let msg = e.to_string();
        assert_eq!(msg, "Server error (502): upstream down");
        assert_eq!(e.kind(), ErrorKind::Transport);
    }

    #[test]
    fn application_error_is_message_verbatim() {
        let e = DocQaError::Application {
            message: "bad file".into(),
        };
        assert_eq!(e.to_string(), "bad file");
        assert_eq!(e.kind(), ErrorKind::Application);
        assert_eq!(DocQaError::NoAnswers.kind(), ErrorKind::Application);
    }

    #[test]
    fn single_validation_error_converts() {
        let e: DocQaError = ValidationError::FileTooLarge {
            size: 11 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        }
        .into();
        assert_eq!(e.validation_errors().len(), 1);
        assert!(e.to_string().contains("10MB"), "got: {e}");
    }

    #[test]
    fn timeout_display() {
        let e = DocQaError::Timeout {
            url: "http://localhost:10000/api/v1/hackrx/upload".into(),
            secs: 60,
        };
        assert!(e.to_string().contains("60s"));
        assert_eq!(e.kind(), ErrorKind::Transport);
    }
}
