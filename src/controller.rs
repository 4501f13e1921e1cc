//! The submission workflow and its state machine.
//!
//! ```text
//!            select_file / drop_files / remove_file
//!                      (any non-busy state)
//!
//!   Idle ──submit──▶ Validating ──ok──▶ InFlight ──answers──▶ ShowingResults
//!    ▲                   │                 │
//!    │                   │ rule violated   │ transport / application error,
//!    │                   ▼                 ▼ or zero answers
//!    └── valid file ── ShowingError ◀──────┘
//! ```
//!
//! `submit` takes `&mut self`, so a controller can have at most one request
//! outstanding; a second submission cannot even be expressed while the first
//! is awaited. Leaving `InFlight` is tied to a guard value, which restores the
//! submit affordance on every exit path, including the submit future being
//! dropped before completion.

use crate::client::{AnswersResponse, QaBackend, RemoteQaClient};
use crate::config::ClientConfig;
use crate::error::{DocQaError, ErrorKind, ValidationError};
use crate::file::FileCandidate;
use crate::observer::{NoopObserver, SharedObserver, SubmissionObserver};
use crate::questions::QuestionList;
use crate::render::{render_answers, RenderedAnswers};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the controller is in a submission cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing shown; ready to submit.
    Idle,
    /// Checking the inputs of a submission.
    Validating,
    /// The request is outstanding. Submitting is disabled.
    InFlight,
    /// The last submission produced at least one answer.
    ShowingResults {
        response: AnswersResponse,
        rendered: RenderedAnswers,
    },
    /// The last action failed. `message` is what the user sees.
    ShowingError { message: String, kind: ErrorKind },
}

impl SubmissionState {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::InFlight => "in-flight",
            SubmissionState::ShowingResults { .. } => "showing-results",
            SubmissionState::ShowingError { .. } => "showing-error",
        }
    }

    pub fn results_visible(&self) -> bool {
        matches!(self, SubmissionState::ShowingResults { .. })
    }

    pub fn error_visible(&self) -> bool {
        matches!(self, SubmissionState::ShowingError { .. })
    }

    pub fn loading_visible(&self) -> bool {
        matches!(self, SubmissionState::InFlight)
    }

    pub fn submit_enabled(&self) -> bool {
        !self.loading_visible()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionState::ShowingError { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn rendered(&self) -> Option<&RenderedAnswers> {
        match self {
            SubmissionState::ShowingResults { rendered, .. } => Some(rendered),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&AnswersResponse> {
        match self {
            SubmissionState::ShowingResults { response, .. } => Some(response),
            _ => None,
        }
    }
}

fn transition(
    state: &mut SubmissionState,
    observer: &dyn SubmissionObserver,
    next: SubmissionState,
) {
    debug!("Submission state: {} → {}", state.name(), next.name());
    *state = next;
    observer.on_state_change(state);
}

/// Holds the controller in `InFlight` and guarantees it leaves that state.
///
/// [`InFlightGuard::finish`] sets the outcome state; if the guard is dropped
/// without finishing, the controller falls back to `Idle`.
struct InFlightGuard<'a> {
    state: &'a mut SubmissionState,
    observer: &'a dyn SubmissionObserver,
    settled: bool,
}

impl<'a> InFlightGuard<'a> {
    fn enter(state: &'a mut SubmissionState, observer: &'a dyn SubmissionObserver) -> Self {
        transition(state, observer, SubmissionState::InFlight);
        Self {
            state,
            observer,
            settled: false,
        }
    }

    fn finish(mut self, next: SubmissionState) {
        transition(&mut *self.state, self.observer, next);
        self.settled = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Submission abandoned while in flight");
            transition(&mut *self.state, self.observer, SubmissionState::Idle);
        }
    }
}

/// Owns the selected file and the submission state, and runs submissions
/// against a [`QaBackend`].
pub struct SubmissionController<B> {
    backend: B,
    selected_file: Option<FileCandidate>,
    state: SubmissionState,
    observer: SharedObserver,
}

impl SubmissionController<RemoteQaClient> {
    /// Controller talking HTTP to the service described by `config`.
    pub fn from_config(config: ClientConfig) -> Result<Self, DocQaError> {
        Ok(Self::new(RemoteQaClient::new(config)?))
    }
}

impl<B: QaBackend> SubmissionController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            selected_file: None,
            state: SubmissionState::Idle,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replace the observer notified of state changes and file events.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn selected_file(&self) -> Option<&FileCandidate> {
        self.selected_file.as_ref()
    }

    /// The file-info label, `"<name> (<size>)"`, when a file is selected.
    pub fn file_label(&self) -> Option<String> {
        self.selected_file.as_ref().map(FileCandidate::label)
    }

    fn set_state(&mut self, next: SubmissionState) {
        transition(&mut self.state, self.observer.as_ref(), next);
    }

    fn show_error(&mut self, err: &DocQaError) {
        self.set_state(SubmissionState::ShowingError {
            message: err.to_string(),
            kind: err.kind(),
        });
    }

    /// Make `candidate` the selected file if it is a PDF within the size limit.
    ///
    /// A rejected candidate leaves the current selection untouched and shows
    /// the rule's message. An accepted one replaces the selection and hides
    /// any error being shown; results already on display stay.
    pub fn select_file(&mut self, candidate: FileCandidate) -> Result<(), ValidationError> {
        if let Err(e) = candidate.validate() {
            warn!("Rejected file '{}': {:?}", candidate.name(), e);
            self.show_error(&DocQaError::from(e.clone()));
            return Err(e);
        }

        info!("Selected file {}", candidate.label());
        self.observer.on_file_selected(&candidate);
        self.selected_file = Some(candidate);
        if self.state.error_visible() {
            self.set_state(SubmissionState::Idle);
        }
        Ok(())
    }

    /// Handle a drop of one or more files. Only the first is considered; an
    /// empty drop does nothing.
    pub fn drop_files<I>(&mut self, files: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = FileCandidate>,
    {
        match files.into_iter().next() {
            Some(first) => self.select_file(first),
            None => Ok(()),
        }
    }

    /// Clear the selection. Nothing about the removed file is kept, so the
    /// same file can be selected again.
    pub fn remove_file(&mut self) {
        if let Some(file) = self.selected_file.take() {
            debug!("Removed file '{}'", file.name());
        }
        self.observer.on_file_removed();
    }

    /// Run one submission cycle with the raw contents of the questions field.
    ///
    /// Emptiness is judged on `raw_questions` itself, so whitespace-only text
    /// passes validation and sends an empty question list.
    ///
    /// # Errors
    /// Validation errors (all violated rules, combined) are returned before
    /// any request is made. Transport and application errors come from the
    /// backend; a response with no answers is [`DocQaError::NoAnswers`]. In
    /// every case the state ends in `ShowingError` with the same message.
    pub async fn submit(&mut self, raw_questions: &str) -> Result<RenderedAnswers, DocQaError> {
        let questions = QuestionList::parse(raw_questions);
        self.set_state(SubmissionState::Validating);

        let mut violations = Vec::new();
        if self.selected_file.is_none() {
            violations.push(ValidationError::NoFileSelected);
        }
        if raw_questions.is_empty() {
            violations.push(ValidationError::NoQuestions);
        }
        if !violations.is_empty() {
            let err = DocQaError::Validation(violations);
            warn!("Submission rejected: {}", err.to_string().replace('\n', "; "));
            self.show_error(&err);
            return Err(err);
        }

        let Self {
            backend,
            selected_file,
            state,
            observer,
        } = self;
        let Some(file) = selected_file.as_ref() else {
            return Err(DocQaError::Internal("selection vanished during validation".into()));
        };

        let start = Instant::now();
        info!(
            "Submitting '{}' with {} question(s)",
            file.name(),
            questions.len()
        );
        let guard = InFlightGuard::enter(state, observer.as_ref());

        let outcome = backend.ask(file, &questions).await.and_then(|response| {
            if response.answers.is_empty() {
                Err(DocQaError::NoAnswers)
            } else {
                Ok(response)
            }
        });
        let elapsed = start.elapsed();

        match outcome {
            Ok(response) => {
                let rendered = render_answers(&response);
                info!("Received {} answer(s) in {:?}", rendered.count, elapsed);
                guard.finish(SubmissionState::ShowingResults {
                    response,
                    rendered: rendered.clone(),
                });
                Ok(rendered)
            }
            Err(err) => {
                warn!(kind = %err.kind(), "Submission failed after {:?}: {}", elapsed, err);
                guard.finish(SubmissionState::ShowingError {
                    message: err.to_string(),
                    kind: err.kind(),
                });
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AnswerItem;
    use crate::file::{MAX_FILE_SIZE, PDF_MEDIA_TYPE};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    type Reply = Box<dyn Fn() -> Result<AnswersResponse, DocQaError> + Send + Sync>;

    /// Backend returning a canned reply and recording what it was asked.
    struct FakeBackend {
        calls: AtomicUsize,
        last_questions: Mutex<Option<QuestionList>>,
        reply: Reply,
    }

    impl FakeBackend {
        fn replying(reply: impl Fn() -> Result<AnswersResponse, DocQaError> + Send + Sync + 'static) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_questions: Mutex::new(None),
                reply: Box::new(reply),
            }
        }

        fn answering(n: usize) -> Self {
            Self::replying(move || {
                Ok(AnswersResponse {
                    answers: (1..=n)
                        .map(|i| AnswerItem {
                            question: Some(format!("Q{i}")),
                            answer: Some(format!("A{i}")),
                        })
                        .collect(),
                })
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QaBackend for FakeBackend {
        async fn ask(
            &self,
            _file: &FileCandidate,
            questions: &QuestionList,
        ) -> Result<AnswersResponse, DocQaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_questions.lock().unwrap() = Some(questions.clone());
            (self.reply)()
        }
    }

    /// Backend that never answers.
    struct HangingBackend;

    #[async_trait]
    impl QaBackend for HangingBackend {
        async fn ask(
            &self,
            _file: &FileCandidate,
            _questions: &QuestionList,
        ) -> Result<AnswersResponse, DocQaError> {
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct StateLog(Mutex<Vec<&'static str>>);

    impl SubmissionObserver for StateLog {
        fn on_state_change(&self, state: &SubmissionState) {
            self.0.lock().unwrap().push(state.name());
        }
    }

    fn pdf(name: &str) -> FileCandidate {
        FileCandidate::from_bytes(name, PDF_MEDIA_TYPE, b"%PDF-1.7".to_vec())
    }

    #[test]
    fn non_pdf_is_rejected_and_selection_kept() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        c.select_file(pdf("keep.pdf")).unwrap();

        for _ in 0..2 {
            let err = c
                .select_file(FileCandidate::from_bytes("x.png", "image/png", vec![1, 2, 3]))
                .unwrap_err();
            assert!(matches!(err, ValidationError::UnsupportedFileType { .. }));
            assert_eq!(c.selected_file().unwrap().name(), "keep.pdf");
            assert_eq!(c.state().error_message(), Some("Please select a PDF file"));
        }
    }

    #[test]
    fn media_type_must_match_exactly() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        let err = c
            .select_file(FileCandidate::from_bytes("a.pdf", "application/pdf; charset=binary", vec![]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedFileType { .. }));
        assert!(c.selected_file().is_none());
    }

    #[test]
    fn oversized_pdf_gets_size_message() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        let big = FileCandidate::from_bytes("big.pdf", PDF_MEDIA_TYPE, vec![0; MAX_FILE_SIZE as usize + 1]);
        let err = c.select_file(big).unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { .. }));
        assert!(c.selected_file().is_none());
        assert_eq!(
            c.state().error_message(),
            Some("File size must be less than 10MB")
        );
    }

    #[test]
    fn valid_selection_replaces_and_clears_error() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        let _ = c.select_file(FileCandidate::from_bytes("a.doc", "application/msword", vec![]));
        assert!(c.state().error_visible());

        c.select_file(pdf("first.pdf")).unwrap();
        assert_eq!(c.state(), &SubmissionState::Idle);
        c.select_file(FileCandidate::from_bytes("second.pdf", PDF_MEDIA_TYPE, vec![0; 1536]))
            .unwrap();
        assert_eq!(c.file_label().as_deref(), Some("second.pdf (1.5 KB)"));
    }

    #[tokio::test]
    async fn selection_while_results_shown() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        c.select_file(pdf("a.pdf")).unwrap();
        c.submit("q").await.unwrap();
        assert!(c.state().results_visible());

        // An accepted file keeps the results on display.
        c.select_file(pdf("b.pdf")).unwrap();
        assert!(c.state().results_visible());
        assert_eq!(c.selected_file().unwrap().name(), "b.pdf");

        // A rejected one replaces them with the error and keeps the selection.
        c.select_file(FileCandidate::from_bytes("c.png", "image/png", vec![0; 8]))
            .unwrap_err();
        assert!(c.state().error_visible());
        assert!(!c.state().results_visible());
        assert_eq!(c.selected_file().unwrap().name(), "b.pdf");
    }

    #[test]
    fn drop_uses_first_file_only() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        c.drop_files(vec![
            pdf("first.pdf"),
            FileCandidate::from_bytes("second.txt", "text/plain", vec![]),
        ])
        .unwrap();
        assert_eq!(c.selected_file().unwrap().name(), "first.pdf");
        assert!(!c.state().error_visible());

        c.drop_files(Vec::new()).unwrap();
        assert_eq!(c.selected_file().unwrap().name(), "first.pdf");
    }

    #[test]
    fn remove_file_clears_and_allows_reselect() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        c.select_file(pdf("same.pdf")).unwrap();
        c.remove_file();
        assert!(c.selected_file().is_none());
        assert!(c.file_label().is_none());
        c.select_file(pdf("same.pdf")).unwrap();
        assert_eq!(c.selected_file().unwrap().name(), "same.pdf");
    }

    #[tokio::test]
    async fn submit_without_file_makes_no_call() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        let err = c.submit("What is covered?").await.unwrap_err();
        assert_eq!(err.validation_errors(), [ValidationError::NoFileSelected]);
        assert!(err.to_string().contains("Please select a PDF file"));
        assert_eq!(c.backend().calls(), 0);
        assert!(c.state().error_visible());
    }

    #[tokio::test]
    async fn submit_with_empty_text_makes_no_call() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        c.select_file(pdf("a.pdf")).unwrap();
        let err = c.submit("").await.unwrap_err();
        assert_eq!(err.validation_errors(), [ValidationError::NoQuestions]);
        assert!(err.to_string().contains("Please enter at least one question"));
        assert_eq!(c.backend().calls(), 0);
    }

    #[tokio::test]
    async fn all_violations_are_reported_together() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        let err = c.submit("").await.unwrap_err();
        assert_eq!(err.validation_errors().len(), 2);
        assert_eq!(
            c.state().error_message(),
            Some("Please select a PDF file\nPlease enter at least one question")
        );
        assert_eq!(c.backend().calls(), 0);
    }

    #[tokio::test]
    async fn whitespace_only_text_is_sent_as_empty_list() {
        let mut c = SubmissionController::new(FakeBackend::answering(1));
        c.select_file(pdf("a.pdf")).unwrap();
        c.submit(" \n \n").await.unwrap();
        assert_eq!(c.backend().calls(), 1);
        let sent = c.backend().last_questions.lock().unwrap().clone().unwrap();
        assert!(sent.is_empty());
    }

    #[tokio::test]
    async fn successful_submission_shows_results() {
        let log = Arc::new(StateLog::default());
        let mut c = SubmissionController::new(FakeBackend::answering(2))
            .with_observer(log.clone() as SharedObserver);
        c.select_file(pdf("a.pdf")).unwrap();

        let rendered = c.submit("Q1\n\nQ2 \n").await.unwrap();
        assert_eq!(rendered.count, 2);
        assert!(c.state().results_visible());
        assert!(!c.state().error_visible());
        assert!(c.state().submit_enabled());
        assert_eq!(c.state().rendered(), Some(&rendered));
        assert_eq!(c.backend().calls(), 1);
        assert_eq!(
            c.backend().last_questions.lock().unwrap().as_ref().unwrap().as_slice(),
            ["Q1", "Q2"]
        );
        assert_eq!(
            *log.0.lock().unwrap(),
            ["validating", "in-flight", "showing-results"]
        );
    }

    #[tokio::test]
    async fn empty_answers_is_an_error() {
        let mut c = SubmissionController::new(FakeBackend::answering(0));
        c.select_file(pdf("a.pdf")).unwrap();
        let err = c.submit("q").await.unwrap_err();
        assert!(matches!(err, DocQaError::NoAnswers));
        assert!(c.state().error_visible());
        assert!(!c.state().results_visible());
        assert_eq!(
            c.state().error_message(),
            Some("No answers received from the server")
        );
    }

    #[tokio::test]
    async fn backend_errors_end_in_error_state() {
        let mut c = SubmissionController::new(FakeBackend::replying(|| {
            Err(DocQaError::HttpStatus {
                status: 500,
                body: "boom".into(),
            })
        }));
        c.select_file(pdf("a.pdf")).unwrap();
        c.submit("q").await.unwrap_err();
        assert_eq!(
            c.state(),
            &SubmissionState::ShowingError {
                message: "Server error (500): boom".into(),
                kind: ErrorKind::Transport,
            }
        );
        assert!(c.state().submit_enabled());
        assert!(!c.state().loading_visible());
    }

    #[tokio::test]
    async fn new_submission_clears_previous_results() {
        let log = Arc::new(StateLog::default());
        let mut c = SubmissionController::new(FakeBackend::answering(1))
            .with_observer(log.clone() as SharedObserver);
        c.select_file(pdf("a.pdf")).unwrap();
        c.submit("q").await.unwrap();
        c.submit("q").await.unwrap();
        assert_eq!(c.backend().calls(), 2);
        assert_eq!(
            *log.0.lock().unwrap(),
            [
                "validating",
                "in-flight",
                "showing-results",
                "validating",
                "in-flight",
                "showing-results"
            ]
        );
    }

    #[tokio::test]
    async fn abandoned_submission_leaves_in_flight() {
        let mut c = SubmissionController::new(HangingBackend);
        c.select_file(pdf("a.pdf")).unwrap();
        let timed_out = tokio::time::timeout(Duration::from_millis(20), c.submit("q")).await;
        assert!(timed_out.is_err());
        assert_eq!(c.state(), &SubmissionState::Idle);
        assert!(c.state().submit_enabled());
    }
}
