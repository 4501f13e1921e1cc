//! Observer hook for submission lifecycle events.
//!
//! Register an [`Arc<dyn SubmissionObserver>`] with
//! [`crate::controller::SubmissionController::with_observer`] to follow the
//! state machine as it runs: a terminal spinner, a UI binding that shows and
//! hides panels, or a test recording the transition sequence.
//!
//! ```rust
//! use docqa_client::{SubmissionObserver, SubmissionState};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountInFlight(AtomicUsize);
//!
//! impl SubmissionObserver for CountInFlight {
//!     fn on_state_change(&self, state: &SubmissionState) {
//!         if matches!(state, SubmissionState::InFlight) {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//! ```

use crate::controller::SubmissionState;
use crate::file::FileCandidate;
use std::sync::Arc;

/// Receives controller events. All methods default to no-ops.
///
/// Callbacks run synchronously inside the controller call that caused them,
/// so they must return quickly.
pub trait SubmissionObserver: Send + Sync {
    /// Called after every state transition with the new state.
    fn on_state_change(&self, state: &SubmissionState) {
        let _ = state;
    }

    /// Called when a file passed validation and became the selection.
    fn on_file_selected(&self, file: &FileCandidate) {
        let _ = file;
    }

    /// Called when the selection was cleared.
    fn on_file_removed(&self) {}
}

/// The observer used when none is registered.
pub struct NoopObserver;

impl SubmissionObserver for NoopObserver {}

/// Convenience alias for the type stored in the controller.
pub type SharedObserver = Arc<dyn SubmissionObserver>;
