#![warn(missing_docs)]
//! # face-compare-session
//!
//! ## Purpose
//! Implements the submission controller: the one state object that owns both
//! image slots and the comparison lifecycle.
//!
//! ## Responsibilities
//! - Hold zero or one file per role, with its preview state.
//! - Enforce the `idle -> submitting -> succeeded | failed -> idle` lifecycle.
//! - Refuse to start a request unless both slots are filled.
//! - Drop completions that belong to replaced files or stale submissions.
//!
//! ## Data flow
//! Driver picks a file -> [`SubmissionController::select_file`] returns a
//! [`PreviewJob`] -> worker encodes -> [`SubmissionController::apply_preview`].
//! Driver requests submit -> [`SubmitOutcome::Started`] carries a
//! [`PendingComparison`] -> worker runs the client ->
//! [`SubmissionController::resolve`].
//!
//! ## Ownership and lifetimes
//! The controller is a plain owned value. The driver holds it and passes
//! `&mut` into each transition; jobs carry cheap clones of the file handles
//! so workers never borrow controller state.
//!
//! ## Error model
//! Illegal transitions return [`SessionError`] and leave state unchanged.
//! Comparison failures are stored state, not errors.
//!
//! ## Example
//! ```rust
//! use face_compare_core::{ErrorCategory, SubmissionPhase};
//! use face_compare_session::{SubmissionController, SubmitOutcome};
//!
//! let mut controller = SubmissionController::new();
//! let SubmitOutcome::Rejected(error) = controller.request_submit() else {
//!     panic!("empty slots must be rejected");
//! };
//! assert_eq!(error.category, ErrorCategory::Validation);
//! assert_eq!(controller.phase(), SubmissionPhase::Idle);
//! ```

use face_compare_core::{
    ComparisonError, ComparisonOutcome, ComparisonResult, MISSING_FILES_MESSAGE, Preview, Role,
    SelectedFile, SubmissionPhase,
};
use face_compare_preview::PreviewError;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Preview status of one filled slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// Encoding has been requested but not finished.
    Pending,
    /// Preview is ready for display.
    Ready(Preview),
    /// File could not be rendered; it is still submitted as-is.
    Unavailable(String),
}

impl PreviewState {
    /// Returns the preview when ready.
    pub fn preview(&self) -> Option<&Preview> {
        match self {
            PreviewState::Ready(preview) => Some(preview),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    file: SelectedFile,
    preview: PreviewState,
    generation: u64,
}

/// Preview encoding work emitted by a selection.
#[derive(Debug, Clone)]
pub struct PreviewJob {
    /// Slot the preview belongs to.
    pub role: Role,
    /// Slot generation at emission; completions for older generations are dropped.
    pub generation: u64,
    /// File to encode.
    pub file: SelectedFile,
}

/// Comparison request emitted when a submit is accepted.
#[derive(Debug, Clone)]
pub struct PendingComparison {
    /// Identifier the resolution must echo back.
    pub submission_id: u64,
    /// File in the before slot at submit time.
    pub before: SelectedFile,
    /// File in the after slot at submit time.
    pub after: SelectedFile,
}

/// Result of a submit request.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Phase moved to `submitting`; the driver must run this request.
    Started(PendingComparison),
    /// A slot was empty; the validation error is stored and no request runs.
    Rejected(ComparisonError),
    /// A request is already in flight; nothing changed.
    AlreadyInFlight,
    /// A result is on display; reset before comparing again.
    ResultShown,
}

/// The session-wide submission state machine.
#[derive(Debug, Clone)]
pub struct SubmissionController {
    phase: SubmissionPhase,
    before: Option<Slot>,
    after: Option<Slot>,
    result: Option<ComparisonResult>,
    error: Option<ComparisonError>,
    next_generation: u64,
    next_submission_id: u64,
    in_flight: Option<u64>,
}

impl SubmissionController {
    /// Creates a controller in `idle` with empty slots.
    pub fn new() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            before: None,
            after: None,
            result: None,
            error: None,
            next_generation: 1,
            next_submission_id: 1,
            in_flight: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// File held for `role`.
    pub fn file(&self, role: Role) -> Option<&SelectedFile> {
        self.slot(role).map(|slot| &slot.file)
    }

    /// Preview state for `role`, `None` when the slot is empty.
    pub fn preview(&self, role: Role) -> Option<&PreviewState> {
        self.slot(role).map(|slot| &slot.preview)
    }

    /// Result of the last successful comparison.
    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    /// Last stored error.
    pub fn error(&self) -> Option<&ComparisonError> {
        self.error.as_ref()
    }

    /// Returns `true` when both slots hold a file.
    pub fn has_both_files(&self) -> bool {
        self.before.is_some() && self.after.is_some()
    }

    /// Returns `true` when a submit would start a request.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Idle | SubmissionPhase::Failed)
            && self.has_both_files()
    }

    /// Places `file` into `role`, discarding any previous file and preview.
    ///
    /// # Errors
    /// Returns [`SessionError::SubmissionInFlight`] while submitting and
    /// [`SessionError::ResultShown`] while a result is displayed.
    pub fn select_file(
        &mut self,
        role: Role,
        file: SelectedFile,
    ) -> Result<PreviewJob, SessionError> {
        self.ensure_editable()?;

        let generation = self.bump_generation();
        let file = file.with_role(role);
        let replaced = self
            .slot_mut(role)
            .replace(Slot {
                file: file.clone(),
                preview: PreviewState::Pending,
                generation,
            })
            .is_some();

        info!(
            stage = "session",
            action = "file_selected",
            role = role.as_str(),
            size_bytes = file.size_bytes(),
            replaced,
            generation,
        );

        Ok(PreviewJob {
            role,
            generation,
            file,
        })
    }

    /// Removes the file and preview for `role`; the other slot is untouched.
    ///
    /// # Errors
    /// Same as [`SubmissionController::select_file`].
    pub fn clear(&mut self, role: Role) -> Result<(), SessionError> {
        self.ensure_editable()?;

        let removed = self.slot_mut(role).take().is_some();
        info!(
            stage = "session",
            action = "file_cleared",
            role = role.as_str(),
            removed,
        );
        Ok(())
    }

    /// Stores a finished preview encode.
    ///
    /// Returns `false` when the slot was cleared or refilled after the job was
    /// emitted; the completion is dropped in that case.
    pub fn apply_preview(
        &mut self,
        role: Role,
        generation: u64,
        outcome: Result<Preview, PreviewError>,
    ) -> bool {
        let Some(slot) = self.slot_mut(role).as_mut() else {
            debug!(stage = "session", action = "preview_dropped", role = role.as_str(), generation);
            return false;
        };
        if slot.generation != generation {
            debug!(stage = "session", action = "preview_dropped", role = role.as_str(), generation);
            return false;
        }

        slot.preview = match outcome {
            Ok(preview) => PreviewState::Ready(preview),
            Err(error) => {
                warn!(
                    stage = "session",
                    action = "preview_unavailable",
                    role = role.as_str(),
                    %error,
                );
                PreviewState::Unavailable(error.to_string())
            }
        };
        true
    }

    /// Handles an explicit submit request.
    pub fn request_submit(&mut self) -> SubmitOutcome {
        match self.phase {
            SubmissionPhase::Submitting => {
                debug!(stage = "session", action = "submit_ignored", "request already in flight");
                return SubmitOutcome::AlreadyInFlight;
            }
            SubmissionPhase::Succeeded => return SubmitOutcome::ResultShown,
            SubmissionPhase::Idle | SubmissionPhase::Failed => {}
        }

        let (Some(before), Some(after)) = (&self.before, &self.after) else {
            let error = ComparisonError::validation(MISSING_FILES_MESSAGE);
            self.phase = SubmissionPhase::Idle;
            self.error = Some(error.clone());
            info!(stage = "session", action = "submit_rejected", message = %error.message);
            return SubmitOutcome::Rejected(error);
        };

        let submission_id = self.next_submission_id;
        self.next_submission_id += 1;
        let pending = PendingComparison {
            submission_id,
            before: before.file.clone(),
            after: after.file.clone(),
        };

        self.error = None;
        self.result = None;
        self.in_flight = Some(submission_id);
        self.phase = SubmissionPhase::Submitting;
        info!(stage = "session", action = "submitting", submission_id);

        SubmitOutcome::Started(pending)
    }

    /// Applies the single resolution of an in-flight comparison.
    ///
    /// # Errors
    /// Returns [`SessionError::StaleResolution`] when `submission_id` is not
    /// the request currently in flight; state is left unchanged.
    pub fn resolve(
        &mut self,
        submission_id: u64,
        outcome: ComparisonOutcome,
    ) -> Result<SubmissionPhase, SessionError> {
        if self.phase != SubmissionPhase::Submitting || self.in_flight != Some(submission_id) {
            warn!(stage = "session", action = "resolution_dropped", submission_id);
            return Err(SessionError::StaleResolution { submission_id });
        }
        self.in_flight = None;

        match outcome {
            Ok(report) => {
                let result = ComparisonResult::from_report(report);
                if result.verdict_diverges() {
                    warn!(
                        stage = "session",
                        action = "verdict_divergence",
                        confidence = result.raw_confidence,
                        "server label disagrees with the client threshold"
                    );
                }
                info!(
                    stage = "session",
                    action = "succeeded",
                    submission_id,
                    matched = result.matched,
                );
                self.result = Some(result);
                self.phase = SubmissionPhase::Succeeded;
            }
            Err(error) => {
                info!(
                    stage = "session",
                    action = "failed",
                    submission_id,
                    category = error.category.as_str(),
                );
                self.error = Some(error);
                self.phase = SubmissionPhase::Failed;
            }
        }

        Ok(self.phase)
    }

    /// Returns to `idle`, clearing both slots, result, and error.
    ///
    /// # Errors
    /// Returns [`SessionError::SubmissionInFlight`] while submitting; an
    /// in-flight request cannot be cancelled.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.phase == SubmissionPhase::Submitting {
            return Err(SessionError::SubmissionInFlight);
        }

        self.before = None;
        self.after = None;
        self.result = None;
        self.error = None;
        self.phase = SubmissionPhase::Idle;
        info!(stage = "session", action = "reset");
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        match self.phase {
            SubmissionPhase::Submitting => Err(SessionError::SubmissionInFlight),
            SubmissionPhase::Succeeded => Err(SessionError::ResultShown),
            SubmissionPhase::Idle | SubmissionPhase::Failed => Ok(()),
        }
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    fn slot(&self, role: Role) -> Option<&Slot> {
        match role {
            Role::Before => self.before.as_ref(),
            Role::After => self.after.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<Slot> {
        match role {
            Role::Before => &mut self.before,
            Role::After => &mut self.after,
        }
    }
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new()
    }
}

/// Illegal transition errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Operation is not allowed while a comparison is in flight.
    #[error("a comparison is already in progress")]
    SubmissionInFlight,
    /// Operation is not allowed while a result is shown; reset first.
    #[error("a result is displayed; reset before changing files")]
    ResultShown,
    /// Resolution does not match the in-flight submission.
    #[error("resolution for submission {submission_id} is stale")]
    StaleResolution {
        /// Identifier echoed by the resolution.
        submission_id: u64,
    },
}
