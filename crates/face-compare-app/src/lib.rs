#![warn(missing_docs)]
//! # face-compare-app
//!
//! ## Purpose
//! Orchestrates file acquisition, preview encoding, comparison requests, and
//! display projection for the `face-compare` terminal shell.
//!
//! ## Responsibilities
//! - Resolve endpoints from flags, environment, and defaults.
//! - Own the single [`SubmissionController`] and drive it from one event loop.
//! - Run preview encodes and comparison requests on worker threads that each
//!   report back with exactly one [`WorkflowEvent`].
//! - Project controller state into a [`DisplayState`] on demand.
//!
//! ## Data flow
//! Shell command -> [`Workflow::select`] / [`Workflow::submit`] -> worker
//! thread -> [`WorkflowEvent`] on the shared channel ->
//! [`Workflow::handle_event`] -> controller transition -> [`Workflow::display`].
//!
//! ## Ownership and lifetimes
//! The workflow owns the controller; workers receive owned file handles and a
//! cloned sender, never a reference into workflow state.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Comparison failures are not
//! errors at this level: they resolve the submission and show up in the
//! display state.
//!
//! ## Security and privacy notes
//! Image bytes stay in memory and are only sent to the configured comparison
//! endpoint.

pub mod command;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use face_compare_acquire::{AcquireError, FileSource};
use face_compare_client::{
    ClientError, ComparisonClient, ComparisonTransport, DEFAULT_COMPARE_ENDPOINT,
    DEFAULT_HEALTH_ENDPOINT,
};
use face_compare_contract::HealthResponse;
use face_compare_core::{ComparisonError, ComparisonOutcome, Preview, Role, SubmissionPhase};
use face_compare_preview::PreviewError;
use face_compare_session::{
    PendingComparison, PreviewJob, SessionError, SubmissionController, SubmitOutcome,
};
use face_compare_ui::{DisplayState, project};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use command::{CommandError, HELP_TEXT, ShellCommand};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("FACE_COMPARE_VERSION");

/// Environment variable overriding the comparison endpoint.
pub const COMPARE_ENDPOINT_ENV: &str = "FACE_COMPARE_ENDPOINT";

/// Environment variable overriding the health endpoint.
pub const HEALTH_ENDPOINT_ENV: &str = "FACE_COMPARE_HEALTH_ENDPOINT";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Resolved endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Comparison endpoint URL.
    pub compare_endpoint: String,
    /// Health endpoint URL.
    pub health_endpoint: String,
}

impl AppConfig {
    /// Resolves endpoints from flags, then process environment, then defaults.
    pub fn resolve(compare_flag: Option<String>, health_flag: Option<String>) -> Self {
        Self::resolve_with(compare_flag, health_flag, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::resolve`] with an injectable environment lookup.
    ///
    /// Blank values count as unset at every layer.
    pub fn resolve_with<F>(compare_flag: Option<String>, health_flag: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |flag: Option<String>, key: &str, default: &str| {
            non_blank(flag)
                .or_else(|| non_blank(lookup(key)))
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            compare_endpoint: pick(compare_flag, COMPARE_ENDPOINT_ENV, DEFAULT_COMPARE_ENDPOINT),
            health_endpoint: pick(health_flag, HEALTH_ENDPOINT_ENV, DEFAULT_HEALTH_ENDPOINT),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            compare_endpoint: DEFAULT_COMPARE_ENDPOINT.to_string(),
            health_endpoint: DEFAULT_HEALTH_ENDPOINT.to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum WorkflowEvent {
    /// A preview worker finished.
    PreviewReady {
        /// Slot the preview was encoded for.
        role: Role,
        /// Slot generation the job was emitted with.
        generation: u64,
        /// Encoded preview or the reason it is unavailable.
        outcome: Result<Preview, PreviewError>,
    },
    /// A comparison worker finished.
    ComparisonFinished {
        /// Submission the outcome belongs to.
        submission_id: u64,
        /// Score report or categorized failure.
        outcome: ComparisonOutcome,
    },
    /// One line typed by the user.
    Input(String),
    /// Standard input reached end of file.
    InputClosed,
}

/// What [`Workflow::handle_event`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Controller state changed.
    Applied,
    /// Completion belonged to a replaced file or an old submission.
    Stale,
    /// User input for the driver to interpret.
    Input(String),
    /// Input stream ended.
    InputClosed,
}

/// Result of a submit request at the workflow level.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStatus {
    /// Request is running on a worker.
    Started {
        /// Identifier of the in-flight submission.
        submission_id: u64,
    },
    /// A slot was empty; no request was sent.
    Rejected(ComparisonError),
    /// A request is already running; nothing changed.
    AlreadyInFlight,
    /// A result is on display; reset first.
    ResultShown,
}

/// Event-loop owner of the comparison session.
pub struct Workflow {
    controller: SubmissionController,
    client: ComparisonClient,
    source: Arc<dyn FileSource>,
    events: Sender<WorkflowEvent>,
    previews_in_flight: usize,
}

impl Workflow {
    /// Creates a workflow bound to `config`.
    ///
    /// # Errors
    /// Returns [`AppError::Client`] when an endpoint is invalid.
    pub fn new(
        config: &AppConfig,
        transport: Arc<dyn ComparisonTransport>,
        source: Arc<dyn FileSource>,
        events: Sender<WorkflowEvent>,
    ) -> Result<Self, AppError> {
        let client = ComparisonClient::new(
            &config.compare_endpoint,
            &config.health_endpoint,
            transport,
        )?;
        info!(
            stage = "app",
            action = "configured",
            compare_endpoint = %client.compare_endpoint(),
            health_endpoint = %client.health_endpoint(),
            version = APP_VERSION,
        );

        Ok(Self {
            controller: SubmissionController::new(),
            client,
            source,
            events,
            previews_in_flight: 0,
        })
    }

    /// Read-only view of the controller.
    pub fn controller(&self) -> &SubmissionController {
        &self.controller
    }

    /// Loads `locator` into `role` and starts its preview encode.
    ///
    /// # Errors
    /// Returns [`AppError::Acquire`] when the file cannot be read and
    /// [`AppError::Session`] when the slot is locked.
    pub fn select(&mut self, role: Role, locator: &str) -> Result<(), AppError> {
        let file = self.source.pick(role, locator)?;
        let job = self.controller.select_file(role, file)?;
        self.spawn_preview(job);
        Ok(())
    }

    /// Empties `role`.
    ///
    /// # Errors
    /// Returns [`AppError::Session`] when the slot is locked.
    pub fn clear(&mut self, role: Role) -> Result<(), AppError> {
        self.controller.clear(role)?;
        Ok(())
    }

    /// Requests a comparison of the current pair.
    pub fn submit(&mut self) -> SubmitStatus {
        match self.controller.request_submit() {
            SubmitOutcome::Started(pending) => {
                let submission_id = pending.submission_id;
                self.spawn_comparison(pending);
                SubmitStatus::Started { submission_id }
            }
            SubmitOutcome::Rejected(error) => SubmitStatus::Rejected(error),
            SubmitOutcome::AlreadyInFlight => SubmitStatus::AlreadyInFlight,
            SubmitOutcome::ResultShown => SubmitStatus::ResultShown,
        }
    }

    /// Returns to the initial empty state.
    ///
    /// # Errors
    /// Returns [`AppError::Session`] while a comparison is in flight.
    pub fn reset(&mut self) -> Result<(), AppError> {
        self.controller.reset()?;
        Ok(())
    }

    /// Probes the service health endpoint on the calling thread.
    ///
    /// # Errors
    /// Returns [`AppError::Client`] when the probe fails.
    pub fn health(&self) -> Result<HealthResponse, AppError> {
        Ok(self.client.health()?)
    }

    /// Applies one event from the shared channel.
    pub fn handle_event(&mut self, event: WorkflowEvent) -> EventOutcome {
        match event {
            WorkflowEvent::PreviewReady {
                role,
                generation,
                outcome,
            } => {
                self.previews_in_flight = self.previews_in_flight.saturating_sub(1);
                if self.controller.apply_preview(role, generation, outcome) {
                    EventOutcome::Applied
                } else {
                    EventOutcome::Stale
                }
            }
            WorkflowEvent::ComparisonFinished {
                submission_id,
                outcome,
            } => match self.controller.resolve(submission_id, outcome) {
                Ok(_) => EventOutcome::Applied,
                Err(_) => EventOutcome::Stale,
            },
            WorkflowEvent::Input(line) => EventOutcome::Input(line),
            WorkflowEvent::InputClosed => EventOutcome::InputClosed,
        }
    }

    /// Returns `true` while a comparison or a preview encode is outstanding.
    pub fn is_busy(&self) -> bool {
        self.controller.phase() == SubmissionPhase::Submitting || self.previews_in_flight > 0
    }

    /// Pumps `events` until no worker is outstanding.
    ///
    /// Meant for drivers without an input thread; input events received
    /// meanwhile are discarded.
    ///
    /// # Errors
    /// Returns [`AppError::ChannelClosed`] when every sender is gone while
    /// work is still outstanding.
    pub fn wait_for_settled(&mut self, events: &Receiver<WorkflowEvent>) -> Result<(), AppError> {
        while self.is_busy() {
            let event = events.recv().map_err(|_| AppError::ChannelClosed)?;
            if let EventOutcome::Input(line) = self.handle_event(event) {
                debug!(stage = "app", action = "input_discarded", line = %line);
            }
        }
        Ok(())
    }

    /// Display snapshot of the current state.
    pub fn display(&self) -> DisplayState {
        project(&self.controller, APP_VERSION)
    }

    fn spawn_preview(&mut self, job: PreviewJob) {
        let role = job.role;
        let generation = job.generation;
        let events = self.events.clone();

        let spawned = thread::Builder::new()
            .name(format!("preview-{role}"))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    face_compare_preview::encode(&job.file)
                }))
                .unwrap_or_else(|payload| {
                    Err(PreviewError::Decode(format!(
                        "preview encoder panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                });
                let _ = events.send(WorkflowEvent::PreviewReady {
                    role: job.role,
                    generation: job.generation,
                    outcome,
                });
            });

        match spawned {
            Ok(_) => self.previews_in_flight += 1,
            Err(error) => {
                warn!(stage = "preview", action = "worker_spawn_failed", role = role.as_str(), %error);
                self.controller.apply_preview(
                    role,
                    generation,
                    Err(PreviewError::Decode(format!("preview worker unavailable: {error}"))),
                );
            }
        }
    }

    fn spawn_comparison(&mut self, pending: PendingComparison) {
        let submission_id = pending.submission_id;
        let client = self.client.clone();
        let events = self.events.clone();

        let spawned = thread::Builder::new()
            .name(format!("compare-{submission_id}"))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    client.compare(&pending.before, &pending.after)
                }))
                .unwrap_or_else(|payload| {
                    Err(ComparisonError::network(format!(
                        "comparison request aborted: {}",
                        panic_message(payload.as_ref())
                    )))
                });
                let _ = events.send(WorkflowEvent::ComparisonFinished {
                    submission_id: pending.submission_id,
                    outcome,
                });
            });

        if let Err(error) = spawned {
            warn!(stage = "compare", action = "worker_spawn_failed", submission_id, %error);
            let outcome = Err(ComparisonError::network(format!(
                "could not start comparison request: {error}"
            )));
            if let Err(error) = self.controller.resolve(submission_id, outcome) {
                warn!(stage = "compare", action = "resolve_failed", %error);
            }
        }
    }
}

// Workers report exactly once; a panic becomes a failed outcome.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// File could not be acquired.
    #[error("acquire error: {0}")]
    Acquire(#[from] AcquireError),
    /// Transition refused by the controller.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    /// Client construction or health probe failed.
    #[error("client error: {0}")]
    Client(#[from] ClientError),
    /// Event channel closed while work was outstanding.
    #[error("event channel closed before all workers reported")]
    ChannelClosed,
}
