#![warn(missing_docs)]
//! # face-compare-ui
//!
//! ## Purpose
//! Projects the submission controller into a display-ready snapshot.
//!
//! ## Responsibilities
//! - Describe each slot (file name, preview status) for rendering.
//! - Decide whether the submit affordance is enabled and how it is labelled.
//! - Render the verdict and the `NN.NN%` confidence text.
//! - Render errors verbatim plus supplementary guidance hints.
//!
//! ## Data flow
//! [`SubmissionController`] -> [`project`] -> [`DisplayState`] ->
//! [`DisplayState::render_lines`] in the terminal shell.
//!
//! ## Ownership and lifetimes
//! `DisplayState` owns its strings so a renderer may keep it after the
//! controller moves on.
//!
//! ## Error model
//! Pure projection; nothing here fails.

use face_compare_contract::guidance_for;
use face_compare_core::{
    ComparisonError, ComparisonResult, ErrorCategory, Role, SubmissionPhase, Verdict,
};
use face_compare_session::{PreviewState, SubmissionController};

/// Submit button label while idle.
pub const SUBMIT_LABEL: &str = "Compare Images";
/// Submit button label while a request is in flight.
pub const SUBMITTING_LABEL: &str = "Processing...";
/// Reset affordance label on the result view.
pub const RESET_LABEL: &str = "Compare Another Pair";

/// Preview status as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewView {
    /// Slot is empty.
    Empty,
    /// Preview is still encoding.
    Loading,
    /// Preview is ready.
    Ready {
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
        /// MIME type of the decoded image.
        mime_type: String,
    },
    /// File is held but cannot be rendered.
    Unavailable(String),
}

/// One before/after slot as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    /// Slot role.
    pub role: Role,
    /// Selected file name.
    pub file_name: Option<String>,
    /// Selected file size.
    pub size_bytes: Option<usize>,
    /// Preview status.
    pub preview: PreviewView,
}

/// Result panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    /// Binary verdict.
    pub verdict: Verdict,
    /// Headline text ("Same Person" / "Different People").
    pub headline: String,
    /// Confidence as `NN.NN%`.
    pub confidence_text: String,
    /// Note shown when the server's own label disagrees.
    pub divergence_note: Option<String>,
    /// Whether server face crops are available.
    pub has_face_crops: bool,
}

/// Error panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    /// Error category.
    pub category: ErrorCategory,
    /// Message, verbatim.
    pub message: String,
    /// Supplementary guidance lines.
    pub hints: Vec<String>,
}

/// Complete display snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// App version shown in the header.
    pub version: String,
    /// Controller phase.
    pub phase: SubmissionPhase,
    /// Before slot.
    pub before: SlotView,
    /// After slot.
    pub after: SlotView,
    /// Whether submit may be pressed.
    pub submit_enabled: bool,
    /// Submit button label.
    pub submit_label: &'static str,
    /// Whether the reset affordance is shown.
    pub reset_visible: bool,
    /// Result panel, present only after success.
    pub result: Option<ResultView>,
    /// Error panel, present after a validation or request failure.
    pub error: Option<ErrorView>,
}

/// Builds the display snapshot for the current controller state.
pub fn project(controller: &SubmissionController, version: &str) -> DisplayState {
    let phase = controller.phase();
    let submitting = phase == SubmissionPhase::Submitting;

    DisplayState {
        version: version.to_string(),
        phase,
        before: slot_view(controller, Role::Before),
        after: slot_view(controller, Role::After),
        submit_enabled: controller.can_submit(),
        submit_label: if submitting {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        },
        reset_visible: phase.is_terminal(),
        result: controller.result().map(result_view),
        error: controller.error().map(error_view),
    }
}

fn slot_view(controller: &SubmissionController, role: Role) -> SlotView {
    let file = controller.file(role);
    let preview = match controller.preview(role) {
        None => PreviewView::Empty,
        Some(PreviewState::Pending) => PreviewView::Loading,
        Some(PreviewState::Ready(preview)) => PreviewView::Ready {
            width: preview.width,
            height: preview.height,
            mime_type: preview.mime_type.clone(),
        },
        Some(PreviewState::Unavailable(reason)) => PreviewView::Unavailable(reason.clone()),
    };

    SlotView {
        role,
        file_name: file.map(|file| file.name().to_string()),
        size_bytes: file.map(|file| file.size_bytes()),
        preview,
    }
}

/// Projects a comparison result.
pub fn result_view(result: &ComparisonResult) -> ResultView {
    let verdict = result.verdict();
    let divergence_note = result.verdict_diverges().then(|| {
        "The service's own label disagrees with this verdict; the confidence threshold may differ."
            .to_string()
    });

    ResultView {
        verdict,
        headline: verdict.label().to_string(),
        confidence_text: result.confidence_text(),
        divergence_note,
        has_face_crops: result.processed_faces.is_some(),
    }
}

/// Projects an error with its guidance hints.
pub fn error_view(error: &ComparisonError) -> ErrorView {
    ErrorView {
        category: error.category,
        message: error.message.clone(),
        hints: guidance_for(error)
            .into_iter()
            .map(|guidance| guidance.text())
            .collect(),
    }
}

impl DisplayState {
    /// Renders the snapshot as plain text lines.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("face-compare {} [{}]", self.version, self.phase)];

        for slot in [&self.before, &self.after] {
            lines.push(render_slot(slot));
        }

        if let Some(result) = &self.result {
            lines.push(result.headline.clone());
            lines.push(format!("Confidence: {}", result.confidence_text));
            if let Some(note) = &result.divergence_note {
                lines.push(format!("Note: {note}"));
            }
            if result.has_face_crops {
                lines.push("Processed face crops received.".to_string());
            }
        }

        if let Some(error) = &self.error {
            lines.push(format!("Error: {}", error.message));
            for hint in &error.hints {
                lines.push(format!("  - {hint}"));
            }
        }

        if self.phase != SubmissionPhase::Succeeded {
            let state = if self.submit_enabled { "ready" } else { "disabled" };
            lines.push(format!("[{}] {state}", self.submit_label));
        }
        if self.reset_visible {
            lines.push(format!("[{RESET_LABEL}] type `reset`"));
        }

        lines
    }
}

fn render_slot(slot: &SlotView) -> String {
    let Some(name) = &slot.file_name else {
        return format!("{:>6}: (no image)", slot.role);
    };

    let size = slot.size_bytes.unwrap_or_default();
    let preview = match &slot.preview {
        PreviewView::Empty => "no preview".to_string(),
        PreviewView::Loading => "preview loading".to_string(),
        PreviewView::Ready {
            width,
            height,
            mime_type,
        } => format!("{mime_type} {width}x{height}"),
        PreviewView::Unavailable(reason) => format!("no preview ({reason})"),
    };
    format!("{:>6}: {name} ({size} bytes, {preview})", slot.role)
}

#[cfg(test)]
mod tests {
    use face_compare_core::{SelectedFile, ServerErrorCode};

    use super::*;

    #[test]
    fn empty_controller_disables_submit() {
        let state = project(&SubmissionController::new(), "0.1.0");
        assert!(!state.submit_enabled);
        assert_eq!(state.submit_label, SUBMIT_LABEL);
        assert_eq!(state.before.preview, PreviewView::Empty);
        assert!(!state.reset_visible);
    }

    #[test]
    fn error_view_carries_format_hint() {
        let view = error_view(&ComparisonError::server(
            400,
            "Before image: Invalid file format. Only JPG, JPEG, PNG, and WEBP formats are allowed.",
            None,
        ));
        assert_eq!(view.hints, vec!["Allowed formats: JPG, JPEG, PNG, WEBP".to_string()]);

        let coded = error_view(&ComparisonError::server(
            413,
            "too big",
            Some(ServerErrorCode::FileTooLarge),
        ));
        assert_eq!(coded.hints, vec!["Maximum file size: 15 MB".to_string()]);
    }

    #[test]
    fn renders_slot_with_loading_preview() {
        let mut controller = SubmissionController::new();
        controller
            .select_file(
                Role::Before,
                SelectedFile::new(Role::Before, "a.jpg", "image/jpeg", vec![0_u8; 10]),
            )
            .expect("selection should work");

        let lines = project(&controller, "0.1.0").render_lines();
        assert!(lines.iter().any(|line| line.contains("a.jpg (10 bytes, preview loading)")));
        assert!(lines.iter().any(|line| line.contains("(no image)")));
    }
}
