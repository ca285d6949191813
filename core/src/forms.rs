use std::collections::HashMap;

use crate::protocol::FormId;
use crate::protocol::FormResponse;
use crate::protocol::NotificationKind;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

/// Visible state of a form's submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: String,
    pub disabled: bool,
}

/// Terminal result of one AJAX submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Succeeded {
        message: String,
        redirect: Option<String>,
    },
    /// The server answered `success: false`.
    Rejected { error: String },
    /// No usable answer: unreachable server, or a body that is not the JSON
    /// contract.
    TransportFailed,
}

impl FormOutcome {
    /// Interpret a JSON answer. Transport failures never get this far and
    /// map straight to [`FormOutcome::TransportFailed`].
    pub fn from_response(response: FormResponse) -> Self {
        if response.success {
            FormOutcome::Succeeded {
                message: response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
                redirect: response.redirect.filter(|r| !r.is_empty()),
            }
        } else {
            FormOutcome::Rejected {
                error: response
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
            }
        }
    }

    /// Card to show for this outcome.
    pub fn notification(&self) -> (NotificationKind, String) {
        match self {
            FormOutcome::Succeeded { message, .. } => (NotificationKind::Success, message.clone()),
            FormOutcome::Rejected { error } => (NotificationKind::Danger, error.clone()),
            FormOutcome::TransportFailed => {
                (NotificationKind::Danger, NETWORK_ERROR_MESSAGE.to_string())
            }
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            FormOutcome::Succeeded { redirect, .. } => redirect.as_deref(),
            _ => None,
        }
    }
}

/// Forms with a request in flight, keyed by form, holding the label to restore.
#[derive(Debug, Default)]
pub struct InFlightForms {
    original_labels: HashMap<FormId, String>,
}

impl InFlightForms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable the control. Returns `None` if the form is already in flight:
    /// its control is disabled and cannot submit again.
    pub fn begin(
        &mut self,
        form: &FormId,
        original_label: &str,
        processing_label: &str,
    ) -> Option<SubmitControl> {
        if self.original_labels.contains_key(form) {
            return None;
        }
        self.original_labels
            .insert(form.clone(), original_label.to_string());
        Some(SubmitControl {
            label: processing_label.to_string(),
            disabled: true,
        })
    }

    /// Re-enable the control with its original label.
    pub fn finish(&mut self, form: &FormId) -> Option<SubmitControl> {
        self.original_labels
            .remove(form)
            .map(|label| SubmitControl {
                label,
                disabled: false,
            })
    }

    pub fn is_in_flight(&self, form: &FormId) -> bool {
        self.original_labels.contains_key(form)
    }
}
