//! Start/stop control state.

use jobwatch_types::{JobAction, JobResponse};

/// The panel's job control: the action it will send next and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    action: JobAction,
    label: String,
}

impl ActionButton {
    pub fn new(action: JobAction, label: impl Into<String>) -> Self {
        Self {
            action,
            label: label.into(),
        }
    }

    /// A control offering to start the job.
    pub fn start() -> Self {
        Self::new(JobAction::StartJob, "start job")
    }

    pub fn action(&self) -> JobAction {
        self.action
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Only start and stop are sent from the control.
    pub fn is_control_action(&self) -> bool {
        matches!(self.action, JobAction::StartJob | JobAction::StopJob)
    }

    /// Take the next action and label from a control response.
    ///
    /// A response without a next action leaves the control unchanged.
    /// Returns whether anything changed.
    pub fn apply_response(&mut self, response: &JobResponse) -> bool {
        let Some(next) = response.action else {
            return false;
        };
        self.action = next;
        if let Some(text) = &response.action_text {
            self.label = text.clone();
        }
        true
    }
}
