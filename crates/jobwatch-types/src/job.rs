//! Job control protocol between the panel and the job server.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status value at or above which a job is finished (successfully or not).
pub const TERMINAL_STATUS_VALUE: u32 = 100;

/// Identifies one job inside one processing environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobRef {
    pub env_id: u64,
    pub job_id: Uuid,
}

impl JobRef {
    pub fn new(env_id: u64, job_id: Uuid) -> Self {
        Self { env_id, job_id }
    }
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.env_id, self.job_id)
    }
}

/// Actions accepted by the job endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    StartJob,
    StopJob,
    CheckStatus,
}

impl JobAction {
    /// Query-string value for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::StartJob => "start_job",
            JobAction::StopJob => "stop_job",
            JobAction::CheckStatus => "check_status",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body returned by the job endpoint.
///
/// `check_status` answers `status` and `status_value`; `start_job` and
/// `stop_job` answer `status` plus the next `action` for the control and its
/// label. A `null` action means the control has nothing further to offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_value: Option<u32>,
    #[serde(default)]
    pub action: Option<JobAction>,
    #[serde(default)]
    pub action_text: Option<String>,
}

impl JobResponse {
    /// True when the reported status value ends the polling loop.
    pub fn is_terminal(&self) -> bool {
        self.status_value
            .is_some_and(|value| value >= TERMINAL_STATUS_VALUE)
    }
}

/// Lifecycle states of a processing job, keyed by their numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Created,
    Scheduled,
    Pending,
    Started,
    Running,
    Finished,
    Revoked,
    Failed,
}

impl JobStatus {
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            10 => Some(JobStatus::Created),
            20 => Some(JobStatus::Scheduled),
            30 => Some(JobStatus::Pending),
            40 => Some(JobStatus::Started),
            50 => Some(JobStatus::Running),
            100 => Some(JobStatus::Finished),
            500 => Some(JobStatus::Revoked),
            999 => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            JobStatus::Created => 10,
            JobStatus::Scheduled => 20,
            JobStatus::Pending => 30,
            JobStatus::Started => 40,
            JobStatus::Running => 50,
            JobStatus::Finished => 100,
            JobStatus::Revoked => 500,
            JobStatus::Failed => 999,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.value() >= TERMINAL_STATUS_VALUE
    }

    /// Human label matching the server's status display.
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Created => "Created",
            JobStatus::Scheduled => "Scheduled",
            JobStatus::Pending => "Pending",
            JobStatus::Started => "Started",
            JobStatus::Running => "Running",
            JobStatus::Finished => "Finished successfully",
            JobStatus::Revoked => "Revoked",
            JobStatus::Failed => "Failed",
        }
    }
}
