//! Job lifecycle states and the legal transition table.
//!
//! The status column is TEXT in the database; every enum variant maps to the
//! exact stored string. Transitions outside [`is_legal_transition`] must be
//! rejected as a conflict, never applied.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stored on a job compensated to FAILED after a queue publish failure.
pub const ERROR_CODE_DISPATCH: &str = "DISPATCH_ERROR";

/// Stored on a job failed by a worker failure callback.
pub const ERROR_CODE_WORKER: &str = "WORKER_ERROR";

/// Stored on a job reaped by the stuck-job sweep.
pub const ERROR_CODE_TIMEOUT: &str = "TIMEOUT";

/// Job execution status.
///
/// `Succeeded` is terminal. `Failed` is terminal except for the explicit
/// requeue path back to `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// The database string for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
        }
    }

    /// Parse a database string back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "QUEUED" => Some(JobStatus::Queued),
            "RUNNING" => Some(JobStatus::Running),
            "SUCCEEDED" => Some(JobStatus::Succeeded),
            "FAILED" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Whether no further worker callback may move the job.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full transition table, including the internal compensation edge
/// `QUEUED -> FAILED` (dispatch failure, stuck-job sweep).
///
/// `RUNNING -> RUNNING` covers monotonic progress updates. Worker callbacks
/// are further restricted by the dispatcher: a failure callback may only
/// apply from `RUNNING`.
pub fn is_legal_transition(from: JobStatus, to: JobStatus) -> bool {
    use JobStatus::*;
    matches!(
        (from, to),
        (Queued, Running)
            | (Running, Running)
            | (Running, Succeeded)
            | (Running, Failed)
            | (Queued, Failed)
            | (Failed, Queued)
    )
}

/// A transition outside the table was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal job transition {from} -> {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use JobStatus::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [Queued, Running, Succeeded, Failed] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("CANCELLED"), None);
    }

    #[test]
    fn happy_path_is_reachable() {
        assert!(is_legal_transition(Queued, Running));
        assert!(is_legal_transition(Running, Running));
        assert!(is_legal_transition(Running, Succeeded));
    }

    #[test]
    fn succeeded_is_terminal() {
        for to in [Queued, Running, Succeeded, Failed] {
            assert!(!is_legal_transition(Succeeded, to));
        }
    }

    #[test]
    fn failed_only_requeues() {
        assert!(is_legal_transition(Failed, Queued));
        assert!(!is_legal_transition(Failed, Running));
        assert!(!is_legal_transition(Failed, Succeeded));
        assert!(!is_legal_transition(Failed, Failed));
    }

    #[test]
    fn queued_never_jumps_to_terminal_success() {
        assert!(!is_legal_transition(Queued, Succeeded));
        // Compensation edge for dispatch failures and timeouts.
        assert!(is_legal_transition(Queued, Failed));
    }
}
