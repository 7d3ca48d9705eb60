/// Domain entities for the batch job system
///
/// An *instance* is a logical import identified by job name plus identifying
/// parameters; an *execution* is one run attempt of an instance with its own
/// status and counters.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job execution status
///
/// `Starting -> Started -> {Completed | Failed | Stopped | Abandoned}`, with
/// `Started -> Stopping -> Stopped` as the cooperative-cancel path. Terminal
/// statuses are final; the execution record freezes once one is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Starting,
    Started,
    Stopping,
    Stopped,
    Completed,
    Failed,
    Abandoned,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Stopped | JobStatus::Abandoned
        )
    }

    /// Whether a stop request is still meaningful for this status
    pub fn is_stoppable(&self) -> bool {
        matches!(self, JobStatus::Starting | JobStatus::Started)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Starting => write!(f, "STARTING"),
            JobStatus::Started => write!(f, "STARTED"),
            JobStatus::Stopping => write!(f, "STOPPING"),
            JobStatus::Stopped => write!(f, "STOPPED"),
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Failed => write!(f, "FAILED"),
            JobStatus::Abandoned => write!(f, "ABANDONED"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STARTING" => Ok(JobStatus::Starting),
            "STARTED" => Ok(JobStatus::Started),
            "STOPPING" => Ok(JobStatus::Stopping),
            "STOPPED" => Ok(JobStatus::Stopped),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            "ABANDONED" => Ok(JobStatus::Abandoned),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Identifying parameters of one import: the staged file path plus the launch
/// timestamp, so every upload is a distinct instance even for identical
/// file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameters {
    pub file_path: String,
    pub launch_time: i64,
}

impl JobParameters {
    pub fn new(file_path: String, launch_time: i64) -> Self {
        Self {
            file_path,
            launch_time,
        }
    }

    /// Identity string for the (job name, parameters) pair
    pub fn instance_key(&self, job_name: &str) -> String {
        format!("{}::{}::{}", job_name, self.file_path, self.launch_time)
    }
}

/// Per-step counters, frozen once the execution is terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCounters {
    pub read_count: u64,
    pub write_count: u64,
    pub skip_count: u64,
    pub filter_count: u64,
    pub commit_count: u64,
    pub rollback_count: u64,
}

/// One run attempt of a job instance
#[derive(Debug, Clone, Serialize)]
pub struct JobExecution {
    pub id: i64,
    pub instance_id: i64,
    pub job_name: String,
    pub status: JobStatus,
    pub create_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub exit_code: Option<String>,
    pub counters: StepCounters,
    pub failure_messages: Vec<String>,
    #[serde(skip)]
    pub(crate) instance_key: String,
}

impl JobExecution {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The stop signal was delivered; the engine observes it at the next
    /// chunk boundary
    Stopping(i64),
    /// The execution was not running; nothing was mutated
    NotRunning(i64),
}

impl std::fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopOutcome::Stopping(id) => write!(f, "Job {} stopping.", id),
            StopOutcome::NotRunning(id) => {
                write!(f, "Job {} is not running or already stopped.", id)
            }
        }
    }
}
