/// Batch job system
///
/// The core of the service: a chunk-oriented read-process-write pipeline with
/// fault-tolerant skip handling, plus the lifecycle manager that tracks
/// execution identity, status, history and cooperative cancellation.
///
/// Architecture:
/// - Domain: execution entities, counters and listener traits
/// - Engine: the chunked pipeline (reader, writer, skip policy, step loop)
/// - Lifecycle: execution arena, status transitions, stop signaling
/// - Launcher: fire-and-forget execution of one pipeline per launch
/// - Application: the BatchJobService facade
/// - Infrastructure: upload staging
pub mod application;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod launcher;
pub mod lifecycle;

/// The single job this service runs
pub const IMPORT_JOB_NAME: &str = "importStudentResultsJob";

// Re-exports for easy access
pub use application::{BatchJobService, JobStatusView};
pub use domain::{
    entities::{JobExecution, JobParameters, JobStatus, StepCounters, StopOutcome},
    listener::{
        BatchEventListener, CompletionNotificationListener, CompositeListener, SkipLoggingListener,
        SkipPhase,
    },
};
pub use launcher::JobLauncher;
pub use lifecycle::JobLifecycleManager;
