/// Skip and completion callbacks for the pipeline
///
/// Listeners observe the run; they never steer it. Callback signatures are
/// infallible so a listener can never break the pipeline's control flow.
use crate::modules::jobs::domain::entities::JobExecution;
use crate::modules::results::domain::repository::StudentResultRepository;
use crate::shared::errors::AppError;
use crate::{log_error, log_info, log_warn};
use async_trait::async_trait;
use std::sync::Arc;

/// Phase of the pipeline in which a skip occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipPhase {
    Read,
    Process,
    Write,
}

impl std::fmt::Display for SkipPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipPhase::Read => write!(f, "read"),
            SkipPhase::Process => write!(f, "process"),
            SkipPhase::Write => write!(f, "write"),
        }
    }
}

// The `T: Sync` bound keeps the default methods' futures `Send`; they
// borrow the skipped item across an await point.
#[async_trait]
pub trait BatchEventListener<T: Sync>: Send + Sync {
    /// Called synchronously for every tolerated skip. Read-phase skips carry
    /// no item because the record never materialized.
    async fn on_skip(&self, _phase: SkipPhase, _item: Option<&T>, _error: &AppError) {}

    /// Called exactly once, after the execution reaches a terminal state
    async fn after_job(&self, _execution: &JobExecution) {}
}

/// Broadcasts every event to a list of listeners
pub struct CompositeListener<T: Sync> {
    listeners: Vec<Arc<dyn BatchEventListener<T>>>,
}

impl<T: Sync> CompositeListener<T> {
    pub fn new(listeners: Vec<Arc<dyn BatchEventListener<T>>>) -> Self {
        Self { listeners }
    }
}

#[async_trait]
impl<T: Send + Sync> BatchEventListener<T> for CompositeListener<T> {
    async fn on_skip(&self, phase: SkipPhase, item: Option<&T>, error: &AppError) {
        futures::future::join_all(
            self.listeners
                .iter()
                .map(|listener| listener.on_skip(phase, item, error)),
        )
        .await;
    }

    async fn after_job(&self, execution: &JobExecution) {
        futures::future::join_all(
            self.listeners
                .iter()
                .map(|listener| listener.after_job(execution)),
        )
        .await;
    }
}

/// Logs every skipped item with its phase and fault
pub struct SkipLoggingListener;

#[async_trait]
impl<T: std::fmt::Debug + Send + Sync> BatchEventListener<T> for SkipLoggingListener {
    async fn on_skip(&self, phase: SkipPhase, item: Option<&T>, error: &AppError) {
        match item {
            Some(item) => log_error!("Skip in {}: item {:?}, fault: {}", phase, item, error),
            None => log_error!("Skip in {}: fault: {}", phase, error),
        }
    }
}

/// Emits the end-of-job summary and sanity-checks the persisted record count
pub struct CompletionNotificationListener {
    repository: Arc<dyn StudentResultRepository>,
}

impl CompletionNotificationListener {
    pub fn new(repository: Arc<dyn StudentResultRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<T: Send + Sync> BatchEventListener<T> for CompletionNotificationListener {
    async fn after_job(&self, execution: &JobExecution) {
        let counters = execution.counters;
        log_info!("=== JOB EXECUTION SUMMARY ===");
        log_info!("Job ID: {}", execution.id);
        log_info!("Job Status: {}", execution.status);
        log_info!("Start Time: {:?}", execution.start_time);
        log_info!("End Time: {:?}", execution.end_time);
        log_info!("Read Count: {}", counters.read_count);
        log_info!("Write Count: {}", counters.write_count);
        log_info!("Skip Count: {}", counters.skip_count);
        log_info!("Filter Count: {}", counters.filter_count);
        log_info!("Commit Count: {}", counters.commit_count);
        log_info!("Rollback Count: {}", counters.rollback_count);

        if counters.write_count == 0 && counters.read_count > 0 {
            log_warn!(
                "Job {} read {} records but wrote none; likely a data-quality problem",
                execution.id,
                counters.read_count
            );
        }

        match self.repository.count().await {
            Ok(total) => log_info!("Total records in repository: {}", total),
            Err(e) => log_error!("Error checking repository count: {}", e),
        }

        match execution.status {
            crate::modules::jobs::domain::entities::JobStatus::Completed => {
                log_info!("Job {} completed successfully", execution.id);
            }
            crate::modules::jobs::domain::entities::JobStatus::Failed => {
                log_error!(
                    "Job {} failed: {:?}",
                    execution.id,
                    execution.failure_messages
                );
            }
            other => {
                log_warn!("Job {} finished with status {}", execution.id, other);
            }
        }
        log_info!("=== END JOB SUMMARY ===");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        skips: Mutex<Vec<(SkipPhase, Option<String>)>>,
        jobs: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl BatchEventListener<String> for RecordingListener {
        async fn on_skip(&self, phase: SkipPhase, item: Option<&String>, _error: &AppError) {
            self.skips.lock().unwrap().push((phase, item.cloned()));
        }

        async fn after_job(&self, execution: &JobExecution) {
            self.jobs.lock().unwrap().push(execution.id);
        }
    }

    fn dummy_execution(id: i64) -> JobExecution {
        use crate::modules::jobs::domain::entities::{JobStatus, StepCounters};
        JobExecution {
            id,
            instance_id: 1,
            job_name: "test".to_string(),
            status: JobStatus::Completed,
            create_time: chrono::Utc::now(),
            start_time: None,
            end_time: None,
            exit_code: Some("COMPLETED".to_string()),
            counters: StepCounters::default(),
            failure_messages: Vec::new(),
            instance_key: "test::k".to_string(),
        }
    }

    #[test]
    fn test_composite_broadcasts_to_all_listeners() {
        let first = Arc::new(RecordingListener::default());
        let second = Arc::new(RecordingListener::default());
        let composite =
            CompositeListener::new(vec![first.clone() as _, second.clone() as _]);

        tokio_test::block_on(async {
            let item = "S1,Math,abc".to_string();
            composite
                .on_skip(
                    SkipPhase::Read,
                    Some(&item),
                    &AppError::ParseError("bad score".to_string()),
                )
                .await;
            composite.after_job(&dummy_execution(3)).await;
        });

        assert_eq!(first.skips.lock().unwrap().len(), 1);
        assert_eq!(second.skips.lock().unwrap().len(), 1);
        assert_eq!(*first.jobs.lock().unwrap(), vec![3]);
        assert_eq!(*second.jobs.lock().unwrap(), vec![3]);
    }

    #[test]
    fn test_default_callbacks_run_on_a_spawned_task() {
        struct SilentListener;

        #[async_trait]
        impl BatchEventListener<String> for SilentListener {}

        tokio_test::block_on(async {
            let listener: Arc<dyn BatchEventListener<String>> = Arc::new(SilentListener);
            let handle = tokio::spawn(async move {
                let item = "S1,Math,95".to_string();
                listener
                    .on_skip(
                        SkipPhase::Process,
                        Some(&item),
                        &AppError::ParseError("bad score".to_string()),
                    )
                    .await;
                listener.after_job(&dummy_execution(1)).await;
            });
            handle.await.unwrap();
        });
    }

    #[test]
    fn test_skip_phase_display() {
        assert_eq!(SkipPhase::Read.to_string(), "read");
        assert_eq!(SkipPhase::Process.to_string(), "process");
        assert_eq!(SkipPhase::Write.to_string(), "write");
    }
}
