/// Job lifecycle manager
///
/// Owns job/instance/execution identity and status. Executions live in an
/// arena addressed by an opaque monotonically assigned id; each record gets
/// its own lock so the running pipeline and API readers serialize on a
/// single execution while reads of other executions proceed concurrently.
use crate::modules::jobs::domain::entities::{
    JobExecution, JobParameters, JobStatus, StepCounters, StopOutcome,
};
use crate::modules::jobs::engine::StepOutcome;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 100;

struct JobInstanceEntry {
    instance_id: i64,
    completed: bool,
}

#[derive(Default)]
pub struct JobLifecycleManager {
    executions: RwLock<HashMap<i64, Arc<RwLock<JobExecution>>>>,
    instances: RwLock<HashMap<String, JobInstanceEntry>>,
    stop_tokens: DashMap<i64, CancellationToken>,
    next_execution_id: AtomicI64,
    next_instance_id: AtomicI64,
}

impl JobLifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new execution in `Starting` for the instance identified by
    /// `(job_name, parameters)`. Fails with `DuplicateInstance` when that
    /// instance already has a successful terminal execution.
    pub async fn create_execution(
        &self,
        job_name: &str,
        parameters: &JobParameters,
    ) -> AppResult<(i64, CancellationToken)> {
        let instance_key = parameters.instance_key(job_name);

        let mut instances = self.instances.write().await;
        let instance_id = match instances.get(&instance_key) {
            Some(entry) if entry.completed => {
                return Err(AppError::DuplicateInstance(format!(
                    "Instance '{}' already completed successfully",
                    instance_key
                )));
            }
            Some(entry) => entry.instance_id,
            None => {
                let instance_id = self.next_instance_id.fetch_add(1, Ordering::SeqCst) + 1;
                instances.insert(
                    instance_key.clone(),
                    JobInstanceEntry {
                        instance_id,
                        completed: false,
                    },
                );
                instance_id
            }
        };
        drop(instances);

        let execution_id = self.next_execution_id.fetch_add(1, Ordering::SeqCst) + 1;
        let execution = JobExecution {
            id: execution_id,
            instance_id,
            job_name: job_name.to_string(),
            status: JobStatus::Starting,
            create_time: Utc::now(),
            start_time: None,
            end_time: None,
            exit_code: None,
            counters: StepCounters::default(),
            failure_messages: Vec::new(),
            instance_key,
        };

        let token = CancellationToken::new();
        self.stop_tokens.insert(execution_id, token.clone());
        self.executions
            .write()
            .await
            .insert(execution_id, Arc::new(RwLock::new(execution)));

        log_info!(
            "Created execution {} for job '{}' (instance {})",
            execution_id,
            job_name,
            instance_id
        );
        Ok((execution_id, token))
    }

    /// Transition to `Started` when the engine begins consuming the source.
    /// A stop requested during `Starting` wins; the status stays `Stopping`.
    pub async fn mark_started(&self, execution_id: i64) -> AppResult<()> {
        let record = self.get_record(execution_id).await?;
        let mut execution = record.write().await;
        execution.start_time = Some(Utc::now());
        if execution.status == JobStatus::Starting {
            execution.status = JobStatus::Started;
        }
        Ok(())
    }

    /// Push a counter snapshot from the running engine. Counters are frozen
    /// once the execution is terminal, so late updates are dropped.
    pub async fn update_counters(&self, execution_id: i64, counters: StepCounters) {
        let executions = self.executions.read().await;
        let Some(record) = executions.get(&execution_id).cloned() else {
            log_warn!("Counter update for unknown execution {}", execution_id);
            return;
        };
        drop(executions);

        let mut execution = record.write().await;
        if !execution.is_terminal() {
            execution.counters = counters;
        }
    }

    /// Apply the terminal outcome and return the frozen snapshot
    pub async fn finalize(
        &self,
        execution_id: i64,
        outcome: &StepOutcome,
        counters: StepCounters,
    ) -> AppResult<JobExecution> {
        let record = self.get_record(execution_id).await?;
        let mut execution = record.write().await;
        if execution.is_terminal() {
            return Ok(execution.clone());
        }

        execution.status = match outcome {
            StepOutcome::Completed => JobStatus::Completed,
            StepOutcome::Stopped => JobStatus::Stopped,
            StepOutcome::Failed(messages) => {
                execution.failure_messages = messages.clone();
                JobStatus::Failed
            }
        };
        execution.counters = counters;
        execution.end_time = Some(Utc::now());
        execution.exit_code = Some(execution.status.to_string());

        if execution.status == JobStatus::Completed {
            let mut instances = self.instances.write().await;
            if let Some(entry) = instances.get_mut(&execution.instance_key) {
                entry.completed = true;
            }
        }

        self.stop_tokens.remove(&execution_id);
        log_info!(
            "Execution {} finished with status {}",
            execution_id,
            execution.status
        );
        Ok(execution.clone())
    }

    /// Snapshot of one execution, `NotFound` when the id is unknown
    pub async fn get_execution(&self, execution_id: i64) -> AppResult<JobExecution> {
        let record = self.get_record(execution_id).await?;
        let execution = record.read().await;
        Ok(execution.clone())
    }

    /// Executions of one job, newest create time first, bounded by `limit`
    /// (defaults to a page of 100)
    pub async fn get_history(&self, job_name: &str, limit: Option<usize>) -> Vec<JobExecution> {
        let executions = self.executions.read().await;
        let records: Vec<Arc<RwLock<JobExecution>>> = executions.values().cloned().collect();
        drop(executions);

        let mut history = Vec::with_capacity(records.len());
        for record in records {
            let execution = record.read().await;
            if execution.job_name == job_name {
                history.push(execution.clone());
            }
        }

        history.sort_by(|a, b| {
            b.create_time
                .cmp(&a.create_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        history.truncate(limit.unwrap_or(DEFAULT_HISTORY_PAGE_SIZE));
        history
    }

    /// Request cooperative cancellation. Not an error when the execution is
    /// no longer running; the caller gets an informational outcome instead.
    pub async fn stop(&self, execution_id: i64) -> AppResult<StopOutcome> {
        let record = self.get_record(execution_id).await?;
        let mut execution = record.write().await;

        if !execution.status.is_stoppable() {
            return Ok(StopOutcome::NotRunning(execution_id));
        }

        execution.status = JobStatus::Stopping;
        drop(execution);

        if let Some(token) = self.stop_tokens.get(&execution_id) {
            token.cancel();
        }
        log_info!("Stop requested for execution {}", execution_id);
        Ok(StopOutcome::Stopping(execution_id))
    }

    async fn get_record(&self, execution_id: i64) -> AppResult<Arc<RwLock<JobExecution>>> {
        let executions = self.executions.read().await;
        executions.get(&execution_id).cloned().ok_or_else(|| {
            AppError::NotFound(format!("Job execution with ID {} not found", execution_id))
        })
    }
}
