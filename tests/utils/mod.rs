#![allow(dead_code)]
//! Shared helpers for the integration tests: service wiring, CSV fixtures,
//! terminal-state polling and writer test doubles.

use async_trait::async_trait;
use gradebatch::modules::grading::StudentResultProcessor;
use gradebatch::modules::jobs::engine::writer::RepositoryItemWriter;
use gradebatch::modules::jobs::engine::{ItemWriter, StepConfig};
use gradebatch::modules::jobs::{
    BatchEventListener, BatchJobService, CompletionNotificationListener, CompositeListener,
    JobExecution, JobLauncher, JobLifecycleManager, SkipLoggingListener, SkipPhase,
    IMPORT_JOB_NAME,
};
use gradebatch::modules::results::{InMemoryStudentResultRepository, StudentResult};
use gradebatch::shared::errors::{AppError, AppResult};
use gradebatch::shared::MemoryCache;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct TestServices {
    pub service: BatchJobService,
    pub lifecycle: Arc<JobLifecycleManager>,
    pub repository: Arc<InMemoryStudentResultRepository>,
    pub upload_dir: tempfile::TempDir,
}

/// Full service wiring over an in-memory repository and a temp upload dir
pub fn build_test_services(config: StepConfig) -> TestServices {
    let repository = Arc::new(InMemoryStudentResultRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let lifecycle = Arc::new(JobLifecycleManager::new());
    let upload_dir = tempfile::tempdir().unwrap();

    let listener = Arc::new(CompositeListener::new(vec![
        Arc::new(SkipLoggingListener) as _,
        Arc::new(CompletionNotificationListener::new(repository.clone())) as _,
    ]));

    let launcher = Arc::new(JobLauncher::new(
        IMPORT_JOB_NAME,
        lifecycle.clone(),
        Arc::new(StudentResultProcessor),
        Arc::new(RepositoryItemWriter::new(repository.clone())),
        listener,
        config,
    ));

    let service = BatchJobService::new(
        launcher,
        lifecycle.clone(),
        repository.clone(),
        cache,
        upload_dir.path(),
    );

    TestServices {
        service,
        lifecycle,
        repository,
        upload_dir,
    }
}

/// Launcher wiring with an arbitrary writer and listener, for fault
/// injection at the write boundary
pub fn build_launcher(
    writer: Arc<dyn ItemWriter<StudentResult>>,
    listener: Arc<dyn BatchEventListener<StudentResult>>,
    config: StepConfig,
) -> (Arc<JobLauncher>, Arc<JobLifecycleManager>) {
    let lifecycle = Arc::new(JobLifecycleManager::new());
    let launcher = Arc::new(JobLauncher::new(
        IMPORT_JOB_NAME,
        lifecycle.clone(),
        Arc::new(StudentResultProcessor),
        writer,
        listener,
        config,
    ));
    (launcher, lifecycle)
}

pub fn repository_writer(
    repository: Arc<InMemoryStudentResultRepository>,
) -> Arc<dyn ItemWriter<StudentResult>> {
    Arc::new(RepositoryItemWriter::new(repository))
}

/// Write a CSV fixture with the standard header plus `rows`, returning its
/// path as a string
pub fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> String {
    let mut contents = String::from("studentId,courseName,score\n");
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

pub fn csv_bytes(rows: &[&str]) -> Vec<u8> {
    let mut contents = String::from("studentId,courseName,score\n");
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    contents.into_bytes()
}

/// Poll until the execution reaches a terminal state
pub async fn wait_for_terminal(lifecycle: &JobLifecycleManager, execution_id: i64) -> JobExecution {
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        let execution = lifecycle.get_execution(execution_id).await.unwrap();
        if execution.is_terminal() {
            return execution;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "execution {} did not reach a terminal state in time",
            execution_id
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Writer that sleeps before each chunk, keeping executions in flight long
/// enough to exercise stop semantics
pub struct DelayedWriter {
    inner: Arc<dyn ItemWriter<StudentResult>>,
    delay: Duration,
}

impl DelayedWriter {
    pub fn new(inner: Arc<dyn ItemWriter<StudentResult>>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl ItemWriter<StudentResult> for DelayedWriter {
    async fn write(&self, items: &[StudentResult]) -> AppResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.write(items).await
    }
}

/// Writer that fails its first `failures` calls, then delegates
pub struct FailingWriter {
    inner: Arc<dyn ItemWriter<StudentResult>>,
    remaining_failures: AtomicUsize,
}

impl FailingWriter {
    pub fn new(inner: Arc<dyn ItemWriter<StudentResult>>, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl ItemWriter<StudentResult> for FailingWriter {
    async fn write(&self, items: &[StudentResult]) -> AppResult<()> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::RepositoryError(
                "injected write failure".to_string(),
            ));
        }
        self.inner.write(items).await
    }
}

/// Listener that records every callback for assertions
#[derive(Default)]
pub struct RecordingListener {
    pub skips: Mutex<Vec<(SkipPhase, Option<StudentResult>)>>,
    pub finished: Mutex<Vec<JobExecution>>,
}

#[async_trait]
impl BatchEventListener<StudentResult> for RecordingListener {
    async fn on_skip(&self, phase: SkipPhase, item: Option<&StudentResult>, _error: &AppError) {
        self.skips.lock().unwrap().push((phase, item.cloned()));
    }

    async fn after_job(&self, execution: &JobExecution) {
        self.finished.lock().unwrap().push(execution.clone());
    }
}
