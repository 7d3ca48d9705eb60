/// Application facade for the import job system
///
/// Ties together upload staging, the launcher, lifecycle queries, the
/// administrative cache and the student-results query. The HTTP surface sits
/// on top of this service; nothing here blocks on a running pipeline.
use crate::log_info;
use crate::modules::jobs::domain::entities::{JobExecution, JobParameters};
use crate::modules::jobs::infrastructure::FileStagingArea;
use crate::modules::jobs::launcher::JobLauncher;
use crate::modules::jobs::lifecycle::JobLifecycleManager;
use crate::modules::jobs::IMPORT_JOB_NAME;
use crate::modules::results::application::StudentOverallResult;
use crate::modules::results::domain::repository::StudentResultRepository;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::MemoryCache;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Status fields exposed at the query boundary
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusView {
    pub job_execution_id: i64,
    pub job_name: String,
    pub status: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub exit_status: String,
}

impl From<&JobExecution> for JobStatusView {
    fn from(execution: &JobExecution) -> Self {
        Self {
            job_execution_id: execution.id,
            job_name: execution.job_name.clone(),
            status: execution.status.to_string(),
            start_time: execution.start_time,
            end_time: execution.end_time,
            exit_status: execution
                .exit_code
                .clone()
                .unwrap_or_else(|| "UNKNOWN".to_string()),
        }
    }
}

pub struct BatchJobService {
    launcher: Arc<JobLauncher>,
    lifecycle: Arc<JobLifecycleManager>,
    repository: Arc<dyn StudentResultRepository>,
    cache: Arc<MemoryCache>,
    staging: FileStagingArea,
}

impl BatchJobService {
    pub fn new(
        launcher: Arc<JobLauncher>,
        lifecycle: Arc<JobLifecycleManager>,
        repository: Arc<dyn StudentResultRepository>,
        cache: Arc<MemoryCache>,
        upload_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            launcher,
            lifecycle,
            repository,
            cache,
            staging: FileStagingArea::new(upload_directory),
        }
    }

    /// Stage the uploaded payload and launch the import, returning the new
    /// execution id immediately. Staging failures surface before any
    /// execution is created.
    pub async fn start_import_job(&self, original_name: &str, contents: &[u8]) -> AppResult<i64> {
        let staged = self.staging.stage(original_name, contents)?;
        let parameters = JobParameters::new(
            staged.path.to_string_lossy().into_owned(),
            staged.launch_time,
        );
        self.launcher.launch(parameters).await
    }

    pub async fn get_job_status(&self, execution_id: i64) -> AppResult<JobStatusView> {
        let execution = self.lifecycle.get_execution(execution_id).await?;
        Ok(JobStatusView::from(&execution))
    }

    /// Full execution snapshot including counters, for callers that need
    /// more than the status view
    pub async fn get_job_execution(&self, execution_id: i64) -> AppResult<JobExecution> {
        self.lifecycle.get_execution(execution_id).await
    }

    pub async fn get_job_history(&self, job_name: &str) -> AppResult<Vec<JobStatusView>> {
        if job_name != IMPORT_JOB_NAME {
            return Err(AppError::NotFound(format!("Unknown job '{}'", job_name)));
        }
        Ok(self
            .lifecycle
            .get_history(job_name, None)
            .await
            .iter()
            .map(JobStatusView::from)
            .collect())
    }

    /// Request cooperative cancellation; the outcome string distinguishes
    /// "now stopping" from "already not running"
    pub async fn stop_job(&self, execution_id: i64) -> AppResult<String> {
        let outcome = self.lifecycle.stop(execution_id).await?;
        Ok(outcome.to_string())
    }

    /// Administrative operation: empty the cache entirely, independent of
    /// job state
    pub fn clear_cache(&self) -> usize {
        let evicted = self.cache.clear();
        log_info!("Cleared {} entries from cache", evicted);
        evicted
    }

    /// Accepted records for one student plus their mean score, `None` when
    /// the student has no accepted records. Served through the cache.
    pub async fn get_student_results(
        &self,
        student_id: &str,
    ) -> AppResult<Option<StudentOverallResult>> {
        let cache_key = format!("student_results:{}", student_id);
        if let Some(cached) = self.cache.get::<StudentOverallResult>(&cache_key)? {
            return Ok(Some(cached));
        }

        let records = self.repository.find_by_student_id(student_id).await?;
        match StudentOverallResult::from_records(student_id, &records) {
            Some(result) => {
                self.cache.insert(&cache_key, &result)?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::grading::StudentResultProcessor;
    use crate::modules::jobs::domain::listener::SkipLoggingListener;
    use crate::modules::jobs::engine::writer::RepositoryItemWriter;
    use crate::modules::jobs::engine::StepConfig;
    use crate::modules::jobs::IMPORT_JOB_NAME;
    use crate::modules::results::domain::entities::StudentResult;
    use crate::modules::results::domain::repository::MockStudentResultRepository;

    fn build_service(repository: Arc<dyn StudentResultRepository>) -> BatchJobService {
        let lifecycle = Arc::new(JobLifecycleManager::new());
        let launcher = Arc::new(JobLauncher::new(
            IMPORT_JOB_NAME,
            lifecycle.clone(),
            Arc::new(StudentResultProcessor),
            Arc::new(RepositoryItemWriter::new(repository.clone())),
            Arc::new(SkipLoggingListener),
            StepConfig::default(),
        ));
        let dir = std::env::temp_dir().join("gradebatch-service-tests");
        BatchJobService::new(
            launcher,
            lifecycle,
            repository,
            Arc::new(MemoryCache::new()),
            dir,
        )
    }

    #[tokio::test]
    async fn student_results_average_and_cache() {
        let mut mock = MockStudentResultRepository::new();
        mock.expect_find_by_student_id()
            .times(1) // second lookup must come from the cache
            .returning(|_| {
                Ok(vec![
                    StudentResult::new("S1".to_string(), "Math".to_string(), 90).with_grade("A"),
                    StudentResult::new("S1".to_string(), "Sci".to_string(), 70).with_grade("C"),
                ])
            });

        let service = build_service(Arc::new(mock));

        let first = service.get_student_results("S1").await.unwrap().unwrap();
        assert!((first.overall_average_score - 80.0).abs() < f64::EPSILON);
        assert_eq!(first.course_results.len(), 2);

        let second = service.get_student_results("S1").await.unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_student_yields_none() {
        let mut mock = MockStudentResultRepository::new();
        mock.expect_find_by_student_id().returning(|_| Ok(vec![]));

        let service = build_service(Arc::new(mock));
        assert!(service.get_student_results("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_cache_forces_repository_reload() {
        let mut mock = MockStudentResultRepository::new();
        mock.expect_find_by_student_id().times(2).returning(|_| {
            Ok(vec![StudentResult::new(
                "S1".to_string(),
                "Math".to_string(),
                90,
            )
            .with_grade("A")])
        });

        let service = build_service(Arc::new(mock));
        service.get_student_results("S1").await.unwrap();
        assert_eq!(service.clear_cache(), 1);
        service.get_student_results("S1").await.unwrap();
    }
}
