/// Repository trait for accepted exam records
///
/// The pipeline writes each committed chunk through `save_all`; queries read
/// back accepted records by student. Durable storage beyond the process is an
/// external concern, so the default implementation is in-memory.
use crate::modules::results::domain::entities::StudentResult;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentResultRepository: Send + Sync {
    /// Persist a whole chunk as one atomic unit. Either every record in
    /// `records` becomes visible or none does.
    async fn save_all(&self, records: &[StudentResult]) -> AppResult<()>;

    /// All accepted records for one student, in commit order
    async fn find_by_student_id(&self, student_id: &str) -> AppResult<Vec<StudentResult>>;

    /// Total number of accepted records
    async fn count(&self) -> AppResult<u64>;
}
