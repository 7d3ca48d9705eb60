/// In-memory implementation of StudentResultRepository
///
/// Keeps accepted records in insertion order, which is commit order: the
/// engine writes chunks sequentially and `save_all` appends under a single
/// write lock, so concurrent executions interleave at chunk granularity only.
use crate::log_debug;
use crate::modules::results::domain::entities::StudentResult;
use crate::modules::results::domain::repository::StudentResultRepository;
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryStudentResultRepository {
    rows: RwLock<Vec<StudentResult>>,
}

impl InMemoryStudentResultRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl StudentResultRepository for InMemoryStudentResultRepository {
    async fn save_all(&self, records: &[StudentResult]) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        rows.extend_from_slice(records);
        log_debug!(
            "Saved {} records ({} total)",
            records.len(),
            rows.len()
        );
        Ok(())
    }

    async fn find_by_student_id(&self, student_id: &str) -> AppResult<Vec<StudentResult>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows.len() as u64)
    }
}
