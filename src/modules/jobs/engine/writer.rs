use crate::modules::jobs::engine::ItemWriter;
use crate::modules::results::domain::entities::StudentResult;
use crate::modules::results::domain::repository::StudentResultRepository;
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::LogContext;
use async_trait::async_trait;
use std::sync::Arc;

/// Writes accepted chunks through the results repository
pub struct RepositoryItemWriter {
    repository: Arc<dyn StudentResultRepository>,
}

impl RepositoryItemWriter {
    pub fn new(repository: Arc<dyn StudentResultRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ItemWriter<StudentResult> for RepositoryItemWriter {
    async fn write(&self, items: &[StudentResult]) -> AppResult<()> {
        LogContext::repository_operation("save_all", items.len());
        self.repository.save_all(items).await
    }
}
