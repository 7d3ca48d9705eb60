pub mod modules;
pub mod shared;

use modules::grading::StudentResultProcessor;
use modules::jobs::engine::writer::RepositoryItemWriter;
use modules::jobs::engine::StepConfig;
use modules::jobs::{
    BatchJobService, CompletionNotificationListener, CompositeListener, JobLauncher,
    JobLifecycleManager, SkipLoggingListener, IMPORT_JOB_NAME,
};
use modules::results::InMemoryStudentResultRepository;
use shared::MemoryCache;
use std::path::PathBuf;
use std::sync::Arc;

/// Wire the whole import service with explicit dependencies: repository,
/// cache, lifecycle manager, processor, writer, listeners and launcher are
/// plain values composed by ordinary code.
pub fn build_batch_service(upload_directory: PathBuf, config: StepConfig) -> BatchJobService {
    let repository = Arc::new(InMemoryStudentResultRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let lifecycle = Arc::new(JobLifecycleManager::new());

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

    BatchJobService::new(launcher, lifecycle, repository, cache, upload_directory)
}
