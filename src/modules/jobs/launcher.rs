/// Asynchronous job launcher
///
/// Creates the execution record, then runs the pipeline on its own spawned
/// task. The caller gets the execution id immediately and interacts with the
/// run only through the lifecycle manager; the task handle never escapes.
use crate::modules::jobs::domain::entities::{JobParameters, StepCounters};
use crate::modules::jobs::domain::listener::BatchEventListener;
use crate::modules::jobs::engine::reader::FlatFileReader;
use crate::modules::jobs::engine::{
    AlwaysSkipPolicy, ChunkedStep, ItemProcessor, ItemWriter, StepConfig, StepOutcome,
};
use crate::modules::jobs::lifecycle::JobLifecycleManager;
use crate::modules::results::domain::entities::StudentResult;
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::TimedOperation;
use crate::{log_error, log_info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct JobLauncher {
    job_name: String,
    lifecycle: Arc<JobLifecycleManager>,
    processor: Arc<dyn ItemProcessor<StudentResult>>,
    writer: Arc<dyn ItemWriter<StudentResult>>,
    listener: Arc<dyn BatchEventListener<StudentResult>>,
    config: StepConfig,
}

impl JobLauncher {
    pub fn new(
        job_name: &str,
        lifecycle: Arc<JobLifecycleManager>,
        processor: Arc<dyn ItemProcessor<StudentResult>>,
        writer: Arc<dyn ItemWriter<StudentResult>>,
        listener: Arc<dyn BatchEventListener<StudentResult>>,
        config: StepConfig,
    ) -> Self {
        Self {
            job_name: job_name.to_string(),
            lifecycle,
            processor,
            writer,
            listener,
            config,
        }
    }

    /// Create a new execution and run its pipeline in the background,
    /// returning the execution id without waiting for completion
    pub async fn launch(&self, parameters: JobParameters) -> AppResult<i64> {
        let (execution_id, token) = self
            .lifecycle
            .create_execution(&self.job_name, &parameters)
            .await?;

        log_info!(
            "Launching job '{}' as execution {} for file '{}'",
            self.job_name,
            execution_id,
            parameters.file_path
        );

        let lifecycle = self.lifecycle.clone();
        let processor = self.processor.clone();
        let writer = self.writer.clone();
        let listener = self.listener.clone();
        let config = self.config;
        tokio::spawn(async move {
            run_pipeline(
                lifecycle, execution_id, parameters, processor, writer, listener, config, token,
            )
            .await;
        });

        Ok(execution_id)
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
    lifecycle: Arc<JobLifecycleManager>,
    execution_id: i64,
    parameters: JobParameters,
    processor: Arc<dyn ItemProcessor<StudentResult>>,
    writer: Arc<dyn ItemWriter<StudentResult>>,
    listener: Arc<dyn BatchEventListener<StudentResult>>,
    config: StepConfig,
    token: CancellationToken,
) {
    let timer = TimedOperation::new(&format!("execution {}", execution_id));
    let (outcome, counters) = match FlatFileReader::open(&parameters.file_path) {
        Ok(reader) => {
            if let Err(e) = lifecycle.mark_started(execution_id).await {
                log_error!("Failed to mark execution {} started: {}", execution_id, e);
            }
            let step = ChunkedStep::new(
                Box::new(reader),
                processor,
                writer,
                listener.clone(),
                Box::new(AlwaysSkipPolicy),
                config,
            );
            step.run(execution_id, &lifecycle, token).await
        }
        Err(e) => {
            log_error!(
                "Execution {} could not open '{}': {}",
                execution_id,
                parameters.file_path,
                e
            );
            (
                StepOutcome::Failed(vec![e.to_string()]),
                StepCounters::default(),
            )
        }
    };

    timer.finish_with_info(&format!(
        "read {}, written {}, skipped {}",
        counters.read_count, counters.write_count, counters.skip_count
    ));

    match lifecycle.finalize(execution_id, &outcome, counters).await {
        Ok(final_execution) => listener.after_job(&final_execution).await,
        Err(e) => log_error!("Failed to finalize execution {}: {}", execution_id, e),
    }
}
