/// Chunk-oriented pipeline engine
///
/// Drives one job execution: read up to `chunk_size` records, process each,
/// commit the accepted buffer as one atomic write, repeat until the source
/// is exhausted, a fatal fault occurs, or a stop is requested. Faults are
/// tolerated via the skip path up to a global skip limit.
pub mod reader;
pub mod writer;

use crate::modules::jobs::domain::entities::StepCounters;
use crate::modules::jobs::domain::listener::{BatchEventListener, SkipPhase};
use crate::modules::jobs::lifecycle::JobLifecycleManager;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Sequential source of items. `Ok(None)` means the source is exhausted;
/// `Err` is a read-phase fault and the reader must have advanced past the
/// offending input.
#[async_trait]
pub trait ItemReader<T>: Send {
    async fn read(&mut self) -> AppResult<Option<T>>;
}

/// Per-item transformation. `Ok(None)` filters the item out (a business-rule
/// rejection, not a fault).
#[async_trait]
pub trait ItemProcessor<T>: Send + Sync {
    async fn process(&self, item: &T) -> AppResult<Option<T>>;
}

/// Atomic chunk sink. A failed write rolls back the whole chunk.
#[async_trait]
pub trait ItemWriter<T>: Send + Sync {
    async fn write(&self, items: &[T]) -> AppResult<()>;
}

/// Decides which fault categories are skip-eligible
pub trait SkipPolicy: Send + Sync {
    fn should_skip(&self, error: &AppError) -> bool;
}

/// Default policy: every fault category is skip-eligible, bounded only by
/// the shared skip limit
pub struct AlwaysSkipPolicy;

impl SkipPolicy for AlwaysSkipPolicy {
    fn should_skip(&self, _error: &AppError) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StepConfig {
    pub chunk_size: usize,
    pub skip_limit: usize,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            skip_limit: 1000,
        }
    }
}

impl StepConfig {
    /// Read overrides from `BATCH_CHUNK_SIZE` and `BATCH_SKIP_LIMIT`.
    /// A chunk size of zero would read nothing and never terminate, so the
    /// value is clamped to at least 1.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            chunk_size: std::env::var("BATCH_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.chunk_size)
                .max(1),
            skip_limit: std::env::var("BATCH_SKIP_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.skip_limit),
        }
    }
}

/// Terminal result of one step run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Stopped,
    Failed(Vec<String>),
}

/// Skip accounting for one execution: one shared limit across all phases
struct SkipTracker {
    limit: usize,
    failures: Vec<String>,
}

impl SkipTracker {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            failures: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.failures.len() >= self.limit
    }
}

/// Outcome of routing one fault through the skip path: tolerated, or fatal
/// with the terminal step outcome.
async fn handle_skip<T: Send + Sync>(
    phase: SkipPhase,
    item: Option<&T>,
    error: AppError,
    policy: &dyn SkipPolicy,
    tracker: &mut SkipTracker,
    counters: &mut StepCounters,
    listener: &dyn BatchEventListener<T>,
) -> Result<(), StepOutcome> {
    if !policy.should_skip(&error) {
        return Err(StepOutcome::Failed(vec![format!(
            "Non-skippable fault in {}: {}",
            phase, error
        )]));
    }

    if tracker.is_full() {
        let mut messages = tracker.failures.clone();
        messages.push(
            AppError::SkipLimitExceeded(format!(
                "limit {} reached, fatal fault in {}: {}",
                tracker.limit, phase, error
            ))
            .to_string(),
        );
        return Err(StepOutcome::Failed(messages));
    }

    tracker.failures.push(error.to_string());
    counters.skip_count += 1;
    listener.on_skip(phase, item, &error).await;
    Ok(())
}

pub struct ChunkedStep<T: Sync> {
    reader: Box<dyn ItemReader<T>>,
    processor: Arc<dyn ItemProcessor<T>>,
    writer: Arc<dyn ItemWriter<T>>,
    listener: Arc<dyn BatchEventListener<T>>,
    policy: Box<dyn SkipPolicy>,
    config: StepConfig,
}

impl<T: Send + Sync> ChunkedStep<T> {
    pub fn new(
        reader: Box<dyn ItemReader<T>>,
        processor: Arc<dyn ItemProcessor<T>>,
        writer: Arc<dyn ItemWriter<T>>,
        listener: Arc<dyn BatchEventListener<T>>,
        policy: Box<dyn SkipPolicy>,
        config: StepConfig,
    ) -> Self {
        Self {
            reader,
            processor,
            writer,
            listener,
            policy,
            // Zero would spin without ever filling a chunk
            config: StepConfig {
                chunk_size: config.chunk_size.max(1),
                ..config
            },
        }
    }

    /// Run the step to its terminal outcome for `execution_id`, pushing
    /// counter snapshots to the lifecycle manager at chunk boundaries.
    pub async fn run(
        self,
        execution_id: i64,
        lifecycle: &JobLifecycleManager,
        token: CancellationToken,
    ) -> (StepOutcome, StepCounters) {
        let ChunkedStep {
            mut reader,
            processor,
            writer,
            listener,
            policy,
            config,
        } = self;

        let mut counters = StepCounters::default();
        let mut tracker = SkipTracker::new(config.skip_limit);

        loop {
            // Cooperative cancellation, checked before each new chunk; a
            // chunk already in flight always runs to completion.
            if token.is_cancelled() {
                lifecycle.update_counters(execution_id, counters).await;
                return (StepOutcome::Stopped, counters);
            }

            let mut buffer: Vec<T> = Vec::with_capacity(config.chunk_size);
            let mut exhausted = false;
            let mut consumed = 0u64;

            while buffer.len() < config.chunk_size {
                match reader.read().await {
                    Ok(Some(item)) => {
                        consumed += 1;
                        counters.read_count += 1;
                        match processor.process(&item).await {
                            Ok(Some(accepted)) => buffer.push(accepted),
                            Ok(None) => counters.filter_count += 1,
                            Err(e) => {
                                if let Err(outcome) = handle_skip(
                                    SkipPhase::Process,
                                    Some(&item),
                                    e,
                                    policy.as_ref(),
                                    &mut tracker,
                                    &mut counters,
                                    listener.as_ref(),
                                )
                                .await
                                {
                                    lifecycle.update_counters(execution_id, counters).await;
                                    return (outcome, counters);
                                }
                            }
                        }
                    }
                    Ok(None) => {
                        exhausted = true;
                        break;
                    }
                    Err(e) => {
                        consumed += 1;
                        counters.read_count += 1;
                        if let Err(outcome) = handle_skip(
                            SkipPhase::Read,
                            None,
                            e,
                            policy.as_ref(),
                            &mut tracker,
                            &mut counters,
                            listener.as_ref(),
                        )
                        .await
                        {
                            lifecycle.update_counters(execution_id, counters).await;
                            return (outcome, counters);
                        }
                    }
                }
            }

            if !buffer.is_empty() {
                match writer.write(&buffer).await {
                    Ok(()) => {
                        counters.write_count += buffer.len() as u64;
                        counters.commit_count += 1;
                        LogContext::chunk_committed(
                            execution_id,
                            buffer.len(),
                            counters.write_count,
                        );
                    }
                    Err(e) => {
                        counters.rollback_count += 1;
                        for item in &buffer {
                            if let Err(outcome) = handle_skip(
                                SkipPhase::Write,
                                Some(item),
                                e.clone(),
                                policy.as_ref(),
                                &mut tracker,
                                &mut counters,
                                listener.as_ref(),
                            )
                            .await
                            {
                                lifecycle.update_counters(execution_id, counters).await;
                                return (outcome, counters);
                            }
                        }
                    }
                }
            } else if consumed > 0 {
                // Chunk consumed input but everything was filtered or
                // skipped; the chunk transaction still commits.
                counters.commit_count += 1;
            }

            lifecycle.update_counters(execution_id, counters).await;

            if exhausted {
                return (StepOutcome::Completed, counters);
            }
        }
    }
}
