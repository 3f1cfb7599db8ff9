use std::sync::atomic::{AtomicBool, Ordering};
use log::{debug, info, warn};
use crate::pipeline::executor::{UpdateExecutor, UpdateOutcome};
use crate::pipeline::summary::{OutcomeAggregator, OutcomeCategory};
use crate::tagger::Tagger;
use crate::utils::parallel::{catch_panic, run_bounded, ProgressTracker};
use crate::{Pair, Result};

pub const UPDATE_PROGRESS_EVERY: usize = 100;
const SAMPLE_SUCCESSES: usize = 5;
const SAMPLE_FAILURES: usize = 3;

#[derive(Debug)]
pub struct BatchReport {
    pub total: usize,
    pub completed: usize,
    pub interrupted: bool,
}

/// Spreads pairs over a worker pool sized for concurrent tagger processes.
pub struct BatchScheduler {
    workers: usize,
    progress_every: usize,
}

impl BatchScheduler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            progress_every: UPDATE_PROGRESS_EVERY,
        }
    }

    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every.max(1);
        self
    }

    /// Runs every pair through `executor`, folding outcomes into `aggregator`
    /// as they complete. `on_outcome` sees each outcome after it is counted.
    pub fn run<T, F>(
        &self,
        executor: &UpdateExecutor<T>,
        pairs: Vec<Pair>,
        aggregator: &mut OutcomeAggregator,
        cancel: &AtomicBool,
        mut on_outcome: F,
    ) -> Result<BatchReport>
    where
        T: Tagger,
        F: FnMut(&UpdateOutcome),
    {
        let total = pairs.len();
        info!("Processing {} files with {} workers...", total, self.workers);
        let tracker = ProgressTracker::new(total);
        let mut completed = 0;

        run_bounded(
            pairs,
            self.workers,
            cancel,
            |pair: Pair| {
                catch_panic(|| executor.apply(&pair))
                    .unwrap_or_else(|panic| UpdateOutcome::error(pair.media.file_name(), &panic))
            },
            |outcome: UpdateOutcome| {
                aggregator.fold(&outcome);
                completed += 1;
                log_outcome(&outcome, aggregator);

                if completed % self.progress_every == 0 || completed == total {
                    let p = tracker.snapshot(completed);
                    info!(
                        "PROGRESS: {}/{} ({:.1}/sec, ETA: {:.0}s)",
                        p.processed,
                        p.total,
                        p.rate,
                        p.eta.map_or(0.0, |eta| eta.as_secs_f64())
                    );
                }
                on_outcome(&outcome);
            },
        )?;

        let interrupted = cancel.load(Ordering::SeqCst) && completed < total;
        if interrupted {
            warn!("Interrupted after {}/{} files; in-flight tagger writes may be partial", completed, total);
        }
        Ok(BatchReport {
            total,
            completed,
            interrupted,
        })
    }
}

/// Shows the first few successes and failures, the rest only at debug.
fn log_outcome(outcome: &UpdateOutcome, aggregator: &OutcomeAggregator) {
    match outcome {
        UpdateOutcome::Updated { file, previous, new } => {
            if aggregator.count(OutcomeCategory::Updated) <= SAMPLE_SUCCESSES {
                info!("UPDATED: {} -> {} (was {})", file, new, previous.as_deref().unwrap_or("not set"));
            } else {
                debug!("UPDATED: {} -> {}", file, new);
            }
        }
        UpdateOutcome::Failed { file, message } | UpdateOutcome::Error { file, message } => {
            let failures = aggregator.count(OutcomeCategory::Failed) + aggregator.count(OutcomeCategory::Error);
            if failures <= SAMPLE_FAILURES {
                warn!("ERROR: {} - {}", file, message);
            } else {
                debug!("ERROR: {} - {}", file, message);
            }
        }
        UpdateOutcome::AlreadyConsistent { file, timestamp } => debug!("Already set: {} ({})", file, timestamp),
        UpdateOutcome::SkippedNoTimestamp { file } => debug!("Skipped (no JSON date): {}", file),
    }
}
