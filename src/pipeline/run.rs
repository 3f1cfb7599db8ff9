use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use log::info;
use crate::config::RunConfig;
use crate::media::scanner::MediaScanner;
use crate::pipeline::discovery::{DiscoveryResult, PairDiscovery};
use crate::pipeline::executor::UpdateExecutor;
use crate::pipeline::scheduler::BatchScheduler;
use crate::pipeline::summary::{OutcomeAggregator, RunSummary};
use crate::tagger::Tagger;
use crate::utils::reporting::{OutcomeRecord, PairRecord, Reporter};
use crate::{FixError, Result};

/// Scan and pair only. Fails when nothing at all could be paired.
pub fn discover_pairs(config: &RunConfig, cancel: &AtomicBool) -> Result<DiscoveryResult> {
    info!("Scanning {} for media files...", config.root.display());
    let scanner = MediaScanner::new(&config.extensions);
    let discovery = PairDiscovery::new(config.pair_workers)?;
    let result = discovery.discover(&scanner, &config.root, cancel);

    if cancel.load(Ordering::SeqCst) {
        return Err(FixError::Interrupted);
    }
    if result.scanned == 0 {
        return Err(FixError::NoMediaFiles(config.root.clone()));
    }
    if result.pairs.is_empty() {
        return Err(FixError::NoPairs(config.root.clone()));
    }
    Ok(result)
}

/// The whole run: discover, update every pair, summarise.
///
/// Returns the summary even when interrupted mid-batch; the caller decides
/// the exit status from `RunSummary::interrupted`.
pub fn fix_dates<T: Tagger>(config: &RunConfig, tagger: T, cancel: &AtomicBool) -> Result<RunSummary> {
    let started = Instant::now();
    let discovered = discover_pairs(config, cancel)?;

    let executor = UpdateExecutor::new(tagger, config.profile)
        .force_overwrite(config.force_overwrite)
        .update_file_times(config.update_file_times);
    let mut aggregator = OutcomeAggregator::new(discovered.scanned, discovered.pairs.len());
    let mut records = Vec::new();
    let keep_records = config.report.is_some();

    let report = BatchScheduler::new(config.update_workers).run(
        &executor,
        discovered.pairs,
        &mut aggregator,
        cancel,
        |outcome| {
            if keep_records {
                records.push(OutcomeRecord::from(outcome));
            }
        },
    )?;

    let summary = aggregator.finish(started.elapsed(), report.interrupted);
    let reporter = Reporter::default();
    reporter.log_summary(&summary);
    if let Some(path) = &config.report {
        reporter.write_outcome_report(&records, path)?;
    }
    Ok(summary)
}

/// Read-only audit of what `fix_dates` would pair.
pub fn list_pairs(config: &RunConfig, cancel: &AtomicBool) -> Result<Vec<PairRecord>> {
    let discovered = discover_pairs(config, cancel)?;
    let mut records: Vec<PairRecord> = discovered.pairs.iter().map(PairRecord::from).collect();
    records.sort_by(|a, b| a.media.cmp(&b.media));

    let reporter = Reporter::default();
    match &config.report {
        Some(path) => reporter.write_pair_report(&records, path)?,
        None => {
            for r in &records {
                info!(
                    "{} -> {} [{}] {}",
                    r.media,
                    r.metadata,
                    r.tier,
                    r.captured_at.as_deref().unwrap_or("no timestamp")
                );
            }
        }
    }
    info!("{} pairs among {} media files", records.len(), discovered.scanned);
    Ok(records)
}
