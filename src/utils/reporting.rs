use std::path::Path;
use csv::Writer;
use log::info;
use serde::Serialize;
use crate::media::metadata::MetadataReader;
use crate::pipeline::executor::UpdateOutcome;
use crate::pipeline::summary::{OutcomeCategory, RunSummary};
use crate::{Pair, Result};

/// One CSV row per processed pair.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutcomeRecord {
    pub file: String,
    pub status: OutcomeCategory,
    pub previous: Option<String>,
    pub new: Option<String>,
    pub error: Option<String>,
}

impl From<&UpdateOutcome> for OutcomeRecord {
    fn from(outcome: &UpdateOutcome) -> Self {
        let (previous, new, error) = match outcome {
            UpdateOutcome::Updated { previous, new, .. } => (previous.clone(), Some(new.clone()), None),
            UpdateOutcome::AlreadyConsistent { timestamp, .. } => {
                (Some(timestamp.clone()), Some(timestamp.clone()), None)
            }
            UpdateOutcome::SkippedNoTimestamp { .. } => (None, None, None),
            UpdateOutcome::Failed { message, .. } | UpdateOutcome::Error { message, .. } => {
                (None, None, Some(message.clone()))
            }
        };
        Self {
            file: outcome.file().to_string(),
            status: outcome.category(),
            previous,
            new,
            error,
        }
    }
}

/// One CSV row per discovered pair, for the read-only audit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PairRecord {
    pub media: String,
    pub metadata: String,
    pub tier: &'static str,
    pub captured_at: Option<String>,
}

impl From<&Pair> for PairRecord {
    fn from(pair: &Pair) -> Self {
        Self {
            media: pair.media.path.display().to_string(),
            metadata: pair.metadata.path.display().to_string(),
            tier: pair.tier.as_str(),
            captured_at: MetadataReader::read(&pair.metadata.path).map(|c| c.standard()),
        }
    }
}

#[derive(Debug, Default)]
pub struct Reporter;

impl Reporter {
    pub fn log_summary(&self, summary: &RunSummary) {
        let rule = "=".repeat(70);
        info!("{}", rule);
        info!("TAKEOUT DATE FIX SUMMARY{}", if summary.interrupted { " (interrupted)" } else { "" });
        info!("{}", rule);
        info!("Files updated successfully: {}", summary.count(OutcomeCategory::Updated));
        info!("Files already correctly set: {}", summary.count(OutcomeCategory::AlreadyConsistent));
        info!("Files failed to update: {}", summary.count(OutcomeCategory::Failed));
        info!("Files with errors: {}", summary.count(OutcomeCategory::Error));
        info!("Files skipped (no JSON date): {}", summary.count(OutcomeCategory::SkippedNoTimestamp));
        info!("Total media+json pairs: {}", summary.paired);
        info!("Total media files scanned: {} ({} without a JSON match)", summary.scanned, summary.unpaired());
        info!("Processing rate: {:.1} files/second", summary.throughput());
        info!("Total time: {:.1} seconds", summary.elapsed.as_secs_f64());
        info!("{}", rule);
    }

    pub fn write_outcome_report(&self, records: &[OutcomeRecord], output_path: impl AsRef<Path>) -> Result<()> {
        let output_path = output_path.as_ref();
        let mut writer = Writer::from_path(output_path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        info!("Outcome report written: {}", output_path.display());
        Ok(())
    }

    pub fn write_pair_report(&self, records: &[PairRecord], output_path: impl AsRef<Path>) -> Result<()> {
        let output_path = output_path.as_ref();
        let mut writer = Writer::from_path(output_path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        info!("Pair report written: {}", output_path.display());
        Ok(())
    }
}
