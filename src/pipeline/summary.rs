use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use serde::Serialize;
use crate::pipeline::executor::UpdateOutcome;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    Updated,
    AlreadyConsistent,
    SkippedNoTimestamp,
    Failed,
    Error,
}

impl OutcomeCategory {
    pub const ALL: [OutcomeCategory; 5] = [
        OutcomeCategory::Updated,
        OutcomeCategory::AlreadyConsistent,
        OutcomeCategory::SkippedNoTimestamp,
        OutcomeCategory::Failed,
        OutcomeCategory::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeCategory::Updated => "updated",
            OutcomeCategory::AlreadyConsistent => "already_consistent",
            OutcomeCategory::SkippedNoTimestamp => "skipped_no_timestamp",
            OutcomeCategory::Failed => "failed",
            OutcomeCategory::Error => "error",
        }
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Running tallies; fed one outcome at a time by the scheduler.
#[derive(Debug, Default)]
pub struct OutcomeAggregator {
    counts: BTreeMap<OutcomeCategory, usize>,
    scanned: usize,
    paired: usize,
}

impl OutcomeAggregator {
    pub fn new(scanned: usize, paired: usize) -> Self {
        Self {
            counts: BTreeMap::new(),
            scanned,
            paired,
        }
    }

    pub fn fold(&mut self, outcome: &UpdateOutcome) {
        *self.counts.entry(outcome.category()).or_insert(0) += 1;
    }

    pub fn count(&self, category: OutcomeCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn processed(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn finish(self, elapsed: Duration, interrupted: bool) -> RunSummary {
        let processed = self.processed();
        let counts = OutcomeCategory::ALL
            .iter()
            .map(|c| (*c, self.counts.get(c).copied().unwrap_or(0)))
            .collect();
        RunSummary {
            counts,
            scanned: self.scanned,
            paired: self.paired,
            processed,
            elapsed,
            interrupted,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Every category is present, zero or not.
    pub counts: BTreeMap<OutcomeCategory, usize>,
    pub scanned: usize,
    pub paired: usize,
    pub processed: usize,
    pub elapsed: Duration,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn count(&self, category: OutcomeCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Pairs per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > f64::EPSILON {
            self.paired as f64 / secs
        } else {
            0.0
        }
    }

    pub fn unpaired(&self) -> usize {
        self.scanned.saturating_sub(self.paired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn skipped(file: &str) -> UpdateOutcome {
        UpdateOutcome::SkippedNoTimestamp { file: file.into() }
    }

    #[test]
    fn folds_counts_per_category() {
        let mut agg = OutcomeAggregator::new(10, 4);
        agg.fold(&UpdateOutcome::Updated { file: "a.jpg".into(), previous: None, new: "x".into() });
        agg.fold(&skipped("b.jpg"));
        agg.fold(&skipped("c.jpg"));
        agg.fold(&UpdateOutcome::Failed { file: "d.jpg".into(), message: "File not found".into() });

        assert_eq!(agg.count(OutcomeCategory::SkippedNoTimestamp), 2);
        assert_eq!(agg.processed(), 4);

        let summary = agg.finish(Duration::from_secs(2), false);
        assert_eq!(summary.count(OutcomeCategory::Updated), 1);
        assert_eq!(summary.count(OutcomeCategory::Failed), 1);
        assert_eq!(summary.count(OutcomeCategory::Error), 0);
        assert_eq!(summary.counts.len(), 5);
        assert_eq!(summary.unpaired(), 6);
        assert_eq!(summary.throughput(), 2.0);
    }

    #[test]
    fn throughput_with_no_elapsed_time() {
        let summary = OutcomeAggregator::new(1, 1).finish(Duration::ZERO, false);
        assert_eq!(summary.throughput(), 0.0);
        assert_eq!(summary.processed, 0);
    }
}
