use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Serialize;

pub mod cli;
pub mod config;
pub mod media;
pub mod pipeline;
pub mod tagger;
pub mod utils;

/// A media file found under the scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    pub path: PathBuf,
    /// File name without its final extension.
    pub stem: String,
    /// Lower-cased extension, no leading dot.
    pub extension: String,
}

impl MediaFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self { path, stem, extension }
    }

    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A sidecar JSON record that may describe one or more media files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub path: PathBuf,
    pub stem: String,
}

impl MetadataRecord {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, stem }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchTier {
    /// Record name starts with the media name.
    Forward,
    /// Media name starts with a long record name.
    Reverse,
    /// Longest shared prefix between two long names.
    Fuzzy,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Forward => "forward",
            MatchTier::Reverse => "reverse",
            MatchTier::Fuzzy => "fuzzy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub media: MediaFile,
    pub metadata: MetadataRecord,
    pub tier: MatchTier,
}

#[derive(Debug, thiserror::Error)]
pub enum FixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory not found: {}", .0.display())]
    TargetNotFound(PathBuf),
    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("External tagger unavailable: {0}")]
    TaggerUnavailable(String),
    #[error("{program} did not finish within {}s", .timeout.as_secs_f64())]
    TaggerTimeout { program: String, timeout: Duration },
    #[error("No media files found in {}", .0.display())]
    NoMediaFiles(PathBuf),
    #[error("No media+JSON pairs found in {}", .0.display())]
    NoPairs(PathBuf),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Interrupted by user")]
    Interrupted,
}

impl FixError {
    pub fn exit_code(&self) -> u8 {
        match self {
            FixError::Interrupted => 130,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, FixError>;

// Re-exports for convenience
pub use config::{RunConfig, TagProfile};
pub use media::index::CandidateIndex;
pub use media::matcher::PairMatcher;
pub use media::metadata::{CaptureTime, MetadataReader};
pub use media::scanner::MediaScanner;
pub use pipeline::discovery::{DiscoveryResult, PairDiscovery};
pub use pipeline::executor::{UpdateExecutor, UpdateOutcome};
pub use pipeline::run::{discover_pairs, fix_dates, list_pairs};
pub use pipeline::scheduler::{BatchReport, BatchScheduler};
pub use pipeline::summary::{OutcomeAggregator, OutcomeCategory, RunSummary};
pub use tagger::{ExifTool, TagWrite, Tagger};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_file_splits_name_parts() {
        let media = MediaFile::from_path("/photos/2019/IMG_0001.JPG");
        assert_eq!(media.stem, "IMG_0001");
        assert_eq!(media.extension, "jpg");
        assert_eq!(media.directory(), Path::new("/photos/2019"));
        assert_eq!(media.file_name(), "IMG_0001.JPG");
    }

    #[test]
    fn record_stem_keeps_inner_dots() {
        let record = MetadataRecord::from_path("/p/IMG_0001.jpg.supplemental-metadata.json");
        assert_eq!(record.stem, "IMG_0001.jpg.supplemental-metadata");
    }

    #[test]
    fn interrupt_has_distinct_exit_code() {
        assert_eq!(FixError::Interrupted.exit_code(), 130);
        assert_eq!(FixError::NoPairs(PathBuf::from("x")).exit_code(), 1);
    }
}
