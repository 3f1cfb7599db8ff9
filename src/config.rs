use std::path::PathBuf;
use std::time::Duration;
use clap::ValueEnum;
use crate::media::metadata::CaptureTime;
use crate::tagger::exiftool::DEFAULT_PROGRAM;
use crate::tagger::TagAssignment;
use crate::{FixError, Result};

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "dng", "jpg", "jpeg", "png", "heic", "heif", "tiff", "webp", "bmp", "mov", "mp4", "gif", "3gpp",
];

/// Hard ceiling for `--max-workers`.
pub const MAX_WORKER_CEILING: usize = 32;
pub const PAIR_WORKER_CEILING: usize = 16;

/// Which rendering of the capture time a tag expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateForm {
    Standard,
    SubSecond,
}

const FULL_FIELDS: &[(&str, DateForm)] = &[
    ("SubSecDateTimeOriginal", DateForm::SubSecond),
    ("DateTimeOriginal", DateForm::Standard),
    ("SubSecCreateDate", DateForm::SubSecond),
    ("CreationDate", DateForm::Standard),
    ("CreateDate", DateForm::Standard),
    ("SubSecMediaCreateDate", DateForm::SubSecond),
    ("MediaCreateDate", DateForm::Standard),
    ("DateTimeCreated", DateForm::Standard),
    ("DateTime", DateForm::Standard),
    ("DateTimeDigitized", DateForm::Standard),
    ("SubSecDateTime", DateForm::SubSecond),
    ("SubSecDateTimeDigitized", DateForm::SubSecond),
    // video containers
    ("ContentCreateDate", DateForm::Standard),
    ("TrackCreateDate", DateForm::Standard),
    ("MediaModifyDate", DateForm::Standard),
    // filesystem, as seen by the tagger
    ("FileModifyDate", DateForm::Standard),
    ("FileCreateDate", DateForm::Standard),
    ("ModifyDate", DateForm::Standard),
    ("MetadataDate", DateForm::Standard),
    ("DigitalCreationDate", DateForm::Standard),
    ("DateCreated", DateForm::Standard),
];

const BASIC_FIELDS: &[(&str, DateForm)] = &[
    ("DateTimeOriginal", DateForm::Standard),
    ("CreateDate", DateForm::Standard),
    ("DateTime", DateForm::Standard),
    ("DateTimeDigitized", DateForm::Standard),
];

/// The set of date tags written for every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TagProfile {
    /// Core EXIF date tags only
    Basic,
    /// Every date tag photo libraries look at, including video and sub-second tags
    #[default]
    Full,
}

impl TagProfile {
    pub fn fields(&self) -> &'static [(&'static str, DateForm)] {
        match self {
            TagProfile::Basic => BASIC_FIELDS,
            TagProfile::Full => FULL_FIELDS,
        }
    }

    /// Assignments in the profile's fixed order.
    pub fn assignments(&self, capture: &CaptureTime) -> Vec<TagAssignment> {
        let standard = capture.standard();
        let subsecond = capture.subsecond();
        self.fields()
            .iter()
            .map(|(tag, form)| TagAssignment {
                tag: (*tag).to_string(),
                value: match form {
                    DateForm::Standard => standard.clone(),
                    DateForm::SubSecond => subsecond.clone(),
                },
            })
            .collect()
    }
}

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root: PathBuf,
    pub pair_workers: usize,
    pub update_workers: usize,
    pub force_overwrite: bool,
    pub profile: TagProfile,
    pub extensions: Vec<String>,
    pub update_file_times: bool,
    pub tagger_program: PathBuf,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub report: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let cpus = num_cpus::get();
        Self {
            root: root.into(),
            pair_workers: default_pair_workers(cpus),
            update_workers: default_update_workers(cpus),
            force_overwrite: false,
            profile: TagProfile::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            update_file_times: true,
            tagger_program: PathBuf::from(DEFAULT_PROGRAM),
            read_timeout: Duration::from_secs(8),
            write_timeout: Duration::from_secs(30),
            report: None,
        }
    }

    /// Fails fast on a missing or non-directory root.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(FixError::TargetNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(FixError::NotADirectory(self.root.clone()));
        }
        if self.pair_workers == 0 || self.update_workers == 0 {
            return Err(FixError::Config("worker count must be at least 1".into()));
        }
        if self.extensions.is_empty() {
            return Err(FixError::Config("no media extensions configured".into()));
        }
        Ok(())
    }
}

pub fn default_update_workers(cpus: usize) -> usize {
    cpus.min(12).max(1)
}

pub fn default_pair_workers(cpus: usize) -> usize {
    (cpus * 2).min(PAIR_WORKER_CEILING).max(1)
}

/// `--max-workers` wins (capped at 32); otherwise `--workers` is capped at twice the CPU count.
pub fn resolve_update_workers(workers: Option<usize>, max_workers: Option<usize>, cpus: usize) -> usize {
    match (max_workers, workers) {
        (Some(max), _) => max.min(MAX_WORKER_CEILING),
        (None, Some(workers)) => workers.min(cpus * 2),
        (None, None) => default_update_workers(cpus),
    }
}

/// Lower-cases and strips leading dots; drops blanks.
pub fn normalize_extensions(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
