use log::debug;
use crate::config::TagProfile;
use crate::media::metadata::MetadataReader;
use crate::pipeline::summary::OutcomeCategory;
use crate::tagger::{TagWrite, Tagger};
use crate::utils::file_ops;
use crate::{Pair, Result};

/// Error text carried by an outcome is cut to this many characters.
pub const MAX_MESSAGE_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated {
        file: String,
        previous: Option<String>,
        new: String,
    },
    AlreadyConsistent {
        file: String,
        timestamp: String,
    },
    SkippedNoTimestamp {
        file: String,
    },
    /// The tagger ran and refused the write.
    Failed {
        file: String,
        message: String,
    },
    /// Something went wrong around the tagger: I/O, timeout, panic.
    Error {
        file: String,
        message: String,
    },
}

impl UpdateOutcome {
    pub fn category(&self) -> OutcomeCategory {
        match self {
            UpdateOutcome::Updated { .. } => OutcomeCategory::Updated,
            UpdateOutcome::AlreadyConsistent { .. } => OutcomeCategory::AlreadyConsistent,
            UpdateOutcome::SkippedNoTimestamp { .. } => OutcomeCategory::SkippedNoTimestamp,
            UpdateOutcome::Failed { .. } => OutcomeCategory::Failed,
            UpdateOutcome::Error { .. } => OutcomeCategory::Error,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            UpdateOutcome::Updated { file, .. }
            | UpdateOutcome::AlreadyConsistent { file, .. }
            | UpdateOutcome::SkippedNoTimestamp { file }
            | UpdateOutcome::Failed { file, .. }
            | UpdateOutcome::Error { file, .. } => file,
        }
    }

    pub fn error(file: String, message: &str) -> Self {
        UpdateOutcome::Error {
            file,
            message: truncate_message(message),
        }
    }
}

pub fn truncate_message(message: &str) -> String {
    message.trim().chars().take(MAX_MESSAGE_CHARS).collect()
}

/// Writes one pair's capture time into its media file.
pub struct UpdateExecutor<T: Tagger> {
    tagger: T,
    profile: TagProfile,
    force_overwrite: bool,
    update_file_times: bool,
}

impl<T: Tagger> UpdateExecutor<T> {
    pub fn new(tagger: T, profile: TagProfile) -> Self {
        Self {
            tagger,
            profile,
            force_overwrite: false,
            update_file_times: true,
        }
    }

    /// Always write, even when the primary tag already matches.
    pub fn force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn update_file_times(mut self, enabled: bool) -> Self {
        self.update_file_times = enabled;
        self
    }

    pub fn tagger(&self) -> &T {
        &self.tagger
    }

    /// Never fails: anything that goes wrong becomes an `Error` outcome.
    pub fn apply(&self, pair: &Pair) -> UpdateOutcome {
        match self.try_apply(pair) {
            Ok(outcome) => outcome,
            Err(e) => UpdateOutcome::error(pair.media.file_name(), &e.to_string()),
        }
    }

    fn try_apply(&self, pair: &Pair) -> Result<UpdateOutcome> {
        let file = pair.media.file_name();

        let Some(capture) = MetadataReader::read(&pair.metadata.path) else {
            return Ok(UpdateOutcome::SkippedNoTimestamp { file });
        };
        let new = capture.standard();

        let previous = self.tagger.read_primary(&pair.media.path)?;
        if !self.force_overwrite && previous.as_deref() == Some(new.as_str()) {
            return Ok(UpdateOutcome::AlreadyConsistent { file, timestamp: new });
        }

        let assignments = self.profile.assignments(&capture);
        match self.tagger.write(&pair.media.path, &assignments)? {
            TagWrite::Written => {
                if self.update_file_times {
                    // The embedded write already succeeded; filesystem times are a bonus
                    if let Err(e) = file_ops::apply_capture_time(&pair.media.path, &capture) {
                        debug!("Could not set file times on {}: {}", file, e);
                    }
                }
                Ok(UpdateOutcome::Updated { file, previous, new })
            }
            TagWrite::Rejected(diagnostic) => Ok(UpdateOutcome::Failed {
                file,
                message: truncate_message(&diagnostic),
            }),
        }
    }
}
