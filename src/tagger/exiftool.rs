use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use log::debug;
use crate::tagger::process::run_with_timeout;
use crate::tagger::{TagAssignment, TagWrite, Tagger};
use crate::{FixError, Result};

pub const DEFAULT_PROGRAM: &str = "exiftool";
pub const PRIMARY_TAG: &str = "DateTimeOriginal";

const VERSION_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>, read_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            read_timeout,
            write_timeout,
        }
    }

    /// Confirms the tool runs and returns its version string.
    pub fn version(&self) -> Result<String> {
        let output = run_with_timeout(Command::new(&self.program).arg("-ver"), VERSION_TIMEOUT)
            .map_err(|e| FixError::TaggerUnavailable(format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            return Err(FixError::TaggerUnavailable(format!(
                "{} -ver exited with {}",
                self.program.display(),
                output.status
            )));
        }
        Ok(output.stdout.trim().to_string())
    }

    /// The path is passed through untouched; file names need not be UTF-8.
    pub fn write_args(path: &Path, assignments: &[TagAssignment]) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-overwrite_original", "-P", "-q"].into_iter().map(OsString::from).collect();
        args.extend(assignments.iter().map(|a| OsString::from(a.to_arg())));
        args.push(path.as_os_str().to_owned());
        args
    }
}

impl Tagger for ExifTool {
    fn read_primary(&self, path: &Path) -> Result<Option<String>> {
        let output = run_with_timeout(
            Command::new(&self.program)
                .arg(format!("-{}", PRIMARY_TAG))
                .arg("-s3")
                .arg(path),
            self.read_timeout,
        )?;

        if !output.status.success() {
            debug!("No readable {} in {}", PRIMARY_TAG, path.display());
            return Ok(None);
        }
        let current = output.stdout.trim();
        Ok((!current.is_empty()).then(|| current.to_string()))
    }

    fn write(&self, path: &Path, assignments: &[TagAssignment]) -> Result<TagWrite> {
        let output = run_with_timeout(
            Command::new(&self.program).args(Self::write_args(path, assignments)),
            self.write_timeout,
        )?;

        if output.status.success() {
            Ok(TagWrite::Written)
        } else {
            Ok(TagWrite::Rejected(output.diagnostic()))
        }
    }
}
