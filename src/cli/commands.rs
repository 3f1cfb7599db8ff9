use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use crate::config::{self, normalize_extensions, RunConfig, TagProfile};
use crate::Result;

#[derive(Parser)]
#[command(name = "takeout-fix")]
#[command(version)]
#[command(about = "Writes capture dates from Google Takeout JSON sidecars into photos and videos", long_about = None)]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory containing the Takeout photos and JSON files
    pub directory: PathBuf,

    /// Media extensions to include, comma separated (default: common photo and video types)
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pair media with their JSON records and write the capture dates
    Fix {
        #[command(flatten)]
        scan: ScanArgs,

        /// Number of parallel tagger workers (capped at twice the CPU count)
        #[arg(short = 'w', long)]
        workers: Option<usize>,

        /// Override the worker limit (hard ceiling 32)
        #[arg(long)]
        max_workers: Option<usize>,

        /// Rewrite every date tag even when DateTimeOriginal already matches
        #[arg(short, long)]
        force: bool,

        /// Which set of date tags to write
        #[arg(long, value_enum, default_value_t = TagProfile::Full)]
        profile: TagProfile,

        /// Leave filesystem access/modify times alone
        #[arg(long)]
        no_file_times: bool,

        /// ExifTool executable
        #[arg(long, default_value = "exiftool")]
        exiftool: PathBuf,

        /// Write a per-file CSV of outcomes here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List media+JSON pairs and their capture dates without writing anything
    Pairs {
        #[command(flatten)]
        scan: ScanArgs,

        /// CSV output path (logs the pairs when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

impl ScanArgs {
    pub fn apply_to(&self, config: &mut RunConfig) {
        if let Some(extensions) = &self.extensions {
            config.extensions = normalize_extensions(extensions);
        }
    }
}

impl Commands {
    pub fn to_config(&self) -> Result<RunConfig> {
        let config = match self {
            Commands::Fix {
                scan,
                workers,
                max_workers,
                force,
                profile,
                no_file_times,
                exiftool,
                report,
            } => {
                let mut config = RunConfig::new(&scan.directory);
                scan.apply_to(&mut config);
                config.update_workers = config::resolve_update_workers(*workers, *max_workers, num_cpus::get());
                config.force_overwrite = *force;
                config.profile = *profile;
                config.update_file_times = !*no_file_times;
                config.tagger_program = exiftool.clone();
                config.report = report.clone();
                config
            }
            Commands::Pairs { scan, output } => {
                let mut config = RunConfig::new(&scan.directory);
                scan.apply_to(&mut config);
                config.report = output.clone();
                config
            }
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixError;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_fix_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "takeout-fix", "-v", "fix", root.as_str(), "--max-workers", "64", "--force", "--profile", "basic",
            "--extensions", ".JPG,heic", "--no-file-times",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);

        let config = cli.command.to_config().unwrap();
        assert_eq!(config.update_workers, 32);
        assert!(config.force_overwrite);
        assert_eq!(config.profile, TagProfile::Basic);
        assert_eq!(config.extensions, vec!["jpg", "heic"]);
        assert!(!config.update_file_times);
    }

    #[test]
    fn fix_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["takeout-fix", "fix", root.as_str()]).unwrap();
        let config = cli.command.to_config().unwrap();
        assert!(!config.force_overwrite);
        assert_eq!(config.profile, TagProfile::Full);
        assert_eq!(config.extensions.len(), config::DEFAULT_EXTENSIONS.len());
        assert_eq!(config.tagger_program, PathBuf::from("exiftool"));
    }

    #[test]
    fn directory_is_required() {
        assert!(Cli::try_parse_from(["takeout-fix", "fix"]).is_err());
    }

    #[test]
    fn missing_directory_fails_config() {
        let cli = Cli::try_parse_from(["takeout-fix", "pairs", "/definitely/not/here"]).unwrap();
        assert!(matches!(cli.command.to_config(), Err(FixError::TargetNotFound(_))));
    }
}
