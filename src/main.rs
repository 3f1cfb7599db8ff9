use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use clap::Parser;
use log::{error, info, warn};
use takeout_date_fixer::cli::commands::{Cli, Commands};
use takeout_date_fixer::{fix_dates, list_pairs, ExifTool, FixError, Result};

fn setup_logging(verbosity: u8, quiet: bool) {
    let level = match (quiet, verbosity) {
        (true, _) => log::LevelFilter::Warn,
        (false, 0) => log::LevelFilter::Info,
        (false, 1) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn install_interrupt_handler() -> Result<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        warn!("Interrupt received, finishing in-flight files...");
        flag.store(true, Ordering::SeqCst);
    })?;
    Ok(cancel)
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.command.to_config()?;
    let cancel = install_interrupt_handler()?;

    match cli.command {
        Commands::Fix { .. } => {
            info!("Target directory: {}", config.root.display());
            info!(
                "Using {} tagger workers, {} pairing workers ({} CPUs)",
                config.update_workers,
                config.pair_workers,
                num_cpus::get()
            );
            info!(
                "Mode: {}, profile {:?}, {} media extensions",
                if config.force_overwrite { "force overwrite" } else { "skip when already set" },
                config.profile,
                config.extensions.len()
            );

            let tagger = ExifTool::new(&config.tagger_program, config.read_timeout, config.write_timeout);
            let version = tagger.version()?;
            info!("ExifTool version {} found", version);

            let summary = fix_dates(&config, tagger, &cancel)?;
            if summary.interrupted {
                return Err(FixError::Interrupted);
            }
        }

        Commands::Pairs { .. } => {
            list_pairs(&config, &cancel)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                FixError::Interrupted => info!("Interrupted by user"),
                FixError::TaggerUnavailable(_) => {
                    error!("{}", e);
                    error!("Please install ExifTool and ensure it's in your PATH");
                }
                _ => error!("{}", e),
            }
            ExitCode::from(e.exit_code())
        }
    }
}
