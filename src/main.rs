mod cli;
mod logging;
mod progress_bars;
mod prompt;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use colored::*;
use dotenv::dotenv;
use photo_sorter::clear::{self, ClearOutcome};
use photo_sorter::config::CONFIG_FILE;
use photo_sorter::{flatten, worker, JobConfig, JobReport, JobState, JobStats, RunMode};
use progress_bars::CliReporter;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let args = Cli::parse();
    let config = JobConfig::load(args.config.as_deref());
    let verbose = config.as_ref().map(|c| c.verbose).unwrap_or(true);

    let _guard = logging::init_logger(verbose);

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Run) => run_job(config, RunMode::Commit),
        Some(Commands::DryRun) => run_job(config, RunMode::DryRun),
        Some(Commands::Flatten { dir }) => run_flatten(dir.unwrap_or(config.source_root)),
        Some(Commands::Clear { yes }) => run_clear(&config, yes),
        Some(Commands::InitConfig { path }) => {
            let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
            JobConfig::default()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))
                .map(|_| info!("Default configuration written to {}", path.display()))
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Fatal error: {:#}", err);
        process::exit(1);
    }
}

fn run_job(config: JobConfig, mode: RunMode) -> anyhow::Result<()> {
    config.validate()?;

    let handle = worker::spawn(config, mode)?;
    let reporter = CliReporter::new();
    for event in handle.events() {
        reporter.handle(&event);
    }
    let report = handle.join()?;
    print_summary(&report);

    if report.state != JobState::Completed {
        bail!("job ended in state {:?}", report.state);
    }
    Ok(())
}

fn print_summary(report: &JobReport) {
    let JobStats {
        wanted,
        unwanted,
        non_image,
        errors,
        total,
    } = report.stats;
    let title = if report.mode.is_dry_run() {
        "Dry-run Summary:"
    } else {
        "Processing Summary:"
    };

    println!();
    println!("{}", "=".repeat(60));
    println!("{}", title.bold());
    println!("  Wanted:          {}", format!("{}", wanted).green());
    println!("  Unwanted:        {}", format!("{}", unwanted).yellow());
    println!("  Non-image files: {}", format!("{}", non_image).cyan());
    println!("  Errors:          {}", format!("{}", errors).red());
    println!("  Total:           {} of {}", total, report.candidates);
    println!("{}", "=".repeat(60));
    println!();
}

fn run_flatten(dir: PathBuf) -> anyhow::Result<()> {
    let stats = flatten::flatten_folder(&dir)?;
    println!(
        "{} files moved, {} dirs removed{}",
        format!("{}", stats.moved).green(),
        format!("{}", stats.dirs_removed).green(),
        if stats.failed > 0 {
            format!(", {} failed", stats.failed).red().to_string()
        } else {
            String::new()
        }
    );
    if stats.remaining_dirs.is_empty() {
        println!("Fully flattened: No subdirs left!");
    }
    Ok(())
}

fn run_clear(config: &JobConfig, yes: bool) -> anyhow::Result<()> {
    let folders = [
        &config.source_root,
        &config.unwanted_root,
        &config.wanted_root,
    ];

    let mut total_deleted = 0;
    let mut total_errors = 0;
    for folder in folders {
        let count = clear::count_files(folder);
        if !yes && count > 0 {
            println!("\n⚠ Found {} file(s) in {}", count, folder.display());
            let confirmed = prompt::prompt_confirm(
                &format!("Delete all files in {}?", folder.display()),
                Some(false),
            )?;
            if !confirmed {
                println!("{} Cancelled - no files deleted from {}", "✗".red(), folder.display());
                continue;
            }
        }

        match clear::clear_folder(folder) {
            ClearOutcome::Cleared { deleted, failed } => {
                total_deleted += deleted;
                total_errors += failed;
                println!("{} Deleted {} file(s) from {}", "✓".green(), deleted, folder.display());
            }
            ClearOutcome::AlreadyEmpty => {
                println!("{} Folder already empty: {}", "✓".green(), folder.display());
            }
            ClearOutcome::Missing => {
                total_errors += 1;
                println!("{} Folder does not exist: {}", "✗".red(), folder.display());
            }
            ClearOutcome::NotDirectory => {
                total_errors += 1;
                println!("{} Path is not a directory: {}", "✗".red(), folder.display());
            }
        }
    }

    println!();
    println!("Total files deleted: {}", total_deleted);
    println!("Errors: {}", total_errors);
    Ok(())
}
