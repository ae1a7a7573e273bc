use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "photo-sorter")]
#[command(about = "Sort images into Wanted/Unwanted by white background", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./photosorter_config.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify and move every file in the import folder
    Run,
    /// Show where every file would go without moving anything
    DryRun,
    /// Move all nested files up into the folder and remove empty subfolders
    Flatten {
        /// Folder to flatten (defaults to the configured import folder)
        dir: Option<PathBuf>,
    },
    /// Delete all files from the import, wanted and unwanted folders
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Write the default configuration as JSON
    InitConfig {
        /// Target file (defaults to ./photosorter_config.json)
        path: Option<PathBuf>,
    },
    /// Print configuration values
    PrintConfig,
}
