use crate::config::ConflictPolicy;
use crate::conflict;
use crate::error::Error;
use crate::model::RunMode;
use crate::mover;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlattenStats {
    pub moved: usize,
    pub failed: usize,
    pub dirs_removed: usize,
    /// Subfolders that could not be removed because something is still in them.
    pub remaining_dirs: Vec<PathBuf>,
}

/// Moves every file below `root` directly into `root` and removes the emptied
/// subfolders. Name clashes get the usual `_n` suffix.
pub fn flatten_folder(root: &Path) -> Result<FlattenStats, Error> {
    if !root.exists() {
        return Err(Error::SourceMissing(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::SourceNotDirectory(root.to_path_buf()));
    }
    info!("Flattening {}...", root.display());

    let nested_files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    let mut stats = FlattenStats::default();
    for source in nested_files {
        let Some(name) = source.file_name() else {
            continue;
        };
        let destination = conflict::resolve(root, name, ConflictPolicy::Counter);
        match mover::apply(&source, &destination, RunMode::Commit) {
            Ok(_) => {
                debug!("  Moved: {} -> {}", source.display(), destination.display());
                stats.moved += 1;
            }
            Err(err) => {
                warn!("  Failed: {}", err);
                stats.failed += 1;
            }
        }
    }

    // Deepest folders come first, so parents are empty by the time we reach them.
    let dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect();
    for dir in dirs {
        match fs::remove_dir(&dir) {
            Ok(()) => stats.dirs_removed += 1,
            Err(err) => {
                debug!("Keeping {}: {}", dir.display(), err);
                if dir.parent() == Some(root) {
                    stats.remaining_dirs.push(dir);
                }
            }
        }
    }

    info!(
        "Summary: {} files moved, {} dirs removed.",
        stats.moved, stats.dirs_removed
    );
    if !stats.remaining_dirs.is_empty() {
        warn!("Found remaining subdirs: {:?}", stats.remaining_dirs);
    }
    Ok(stats)
}
