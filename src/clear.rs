use std::fs;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Missing,
    NotDirectory,
    AlreadyEmpty,
    Cleared { deleted: usize, failed: usize },
}

/// Number of regular files anywhere under `path`.
pub fn count_files(path: &Path) -> usize {
    WalkDir::new(path)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}

/// Deletes every file under `path`, then every subfolder left empty. The
/// folder itself is kept.
pub fn clear_folder(path: &Path) -> ClearOutcome {
    if !path.exists() {
        return ClearOutcome::Missing;
    }
    if !path.is_dir() {
        return ClearOutcome::NotDirectory;
    }
    if count_files(path) == 0 {
        return ClearOutcome::AlreadyEmpty;
    }

    let mut deleted = 0;
    let mut failed = 0;
    for entry in WalkDir::new(path).min_depth(1).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => deleted += 1,
            Err(err) => {
                warn!("✗ Failed to delete {}: {}", entry.path().display(), err);
                failed += 1;
            }
        }
    }

    for entry in WalkDir::new(path)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_dir() {
            // Non-empty folders (failed deletes, symlinks) are left alone.
            let _ = fs::remove_dir(entry.path());
        }
    }

    ClearOutcome::Cleared { deleted, failed }
}
