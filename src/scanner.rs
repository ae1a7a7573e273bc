use crate::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::error;
use walkdir::WalkDir;

/// Lists every regular file under `root` (only its direct children when
/// `recursive` is false), sorted by file name within each folder.
///
/// The whole list is collected before anything is moved, so files that land
/// in a destination during the run are never picked up again. Symlinks are
/// skipped. Unreadable subfolders are logged and skipped; an unusable `root`
/// is a systemic error.
pub fn snapshot(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, Error> {
    check_root(root)?;

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                error!(
                    "Skipping unreadable entry under {}: {}",
                    root.display(),
                    err
                );
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn check_root(root: &Path) -> Result<(), Error> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SourceMissing(root.to_path_buf()))
        }
        Err(err) => {
            return Err(Error::SourceUnreadable {
                path: root.to_path_buf(),
                source: err,
            })
        }
    };
    if !metadata.is_dir() {
        return Err(Error::SourceNotDirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|err| Error::SourceUnreadable {
        path: root.to_path_buf(),
        source: err,
    })?;
    Ok(())
}
