use crate::error::FileError;
use crate::model::{Outcome, RunMode};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Moves `source` to `destination`, or under [`RunMode::DryRun`] only checks
/// that it could. The same checks run in both modes so a preview reports
/// the errors a commit would hit.
pub fn apply(source: &Path, destination: &Path, mode: RunMode) -> Result<Outcome, FileError> {
    check_source(source)?;
    let dir = destination
        .parent()
        .ok_or_else(|| FileError::DestinationUncreatable {
            path: destination.to_path_buf(),
            reason: "destination has no parent folder".into(),
        })?;
    check_destination_dir(dir)?;
    check_destination(destination)?;

    if mode.is_dry_run() {
        return Ok(Outcome::WouldMove);
    }

    fs::create_dir_all(dir).map_err(|err| FileError::DestinationUncreatable {
        path: dir.to_path_buf(),
        reason: err.to_string(),
    })?;
    if fs::symlink_metadata(destination).is_ok() {
        // Only reachable under the overwrite policy.
        fs::remove_file(destination)
            .map_err(|err| FileError::from_io(destination.to_path_buf(), &err))?;
    }
    move_file(source, destination).map_err(|err| FileError::from_io(source.to_path_buf(), &err))?;
    Ok(Outcome::Moved)
}

/// The source must be a readable regular file in a folder we may remove it from.
fn check_source(source: &Path) -> Result<(), FileError> {
    let metadata =
        fs::metadata(source).map_err(|err| FileError::from_io(source.to_path_buf(), &err))?;
    if !metadata.is_file() {
        return Err(FileError::SourceMissing(source.to_path_buf()));
    }
    File::open(source).map_err(|err| FileError::from_io(source.to_path_buf(), &err))?;
    check_writable(&folder_of(source))
}

/// The folder must either exist as a writable directory or be creatable under
/// its nearest existing ancestor.
fn check_destination_dir(dir: &Path) -> Result<(), FileError> {
    let existing = nearest_existing(dir).ok_or_else(|| FileError::DestinationUncreatable {
        path: dir.to_path_buf(),
        reason: "no existing ancestor".into(),
    })?;
    let metadata = fs::metadata(&existing).map_err(|err| FileError::DestinationUncreatable {
        path: dir.to_path_buf(),
        reason: err.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(FileError::DestinationUncreatable {
            path: dir.to_path_buf(),
            reason: format!("{} is not a directory", existing.display()),
        });
    }
    check_writable(&existing)
}

/// An existing entry may only be replaced when it is not a folder.
fn check_destination(destination: &Path) -> Result<(), FileError> {
    match fs::symlink_metadata(destination) {
        Ok(metadata) if metadata.is_dir() => Err(FileError::DestinationUncreatable {
            path: destination.to_path_buf(),
            reason: "a folder already exists at the destination".into(),
        }),
        _ => Ok(()),
    }
}

/// Entries can be created and removed in `dir` by the current user.
#[cfg(unix)]
fn check_writable(dir: &Path) -> Result<(), FileError> {
    use rustix::fs::{access, Access};

    access(dir, Access::WRITE_OK | Access::EXEC_OK)
        .map_err(|_| FileError::PermissionDenied(dir.to_path_buf()))
}

#[cfg(not(unix))]
fn check_writable(dir: &Path) -> Result<(), FileError> {
    let metadata =
        fs::metadata(dir).map_err(|err| FileError::from_io(dir.to_path_buf(), &err))?;
    if metadata.permissions().readonly() {
        return Err(FileError::PermissionDenied(dir.to_path_buf()));
    }
    Ok(())
}

fn folder_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn nearest_existing(dir: &Path) -> Option<PathBuf> {
    let mut current = Some(dir);
    while let Some(path) = current {
        // An empty relative parent means the working directory.
        let path = if path.as_os_str().is_empty() {
            Path::new(".")
        } else {
            path
        };
        if path.exists() {
            return Some(path.to_path_buf());
        }
        current = path.parent();
    }
    None
}

/// Rename, falling back to copy + delete when the rename cannot work, such as
/// across filesystems.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
            ) =>
        {
            Err(err)
        }
        Err(err) => {
            debug!(
                "rename {} -> {} failed ({}), copying instead",
                source.display(),
                destination.display(),
                err
            );
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn commit_moves_and_creates_folders() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"data").unwrap();
        let destination = dir.path().join("out").join("deep").join("a.jpg");

        let outcome = apply(&source, &destination, RunMode::Commit).unwrap();

        assert_eq!(outcome, Outcome::Moved);
        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"data");
    }

    #[test]
    fn dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"data").unwrap();
        let destination = dir.path().join("out").join("a.jpg");

        let outcome = apply(&source, &destination, RunMode::DryRun).unwrap();

        assert_eq!(outcome, Outcome::WouldMove);
        assert!(source.exists());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn vanished_source_fails_in_both_modes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("gone.jpg");
        let destination = dir.path().join("out").join("gone.jpg");

        for mode in [RunMode::DryRun, RunMode::Commit] {
            assert_eq!(
                apply(&source, &destination, mode),
                Err(FileError::SourceMissing(source.clone()))
            );
        }
    }

    #[test]
    fn destination_blocked_by_file_fails_in_both_modes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"data").unwrap();
        let blocker = dir.path().join("out");
        fs::write(&blocker, b"not a folder").unwrap();
        let destination = blocker.join("a.jpg");

        for mode in [RunMode::DryRun, RunMode::Commit] {
            assert!(matches!(
                apply(&source, &destination, mode),
                Err(FileError::DestinationUncreatable { .. })
            ));
        }
        assert!(source.exists());
    }

    #[test]
    fn commit_replaces_existing_destination() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"new").unwrap();
        let destination = dir.path().join("a_dest.jpg");
        fs::write(&destination, b"old").unwrap();

        apply(&source, &destination, RunMode::Commit).unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"new");
    }

    #[test]
    fn folder_at_destination_fails_in_both_modes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        fs::write(&source, b"data").unwrap();
        let destination = dir.path().join("out").join("notes.txt");
        fs::create_dir_all(&destination).unwrap();

        for mode in [RunMode::DryRun, RunMode::Commit] {
            assert!(matches!(
                apply(&source, &destination, mode),
                Err(FileError::DestinationUncreatable { .. })
            ));
        }
        assert!(source.exists());
        assert!(destination.is_dir());
    }

    #[cfg(unix)]
    mod permissions {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Makes `dir` read-only. Returns false when the current user can
        /// still write to it (root), in which case the caller skips.
        fn lock(dir: &Path) -> bool {
            fs::set_permissions(dir, fs::Permissions::from_mode(0o555)).unwrap();
            let marker = dir.join(".write_test");
            if fs::write(&marker, b"").is_ok() {
                let _ = fs::remove_file(&marker);
                unlock(dir);
                return false;
            }
            true
        }

        fn unlock(dir: &Path) {
            fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
        }

        #[test]
        fn locked_source_folder_fails_in_both_modes() {
            let dir = tempdir().unwrap();
            let locked = dir.path().join("locked");
            fs::create_dir(&locked).unwrap();
            let source = locked.join("notes.txt");
            fs::write(&source, b"data").unwrap();
            let destination = dir.path().join("out").join("notes.txt");
            if !lock(&locked) {
                return;
            }

            for mode in [RunMode::DryRun, RunMode::Commit] {
                assert_eq!(
                    apply(&source, &destination, mode),
                    Err(FileError::PermissionDenied(locked.clone()))
                );
            }
            unlock(&locked);
            assert!(source.exists());
            assert!(!destination.exists());
        }

        #[test]
        fn locked_destination_folder_fails_in_both_modes() {
            let dir = tempdir().unwrap();
            let source = dir.path().join("notes.txt");
            fs::write(&source, b"data").unwrap();
            let out = dir.path().join("out");
            fs::create_dir(&out).unwrap();
            let destination = out.join("sub").join("notes.txt");
            if !lock(&out) {
                return;
            }

            for mode in [RunMode::DryRun, RunMode::Commit] {
                assert_eq!(
                    apply(&source, &destination, mode),
                    Err(FileError::PermissionDenied(out.clone()))
                );
            }
            unlock(&out);
            assert!(source.exists());
        }
    }
}
