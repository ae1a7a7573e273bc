use crate::config::ConflictPolicy;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Picks non-clobbering destination paths.
///
/// Besides what is on disk, the resolver remembers every destination handed
/// out during the current run. A dry run never creates those files, so
/// without this memory two same-named sources would both be offered the
/// same path and the preview would disagree with the commit.
#[derive(Debug, Default)]
pub struct ConflictResolver {
    claimed: HashSet<PathBuf>,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Final path for `desired_name` inside `dir`. Does not claim it.
    pub fn resolve(&self, dir: &Path, desired_name: &OsStr, policy: ConflictPolicy) -> PathBuf {
        resolve_with(dir, desired_name, policy, |path| self.is_taken(path))
    }

    /// Marks `path` as used by this run.
    pub fn claim(&mut self, path: PathBuf) {
        self.claimed.insert(path);
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || occupied(path)
    }
}

/// Resolution against the filesystem alone.
pub fn resolve(dir: &Path, desired_name: &OsStr, policy: ConflictPolicy) -> PathBuf {
    resolve_with(dir, desired_name, policy, occupied)
}

/// Any directory entry counts, including a symlink whose target is gone.
pub fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn resolve_with<F>(dir: &Path, desired_name: &OsStr, policy: ConflictPolicy, taken: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let candidate = dir.join(desired_name);
    if policy == ConflictPolicy::Overwrite || !taken(&candidate) {
        return candidate;
    }

    let (stem, ext) = split_name(desired_name);
    let mut counter: u64 = 1;
    loop {
        let mut name = stem.to_os_string();
        name.push(format!("_{}", counter));
        if let Some(ext) = ext {
            name.push(".");
            name.push(ext);
        }
        let candidate = dir.join(&name);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Splits at the last dot into stem and extension. A name without a dot (or
/// whose only dot leads it) has no extension.
pub fn split_name(name: &OsStr) -> (&OsStr, Option<&OsStr>) {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), ext) => (stem, ext),
        (None, _) => (name, None),
    }
}
