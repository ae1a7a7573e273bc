use crate::error::Error;
use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "photosorter_config.json";
pub const ENV_PREFIX: &str = "PHOTOSORTER";

pub const DEFAULT_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".bmp", ".tiff", ".webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConflictPolicy {
    /// Append `_1`, `_2`, ... to the stem until the name is free.
    #[default]
    #[serde(rename = "counter", alias = "Counter")]
    Counter,
    #[serde(rename = "overwrite", alias = "Overwrite")]
    Overwrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NonImageHandling {
    #[default]
    #[serde(rename = "move_to_wanted", alias = "Move to Wanted")]
    MoveToWanted,
}

/// Per-run settings. Read-only for the duration of a job.
///
/// Field names on the wire match the JSON document the configuration file
/// has always used, so existing `photosorter_config.json` files load as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    #[serde(rename = "import_path")]
    pub source_root: PathBuf,
    #[serde(rename = "wanted_path")]
    pub wanted_root: PathBuf,
    #[serde(rename = "unwanted_path")]
    pub unwanted_root: PathBuf,
    pub resize_size: u32,
    pub white_threshold_percent: f64,
    pub white_pixel_min: u8,
    pub rename: bool,
    pub verbose: bool,
    pub recursive_scan: bool,
    pub supported_extensions: BTreeSet<String>,
    pub non_image_handling: NonImageHandling,
    #[serde(rename = "filename_conflict")]
    pub conflict_policy: ConflictPolicy,
    pub flatten_import_folder: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("./Import"),
            wanted_root: PathBuf::from("./Wanted"),
            unwanted_root: PathBuf::from("./Unwanted"),
            resize_size: 300,
            white_threshold_percent: 70.0,
            white_pixel_min: 240,
            rename: true,
            verbose: true,
            recursive_scan: true,
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            non_image_handling: NonImageHandling::MoveToWanted,
            conflict_policy: ConflictPolicy::Counter,
            flatten_import_folder: false,
        }
    }
}

impl JobConfig {
    /// Layers defaults, the JSON config file and `PHOTOSORTER_*` environment
    /// variables. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<JobConfig, Error> {
        let file = match path {
            Some(path) => ConfigFile::from(path).required(true),
            None => ConfigFile::with_name(CONFIG_FILE).required(false),
        };
        let builder = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        let config = builder.try_deserialize::<JobConfig>()?;
        Ok(config.normalized())
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        Ok(())
    }

    /// Lowercases every extension and makes sure it starts with a dot.
    pub fn normalized(mut self) -> Self {
        self.supported_extensions = self
            .supported_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .filter(|ext| ext.len() > 1)
            .collect();
        self
    }

    /// Range and path checks the engine itself trusts callers to have done.
    pub fn validate(&self) -> Result<(), Error> {
        if self.resize_size == 0 {
            return Err(Error::InvalidConfig("resize_size must be positive".into()));
        }
        if !(0.0..=100.0).contains(&self.white_threshold_percent) {
            return Err(Error::InvalidConfig(format!(
                "white_threshold_percent must be within 0-100, got {}",
                self.white_threshold_percent
            )));
        }
        if self.supported_extensions.is_empty() {
            return Err(Error::InvalidConfig(
                "supported_extensions must not be empty".into(),
            ));
        }

        let source = self.source_root.as_path();
        let wanted = self.wanted_root.as_path();
        let unwanted = self.unwanted_root.as_path();

        if wanted == unwanted || wanted == source || unwanted == source {
            return Err(Error::InvalidConfig(
                "import, wanted and unwanted paths must all differ".into(),
            ));
        }
        if nested(wanted, unwanted) {
            return Err(Error::InvalidConfig(format!(
                "{} and {} are nested inside each other",
                wanted.display(),
                unwanted.display()
            )));
        }
        for root in [wanted, unwanted] {
            // A destination under the source is only revisited by a recursive scan.
            if source.starts_with(root) || (self.recursive_scan && root.starts_with(source)) {
                return Err(Error::InvalidConfig(format!(
                    "{} overlaps the import path {}",
                    root.display(),
                    source.display()
                )));
            }
        }
        Ok(())
    }
}

pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

fn nested(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}
