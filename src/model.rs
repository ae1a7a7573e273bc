use crate::error::FileError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What a scanned path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Image,
    NonImage,
    Unreadable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Wanted,
    Unwanted,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Wanted => write!(f, "Wanted"),
            Verdict::Unwanted => write!(f, "Unwanted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Moved,
    WouldMove,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Destinations are computed and reported, nothing is touched.
    #[default]
    DryRun,
    Commit,
}

impl RunMode {
    pub fn is_dry_run(self) -> bool {
        matches!(self, RunMode::DryRun)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Scanning,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Result of pushing one path through the pipeline.
///
/// Built by the job runner when the path is dequeued and dropped once it has
/// been folded into [`JobStats`] and handed to the progress reporter.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub source: PathBuf,
    pub classification: Classification,
    /// Percentage of near-white pixels, images only.
    pub white_percent: Option<f64>,
    pub verdict: Option<Verdict>,
    pub destination: Option<PathBuf>,
    pub outcome: Outcome,
    pub error: Option<FileError>,
}

impl FileRecord {
    pub(crate) fn new(source: PathBuf, classification: Classification) -> Self {
        Self {
            source,
            classification,
            white_percent: None,
            verdict: None,
            destination: None,
            outcome: Outcome::Error,
            error: None,
        }
    }

    pub(crate) fn fail(mut self, error: FileError) -> Self {
        self.destination = None;
        self.outcome = Outcome::Error;
        self.error = Some(error);
        self
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub wanted: usize,
    pub unwanted: usize,
    pub non_image: usize,
    pub errors: usize,
    pub total: usize,
}

impl JobStats {
    pub(crate) fn record(&mut self, record: &FileRecord) {
        self.total += 1;
        if record.outcome == Outcome::Error {
            self.errors += 1;
            return;
        }
        match (record.classification, record.verdict) {
            (Classification::NonImage, _) => self.non_image += 1,
            (_, Some(Verdict::Unwanted)) => self.unwanted += 1,
            _ => self.wanted += 1,
        }
    }
}

/// Returned once the runner stops iterating, whether it finished or was
/// cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub state: JobState,
    pub mode: RunMode,
    pub stats: JobStats,
    /// Size of the scanned snapshot.
    pub candidates: usize,
}
