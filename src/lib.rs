//! Sorts a folder of images into "wanted" and "unwanted" buckets by how much
//! of each image is near-white background.
//!
//! The [`JobRunner`] snapshots the import folder and pushes each file through
//! classification, white-pixel analysis, optional EXIF-date renaming,
//! conflict resolution and the move itself. A dry run computes the exact same
//! destinations without touching the filesystem.

pub mod analyzer;
pub mod classifier;
pub mod clear;
pub mod config;
pub mod conflict;
pub mod date_namer;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod model;
pub mod mover;
pub mod progress;
pub mod scanner;
pub mod worker;

pub use config::{ConflictPolicy, JobConfig, NonImageHandling};
pub use engine::JobRunner;
pub use error::{Error, FileError};
pub use model::{
    Classification, FileRecord, JobReport, JobState, JobStats, Outcome, RunMode, Verdict,
};
pub use progress::{ProgressEvent, ProgressReporter, SilentReporter};
pub use worker::{JobEvent, JobHandle};
