#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photo_sorter::progress::{ProgressEvent, ProgressReporter};
use photo_sorter::{JobConfig, JobReport};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::{tempdir, TempDir};

pub const SIDE: u32 = 20;

pub struct Workspace {
    pub tmp: TempDir,
    pub config: JobConfig,
}

impl Workspace {
    /// Import/Wanted/Unwanted under a fresh temp dir. Images are analysed at
    /// their native size so white fractions are exact.
    pub fn new() -> Self {
        let tmp = tempdir().unwrap();
        let import = tmp.path().join("Import");
        fs::create_dir_all(&import).unwrap();
        let config = JobConfig {
            source_root: import,
            wanted_root: tmp.path().join("Wanted"),
            unwanted_root: tmp.path().join("Unwanted"),
            resize_size: SIDE,
            white_threshold_percent: 70.0,
            white_pixel_min: 240,
            ..JobConfig::default()
        };
        Self { tmp, config }
    }

    pub fn import(&self, rel: &str) -> PathBuf {
        let path = self.config.source_root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        path
    }

    pub fn wanted(&self, name: &str) -> PathBuf {
        self.config.wanted_root.join(name)
    }

    pub fn unwanted(&self, name: &str) -> PathBuf {
        self.config.unwanted_root.join(name)
    }
}

/// SIDE x SIDE image whose first `white_rows` rows are white and the rest dark.
pub fn banded(white_rows: u32) -> RgbImage {
    RgbImage::from_fn(SIDE, SIDE, |_, y| {
        if y < white_rows {
            Rgb([255, 255, 255])
        } else {
            Rgb([20, 30, 40])
        }
    })
}

pub fn write_png(path: &Path, white_rows: u32) {
    banded(white_rows).save_with_format(path, ImageFormat::Png).unwrap();
}

pub fn jpeg_bytes(white: bool) -> Vec<u8> {
    let color = if white { Rgb([255, 255, 255]) } else { Rgb([20, 30, 40]) };
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(SIDE, SIDE, color));
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg).unwrap();
    buf
}

pub fn write_jpeg(path: &Path, white: bool) {
    fs::write(path, jpeg_bytes(white)).unwrap();
}

/// JPEG with an EXIF APP1 segment carrying DateTimeOriginal.
pub fn write_dated_jpeg(path: &Path, white: bool, datetime: &str) {
    let jpeg = jpeg_bytes(white);
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&exif_app1(datetime));
    out.extend_from_slice(&jpeg[2..]);
    fs::write(path, out).unwrap();
}

fn exif_app1(datetime: &str) -> Vec<u8> {
    let mut value = datetime.as_bytes().to_vec();
    value.push(0);

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\0\x2a");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x8769u16.to_be_bytes());
    tiff.extend_from_slice(&4u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&26u32.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x9003u16.to_be_bytes());
    tiff.extend_from_slice(&2u16.to_be_bytes());
    tiff.extend_from_slice(&(value.len() as u32).to_be_bytes());
    tiff.extend_from_slice(&44u32.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());
    tiff.extend_from_slice(&value);

    let mut segment = b"Exif\0\0".to_vec();
    segment.extend_from_slice(&tiff);

    let mut out = vec![0xFF, 0xE1];
    out.extend_from_slice(&((segment.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&segment);
    out
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<ProgressEvent>>,
    pub report: Mutex<Option<JobReport>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// (source, destination) pairs sorted by source.
    pub fn destinations(&self) -> Vec<(PathBuf, Option<PathBuf>)> {
        let mut pairs: Vec<_> = self
            .events()
            .into_iter()
            .map(|event| (event.record.source, event.record.destination))
            .collect();
        pairs.sort();
        pairs
    }
}

impl ProgressReporter for RecordingReporter {
    fn on_file(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn on_job_complete(&self, report: &JobReport) {
        *self.report.lock().unwrap() = Some(*report);
    }
}
