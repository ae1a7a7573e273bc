//! White-background detection.
//!
//! Images are decoded, resized to a fixed `resize_size x resize_size` square
//! with a triangle (bilinear) filter and then counted pixel by pixel. Resizing
//! keeps the cost per file constant regardless of the source resolution. The
//! resulting percentage is stable across runs for the same inputs but is an
//! approximation of the full-resolution value.

use crate::config::JobConfig;
use crate::error::FileError;
use crate::model::Verdict;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use std::path::Path;

pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    pub white_percent: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy)]
pub struct WhiteBackgroundAnalyzer {
    resize_size: u32,
    white_pixel_min: u8,
    white_threshold_percent: f64,
}

impl WhiteBackgroundAnalyzer {
    pub fn new(resize_size: u32, white_pixel_min: u8, white_threshold_percent: f64) -> Self {
        Self {
            resize_size,
            white_pixel_min,
            white_threshold_percent,
        }
    }

    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(
            config.resize_size,
            config.white_pixel_min,
            config.white_threshold_percent,
        )
    }

    pub fn analyze(&self, path: &Path) -> Result<Analysis, FileError> {
        let reader = ImageReader::open(path)
            .map_err(|err| FileError::from_io(path.to_path_buf(), &err))?
            .with_guessed_format()
            .map_err(|err| FileError::from_io(path.to_path_buf(), &err))?;
        let image = reader.decode().map_err(|err| FileError::Unreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Ok(self.analyze_image(&image))
    }

    pub fn analyze_image(&self, image: &DynamicImage) -> Analysis {
        let resized = image
            .resize_exact(self.resize_size, self.resize_size, RESIZE_FILTER)
            .to_rgb8();
        let white_percent = white_percent(&resized, self.white_pixel_min);
        Analysis {
            white_percent,
            verdict: verdict_for(white_percent, self.white_threshold_percent),
        }
    }
}

/// Share of pixels, in percent, whose R, G and B are all `>= white_pixel_min`.
pub fn white_percent(image: &RgbImage, white_pixel_min: u8) -> f64 {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let white = image
        .pixels()
        .filter(|pixel| pixel.0.iter().all(|&channel| channel >= white_pixel_min))
        .count() as u64;
    white as f64 / total as f64 * 100.0
}

/// Strictly above the threshold is unwanted; exactly at it is still wanted.
pub fn verdict_for(white_percent: f64, white_threshold_percent: f64) -> Verdict {
    if white_percent > white_threshold_percent {
        Verdict::Unwanted
    } else {
        Verdict::Wanted
    }
}
