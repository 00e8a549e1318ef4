//! Replay backend: serves a fixed detection list captured offline.
//!
//! Stands in for a live object-detection model when only recorded outputs
//! are available. The file is a JSON array of raw detections:
//! `[{"bbox": [100.0, 100.0, 200.0, 250.0], "class_id": 2, "confidence": 0.92}]`

use crate::detector::{DetectionModel, RawDetection};
use crate::error::AppError;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Debug)]
pub struct ReplayModel {
    detections: Vec<RawDetection>,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read detections file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse detections file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ReplayModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let contents = std::fs::read_to_string(path)?;
        let detections: Vec<RawDetection> = serde_json::from_str(&contents)?;
        Ok(Self { detections })
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

impl DetectionModel for ReplayModel {
    fn infer(&self, _image: &DynamicImage) -> Result<Vec<RawDetection>, AppError> {
        Ok(self.detections.clone())
    }

    fn name(&self) -> &str {
        "replay"
    }
}
