use crate::detector::{DetectionModel, RawDetection};
use crate::error::AppError;
use image::DynamicImage;

/// Scripted detection backend for tests.
#[derive(Debug, Clone)]
pub struct MockModel {
    detections: Vec<RawDetection>,
    fail: bool,
}

impl MockModel {
    pub fn with_detections(detections: Vec<RawDetection>) -> Self {
        Self {
            detections,
            fail: false,
        }
    }

    pub fn empty() -> Self {
        Self::with_detections(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            detections: Vec::new(),
            fail: true,
        }
    }
}

impl DetectionModel for MockModel {
    fn infer(&self, _image: &DynamicImage) -> Result<Vec<RawDetection>, AppError> {
        if self.fail {
            return Err(AppError::Model("mock inference failure".to_string()));
        }
        Ok(self.detections.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
