use crate::error::AppError;
use crate::geometry::BoundingBox;
use image::DynamicImage;
use serde::Deserialize;
use tracing::warn;

pub mod mock;
pub mod replay;

/// Minimum confidence (exclusive) for a raw detection to be kept.
pub const DEFAULT_CONFIDENCE_FLOOR: f32 = 0.5;

/// COCO class ids recognized as vehicles: car, motorcycle, bus, truck.
pub const VEHICLE_CLASS_IDS: [u32; 4] = [2, 3, 5, 7];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleCategory {
    Car,
    Motorcycle,
    Bus,
    Truck,
    Unknown,
}

impl VehicleCategory {
    pub fn from_class_id(class_id: u32) -> Self {
        match class_id {
            2 => Self::Car,
            3 => Self::Motorcycle,
            5 => Self::Bus,
            7 => Self::Truck,
            _ => Self::Unknown,
        }
    }

    /// `Unknown` detections are never vehicle-positive.
    pub fn is_vehicle(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
            Self::Bus => "bus",
            Self::Truck => "truck",
            Self::Unknown => "unknown",
        }
    }
}

/// One box as emitted by the detection model, before any filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDetection {
    /// `[x1, y1, x2, y2]` in image pixel coordinates.
    pub bbox: [f32; 4],
    pub class_id: u32,
    pub confidence: f32,
}

/// A detection that passed the vehicle-category and confidence filters.
#[derive(Debug, Clone)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub category: VehicleCategory,
}

/// Opaque object-detection backend: decoded image in, raw boxes out.
///
/// Implement this trait to plug in a different model backend. The handle is
/// created once at startup and injected into [`DetectorAdapter`].
pub trait DetectionModel: Send + Sync + std::fmt::Debug {
    fn infer(&self, image: &DynamicImage) -> Result<Vec<RawDetection>, AppError>;

    /// Short backend identifier for logs.
    fn name(&self) -> &str;
}

/// Wraps the detection model and narrows its output to confident vehicle
/// detections. A missing or failing model degrades to "no detections".
#[derive(Debug)]
pub struct DetectorAdapter {
    model: Option<Box<dyn DetectionModel>>,
    confidence_floor: f32,
}

impl DetectorAdapter {
    pub fn new(model: Box<dyn DetectionModel>, confidence_floor: f32) -> Self {
        Self {
            model: Some(model),
            confidence_floor,
        }
    }

    /// Adapter without a backend; every `detect` call returns no detections.
    pub fn disabled() -> Self {
        Self {
            model: None,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Run the model once and keep only vehicle detections above the
    /// confidence floor. Never fails: inference errors are logged and
    /// reported as an empty detection list.
    pub fn detect(&self, image: &DynamicImage) -> Vec<Detection> {
        let Some(model) = self.model.as_deref() else {
            return Vec::new();
        };

        let raw = match model.infer(image) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, model = model.name(), "Inference failed, reporting no detections");
                return Vec::new();
            }
        };

        raw.into_iter()
            .filter_map(|detection| {
                let category = VehicleCategory::from_class_id(detection.class_id);
                if category.is_vehicle() && detection.confidence > self.confidence_floor {
                    let [x1, y1, x2, y2] = detection.bbox;
                    Some(Detection {
                        bbox: BoundingBox::new(x1, y1, x2, y2),
                        confidence: detection.confidence,
                        category,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}
