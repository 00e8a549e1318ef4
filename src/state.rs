use crate::demand::DemandProfile;
use crate::detector::DetectorAdapter;
use crate::error::AppError;
use crate::layout::SlotLayouts;
use crate::occupancy::{self, LotAnalysis, OccupancySummary};
use image::DynamicImage;

/// Shared service state. Everything is fixed at startup and read-only
/// afterwards, so handlers share a plain `Arc<AppState>`; both pipelines are
/// pure over their inputs and safe to run concurrently.
#[derive(Debug)]
pub struct AppState {
    detector: DetectorAdapter,
    layouts: SlotLayouts,
    profile: DemandProfile,
}

impl AppState {
    pub fn new(detector: DetectorAdapter, layouts: SlotLayouts) -> Self {
        Self {
            detector,
            layouts,
            profile: DemandProfile::builtin(),
        }
    }

    pub fn detector(&self) -> &DetectorAdapter {
        &self.detector
    }

    pub fn layouts(&self) -> &SlotLayouts {
        &self.layouts
    }

    pub fn profile(&self) -> &DemandProfile {
        &self.profile
    }

    pub fn model_loaded(&self) -> bool {
        self.detector.model_loaded()
    }

    /// Image-analysis pipeline: detections, then per-slot verdicts, then
    /// aggregate counts.
    pub fn analyze(&self, lot_id: &str, image: &DynamicImage) -> LotAnalysis {
        let regions = self.layouts.regions_for(lot_id);
        let detections = self.detector.detect(image);
        let slots = occupancy::resolve(regions, &detections);
        let summary = OccupancySummary::from_slots(&slots);
        LotAnalysis {
            lot_id: lot_id.to_string(),
            slots,
            summary,
        }
    }

    /// Same pipeline, starting from encoded image bytes.
    pub fn analyze_bytes(&self, lot_id: &str, bytes: &[u8]) -> Result<LotAnalysis, AppError> {
        let image = image::load_from_memory(bytes)?;
        Ok(self.analyze(lot_id, &image))
    }
}
