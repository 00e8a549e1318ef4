//! Slot occupancy resolver: matches vehicle detections against slot regions
//! and emits one verdict per slot.

use crate::detector::{Detection, VehicleCategory};
use crate::layout::SlotRegion;
use rand::Rng;

/// Minimum IoU between a detection and a slot for the slot to count as
/// occupied.
pub const IOU_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct SlotOccupancy {
    pub slot_id: String,
    pub occupied: bool,
    pub confidence: f32,
    pub vehicle_category: Option<VehicleCategory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancySummary {
    pub occupied: u32,
    pub available: u32,
    pub total: u32,
}

impl OccupancySummary {
    pub fn from_slots(slots: &[SlotOccupancy]) -> Self {
        let total = slots.len() as u32;
        let occupied = slots.iter().filter(|slot| slot.occupied).count() as u32;
        Self {
            occupied,
            available: total - occupied,
            total,
        }
    }
}

/// Result of analyzing one frame for one lot.
#[derive(Debug, Clone)]
pub struct LotAnalysis {
    pub lot_id: String,
    pub slots: Vec<SlotOccupancy>,
    pub summary: OccupancySummary,
}

/// Resolve per-slot occupancy from a frame's detections.
///
/// Each slot is scanned against every detection; any pair above
/// [`IOU_THRESHOLD`] marks the slot occupied, and the highest-confidence
/// overlapping detection supplies the reported confidence and category
/// (first seen wins on a confidence tie). The matching is deliberately
/// many-to-one: a single detection may claim several slots and no global
/// assignment is attempted, matching the behavior expected by callers.
/// O(slots x detections), fine at per-frame counts.
pub fn resolve(slots: &[SlotRegion], detections: &[Detection]) -> Vec<SlotOccupancy> {
    slots
        .iter()
        .map(|slot| {
            let mut occupied = false;
            let mut best_confidence = 0.0f32;
            let mut best_category = None;

            for detection in detections {
                if slot.bbox.iou(&detection.bbox) > IOU_THRESHOLD {
                    occupied = true;
                    if detection.confidence > best_confidence {
                        best_confidence = detection.confidence;
                        best_category = Some(detection.category);
                    }
                }
            }

            SlotOccupancy {
                slot_id: slot.slot_id.clone(),
                occupied,
                confidence: best_confidence,
                vehicle_category: best_category,
            }
        })
        .collect()
}

/// Occupancy snapshot for lots without a live frame: each slot has a 40%
/// chance of being occupied.
pub fn mock_snapshot<R: Rng>(slots: &[SlotRegion], rng: &mut R) -> Vec<SlotOccupancy> {
    slots
        .iter()
        .map(|slot| {
            let occupied = rng.r#gen::<f64>() > 0.6;
            SlotOccupancy {
                slot_id: slot.slot_id.clone(),
                occupied,
                confidence: if occupied { 0.85 } else { 0.95 },
                vehicle_category: occupied.then_some(VehicleCategory::Car),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn slot(slot_id: &str, bbox: [f32; 4]) -> SlotRegion {
        SlotRegion {
            slot_id: slot_id.to_string(),
            bbox: BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
        }
    }

    fn detection(bbox: [f32; 4], confidence: f32, category: VehicleCategory) -> Detection {
        Detection {
            bbox: BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
            confidence,
            category,
        }
    }

    #[test]
    fn overlapping_detection_marks_slot_occupied() {
        let slots = vec![slot("S001", [100.0, 100.0, 200.0, 250.0])];
        let detections = vec![detection(
            [150.0, 150.0, 250.0, 300.0],
            0.9,
            VehicleCategory::Car,
        )];

        let result = resolve(&slots, &detections);

        assert_eq!(result.len(), 1);
        assert!(result[0].occupied);
        assert_eq!(result[0].confidence, 0.9);
        assert_eq!(result[0].vehicle_category, Some(VehicleCategory::Car));
    }

    #[test]
    fn no_detections_leaves_slots_free_with_zero_confidence() {
        let slots = vec![
            slot("S001", [100.0, 100.0, 200.0, 250.0]),
            slot("S002", [220.0, 100.0, 320.0, 250.0]),
        ];

        let result = resolve(&slots, &[]);

        assert_eq!(result.len(), 2);
        for verdict in &result {
            assert!(!verdict.occupied);
            assert_eq!(verdict.confidence, 0.0);
            assert_eq!(verdict.vehicle_category, None);
        }
    }

    #[test]
    fn highest_confidence_detection_wins_category() {
        let slots = vec![slot("S001", [0.0, 0.0, 100.0, 100.0])];
        let detections = vec![
            detection([0.0, 0.0, 100.0, 100.0], 0.6, VehicleCategory::Car),
            detection([10.0, 10.0, 110.0, 110.0], 0.8, VehicleCategory::Truck),
        ];

        let result = resolve(&slots, &detections);

        assert!(result[0].occupied);
        assert_eq!(result[0].confidence, 0.8);
        assert_eq!(result[0].vehicle_category, Some(VehicleCategory::Truck));
    }

    #[test]
    fn equal_confidence_keeps_first_seen_detection() {
        let slots = vec![slot("S001", [0.0, 0.0, 100.0, 100.0])];
        let detections = vec![
            detection([0.0, 0.0, 100.0, 100.0], 0.7, VehicleCategory::Bus),
            detection([5.0, 5.0, 105.0, 105.0], 0.7, VehicleCategory::Motorcycle),
        ];

        let result = resolve(&slots, &detections);

        assert_eq!(result[0].vehicle_category, Some(VehicleCategory::Bus));
    }

    #[test]
    fn verdicts_are_independent_of_detection_order() {
        let slots = vec![
            slot("S001", [0.0, 0.0, 100.0, 100.0]),
            slot("S002", [200.0, 0.0, 300.0, 100.0]),
        ];
        let mut detections = vec![
            detection([0.0, 0.0, 100.0, 100.0], 0.6, VehicleCategory::Car),
            detection([10.0, 10.0, 110.0, 110.0], 0.9, VehicleCategory::Truck),
            detection([205.0, 0.0, 305.0, 100.0], 0.75, VehicleCategory::Bus),
        ];

        let forward = resolve(&slots, &detections);
        detections.reverse();
        let backward = resolve(&slots, &detections);

        assert_eq!(forward, backward);
    }

    #[test]
    fn one_detection_may_claim_multiple_slots() {
        // A bus spanning two adjacent slots occupies both
        let slots = vec![
            slot("S001", [0.0, 0.0, 100.0, 100.0]),
            slot("S002", [100.0, 0.0, 200.0, 100.0]),
        ];
        let detections = vec![detection([20.0, 0.0, 180.0, 100.0], 0.9, VehicleCategory::Bus)];

        let result = resolve(&slots, &detections);

        assert!(result[0].occupied);
        assert!(result[1].occupied);
    }

    #[test]
    fn summary_counts_always_add_up() {
        let slots = vec![
            slot("S001", [0.0, 0.0, 100.0, 100.0]),
            slot("S002", [200.0, 0.0, 300.0, 100.0]),
            slot("S003", [400.0, 0.0, 500.0, 100.0]),
        ];
        let detections = vec![detection([0.0, 0.0, 100.0, 100.0], 0.8, VehicleCategory::Car)];

        let summary = OccupancySummary::from_slots(&resolve(&slots, &detections));

        assert_eq!(summary.occupied, 1);
        assert_eq!(summary.available, 2);
        assert_eq!(summary.occupied + summary.available, summary.total);
    }

    #[test]
    fn mock_snapshot_counts_add_up_and_categories_match() {
        let slots: Vec<SlotRegion> = crate::layout::default_layout();
        let mut rng = StdRng::seed_from_u64(7);

        let snapshot = mock_snapshot(&slots, &mut rng);
        let summary = OccupancySummary::from_slots(&snapshot);

        assert_eq!(summary.total, 8);
        assert_eq!(summary.occupied + summary.available, 8);
        for verdict in &snapshot {
            if verdict.occupied {
                assert_eq!(verdict.confidence, 0.85);
                assert_eq!(verdict.vehicle_category, Some(VehicleCategory::Car));
            } else {
                assert_eq!(verdict.confidence, 0.95);
                assert_eq!(verdict.vehicle_category, None);
            }
        }
    }
}
