//! Per-lot slot layouts: fixed rectangles in camera coordinates, one per
//! physical parking space. Loaded once at startup, read-only thereafter.

use crate::geometry::BoundingBox;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One parking space within a lot's camera view.
#[derive(Debug, Clone)]
pub struct SlotRegion {
    pub slot_id: String,
    pub bbox: BoundingBox,
}

/// Two-row eight-slot layout used whenever no configured layout covers a lot.
pub fn default_layout() -> Vec<SlotRegion> {
    let coords: [(&str, [f32; 4]); 8] = [
        ("S001", [100.0, 100.0, 200.0, 250.0]),
        ("S002", [220.0, 100.0, 320.0, 250.0]),
        ("S003", [340.0, 100.0, 440.0, 250.0]),
        ("S004", [460.0, 100.0, 560.0, 250.0]),
        ("S005", [100.0, 270.0, 200.0, 420.0]),
        ("S006", [220.0, 270.0, 320.0, 420.0]),
        ("S007", [340.0, 270.0, 440.0, 420.0]),
        ("S008", [460.0, 270.0, 560.0, 420.0]),
    ];
    coords
        .into_iter()
        .map(|(slot_id, [x1, y1, x2, y2])| SlotRegion {
            slot_id: slot_id.to_string(),
            bbox: BoundingBox::new(x1, y1, x2, y2),
        })
        .collect()
}

#[derive(Debug)]
pub struct SlotLayouts {
    lots: HashMap<String, Vec<SlotRegion>>,
    default: Vec<SlotRegion>,
}

impl SlotLayouts {
    /// Only the built-in default layout, no per-lot overrides.
    pub fn builtin() -> Self {
        Self {
            lots: HashMap::new(),
            default: default_layout(),
        }
    }

    /// Slot regions for a lot. Unknown lot ids fall back to the default
    /// layout rather than erroring.
    pub fn regions_for(&self, lot_id: &str) -> &[SlotRegion] {
        self.lots
            .get(lot_id)
            .map(Vec::as_slice)
            .unwrap_or(&self.default)
    }

    pub fn lot_count(&self) -> usize {
        self.lots.len()
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let contents = std::fs::read_to_string(path)?;
        let file: LayoutFile = toml::from_str(&contents)?;

        let mut lots = HashMap::new();
        for (lot_id, entries) in file.lots {
            let mut regions = Vec::with_capacity(entries.len());
            for entry in entries {
                let [x1, y1, x2, y2] = entry.bbox;
                if x1 >= x2 || y1 >= y2 {
                    return Err(LayoutError::Invalid(format!(
                        "slot {} in lot {lot_id} has a degenerate bbox",
                        entry.slot_id
                    )));
                }
                regions.push(SlotRegion {
                    slot_id: entry.slot_id,
                    bbox: BoundingBox::new(x1, y1, x2, y2),
                });
            }
            lots.insert(lot_id, regions);
        }

        Ok(Self {
            lots,
            default: default_layout(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LayoutFile {
    #[serde(default)]
    lots: HashMap<String, Vec<SlotEntry>>,
}

#[derive(Debug, Deserialize)]
struct SlotEntry {
    slot_id: String,
    /// `[x1, y1, x2, y2]` in image pixel coordinates.
    bbox: [f32; 4],
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse layout file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid layout: {0}")]
    Invalid(String),
}
