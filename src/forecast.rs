//! Availability forecaster: projects available-slot counts at fixed future
//! horizons from the current occupancy and the demand profile.

use crate::demand::DemandProfile;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

/// Identifies the heuristic model in responses, as opposed to a future
/// learned model.
pub const MODEL_VERSION: &str = "heuristic_v1.0";

/// Fixed confidence reported for every heuristic forecast.
pub const MODEL_CONFIDENCE: f64 = 0.75;

/// Fraction of a demand swing that shows up as occupancy change.
pub const DEMAND_SENSITIVITY: f64 = 0.5;

/// Perturbation range: inclusive low, exclusive high.
pub const NOISE_LOW: i64 = -2;
pub const NOISE_HIGH: i64 = 3;

/// Forecast horizons in hours with their response labels.
pub const HORIZONS: [(u8, &str); 3] = [(1, "+1h"), (2, "+2h"), (4, "+4h")];

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRequest {
    pub lot_id: String,
    pub current_occupied_count: i64,
    pub total_slots: i64,
    /// RFC 3339 timestamp the forecast is anchored at.
    pub current_timestamp: String,
    /// Accepted for forward compatibility (per-hour average durations);
    /// the heuristic model does not use these yet.
    #[serde(default)]
    pub historical_samples: Vec<HistoricalSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalSample {
    pub duration_minutes: u32,
    pub day_of_week: u8,
    pub hour_of_day: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Predicted available-slot count per horizon label.
    pub predictions: BTreeMap<String, i64>,
    pub confidence: f64,
    pub model_version: String,
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("current_timestamp is not a valid RFC 3339 timestamp: {0}")]
    InvalidTimestamp(#[from] time::error::Parse),
    #[error("current_occupied_count {occupied} must be between 0 and total_slots {total_slots}")]
    InvalidCounts { occupied: i64, total_slots: i64 },
}

/// Injectable perturbation source so forecasts are reproducible in tests.
pub trait NoiseSource {
    /// Draw one integer from `[NOISE_LOW, NOISE_HIGH)`.
    fn perturbation(&mut self) -> i64;
}

/// Production noise backed by a seedable RNG.
#[derive(Debug)]
pub struct RngNoise {
    rng: StdRng,
}

impl RngNoise {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for RngNoise {
    fn perturbation(&mut self) -> i64 {
        self.rng.gen_range(NOISE_LOW..NOISE_HIGH)
    }
}

/// No perturbation at all; makes forecasts exact in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn perturbation(&mut self) -> i64 {
        0
    }
}

/// Forecast available-slot counts at every horizon in [`HORIZONS`].
///
/// The hour wraps modulo 24 when a horizon crosses midnight but the day of
/// week stays fixed; callers relying on overnight forecasts should know the
/// demand lookup keeps the anchor day's curve.
pub fn forecast(
    request: &ForecastRequest,
    profile: &DemandProfile,
    noise: &mut dyn NoiseSource,
) -> Result<ForecastResult, ForecastError> {
    let anchor = OffsetDateTime::parse(&request.current_timestamp, &Rfc3339)?;
    let hour = anchor.hour();
    let day_of_week = anchor.weekday().number_days_from_monday();

    if request.current_occupied_count < 0 || request.current_occupied_count > request.total_slots {
        return Err(ForecastError::InvalidCounts {
            occupied: request.current_occupied_count,
            total_slots: request.total_slots,
        });
    }

    let available_now = request.total_slots - request.current_occupied_count;
    let current_demand = profile.intensity(day_of_week, hour);

    if let Some(avg) = average_duration_minutes(&request.historical_samples, hour) {
        debug!(
            lot_id = %request.lot_id,
            hour,
            avg_duration_minutes = avg,
            "Historical samples received; not used by the heuristic model"
        );
    }

    let mut predictions = BTreeMap::new();
    for (hours_ahead, label) in HORIZONS {
        let future_hour = (hour + hours_ahead) % 24;
        let future_demand = profile.intensity(day_of_week, future_hour);
        let occupancy_change = ((future_demand - current_demand)
            * request.total_slots as f64
            * DEMAND_SENSITIVITY)
            .round() as i64;

        let predicted =
            (available_now - occupancy_change + noise.perturbation()).clamp(0, request.total_slots);
        predictions.insert(label.to_string(), predicted);
    }

    Ok(ForecastResult {
        predictions,
        confidence: MODEL_CONFIDENCE,
        model_version: MODEL_VERSION.to_string(),
    })
}

fn average_duration_minutes(samples: &[HistoricalSample], hour: u8) -> Option<f64> {
    let durations: Vec<u32> = samples
        .iter()
        .filter(|sample| sample.hour_of_day == hour)
        .map(|sample| sample.duration_minutes)
        .collect();
    if durations.is_empty() {
        return None;
    }
    Some(durations.iter().map(|d| *d as f64).sum::<f64>() / durations.len() as f64)
}
