//! Demand profile store: fixed hourly demand intensity per day of week.
//!
//! Two curves only, weekday (Monday through Friday) and weekend. The exact
//! values are part of the observable forecasting behavior and must not be
//! tuned casually.

/// Relative demand per hour, Monday through Friday. Commute peaks at 07:00,
/// 12:00 and 17:00.
const WEEKDAY_CURVE: [f64; 24] = [
    0.3, 0.2, 0.1, 0.1, 0.2, 0.4, 0.7, 0.9, 0.8, 0.6, 0.7, 0.8, 0.9, 0.8, 0.7, 0.6, 0.7, 0.9,
    0.8, 0.6, 0.4, 0.3, 0.2, 0.2,
];

/// Relative demand per hour on Saturday and Sunday. Single midday plateau.
const WEEKEND_CURVE: [f64; 24] = [
    0.2, 0.1, 0.1, 0.1, 0.1, 0.2, 0.3, 0.4, 0.5, 0.7, 0.8, 0.9, 0.9, 0.8, 0.8, 0.7, 0.6, 0.7,
    0.8, 0.7, 0.5, 0.4, 0.3, 0.2,
];

#[derive(Debug, Clone, Copy)]
pub struct DemandProfile {
    weekday: [f64; 24],
    weekend: [f64; 24],
}

impl DemandProfile {
    pub const fn builtin() -> Self {
        Self {
            weekday: WEEKDAY_CURVE,
            weekend: WEEKEND_CURVE,
        }
    }

    /// Uniform profile; test use only.
    pub const fn flat(intensity: f64) -> Self {
        Self {
            weekday: [intensity; 24],
            weekend: [intensity; 24],
        }
    }

    /// Demand intensity in `[0, 1]` for `day_of_week` (0 = Monday through
    /// 6 = Sunday) at `hour` (0..24). Days 0..=4 use the weekday curve,
    /// 5 and 6 the weekend curve.
    pub fn intensity(&self, day_of_week: u8, hour: u8) -> f64 {
        let curve = if day_of_week <= 4 {
            &self.weekday
        } else {
            &self.weekend
        };
        curve[(hour % 24) as usize]
    }
}
