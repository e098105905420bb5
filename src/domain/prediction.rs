// Battery degradation forecast
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

/// Health the forecast degrades towards at the end of the horizon
const END_OF_HORIZON_HEALTH: f64 = 65.0;
const HORIZON_DAYS: i64 = 90;
const STEP_DAYS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryPrediction {
    pub current_health: f64,
    pub predicted_health_in_30_days: f64,
    pub predicted_health_in_60_days: f64,
    pub predicted_health_in_90_days: f64,
    pub confidence_level: f64,
    pub remaining_life_cycles: u32,
    pub recommended_action: String,
}

impl Default for BatteryPrediction {
    fn default() -> Self {
        Self {
            current_health: 87.0,
            predicted_health_in_30_days: 82.0,
            predicted_health_in_60_days: 78.0,
            predicted_health_in_90_days: 74.0,
            confidence_level: 85.0,
            remaining_life_cycles: 1250,
            recommended_action: "Monitor closely - consider replacement in 6 months".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthGrade {
    Excellent,
    Good,
    Poor,
}

pub fn health_grade(health: f64) -> HealthGrade {
    if health >= 80.0 {
        HealthGrade::Excellent
    } else if health >= 60.0 {
        HealthGrade::Good
    } else {
        HealthGrade::Poor
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub battery_health: f64,
    pub predicted: f64,
    pub confidence: f64,
}

impl BatteryPrediction {
    /// Linear degradation from current health to the end-of-horizon health,
    /// one point every ten days, with jitter on the predicted and confidence
    /// values.
    pub fn forecast<R: Rng>(&self, start: DateTime<Utc>, rng: &mut R) -> Vec<PredictionPoint> {
        let base = self.current_health;

        (0..=HORIZON_DAYS)
            .step_by(STEP_DAYS)
            .map(|day| {
                let degradation = day as f64 / HORIZON_DAYS as f64 * (base - END_OF_HORIZON_HEALTH);
                let health = base - degradation;
                PredictionPoint {
                    date: (start + Duration::days(day)).date_naive(),
                    battery_health: health.round(),
                    predicted: (health + (rng.random::<f64>() - 0.5) * 2.0).round(),
                    confidence: (self.confidence_level + (rng.random::<f64>() - 0.5) * 10.0).round(),
                }
            })
            .collect()
    }
}
