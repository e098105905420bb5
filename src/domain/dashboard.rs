// Status overview domain model - metric cards derived from a telemetry snapshot
use super::telemetry::TelemetrySnapshot;
use super::vehicle::HealthStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub healthy: f64,
    pub warning: f64,
}

pub const BATTERY_THRESHOLDS: Thresholds = Thresholds { healthy: 60.0, warning: 30.0 };
pub const ENGINE_THRESHOLDS: Thresholds = Thresholds { healthy: 0.0, warning: -5.0 };
pub const BRAKE_THRESHOLDS: Thresholds = Thresholds { healthy: 70.0, warning: 30.0 };
pub const TIRE_THRESHOLDS: Thresholds = Thresholds { healthy: 30.0, warning: 28.0 };

/// Engine status is judged on headroom below this temperature (°F)
const ENGINE_TEMP_LIMIT: f64 = 210.0;

pub fn status_for_metric(value: f64, thresholds: Thresholds) -> HealthStatus {
    if value >= thresholds.healthy {
        HealthStatus::Healthy
    } else if value >= thresholds.warning {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: String,
    pub value: f64,
    pub unit: String,
    pub status: HealthStatus,
    pub progress: f64,
    pub subtitle: String,
}

impl MetricCard {
    fn new(title: &str, value: f64, unit: &str, status: HealthStatus, progress: f64, subtitle: String) -> Self {
        Self {
            title: title.to_string(),
            value,
            unit: unit.to_string(),
            status,
            progress: progress.clamp(0.0, 100.0),
            subtitle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOverview {
    pub is_connected: bool,
    pub connection_label: &'static str,
    pub cards: Vec<MetricCard>,
}

impl StatusOverview {
    pub fn from_snapshot(snapshot: &TelemetrySnapshot) -> Self {
        let connection_label = if snapshot.is_connected { "Connected" } else { "Disconnected" };
        Self {
            is_connected: snapshot.is_connected,
            connection_label,
            cards: status_cards(snapshot),
        }
    }
}

pub fn status_cards(snapshot: &TelemetrySnapshot) -> Vec<MetricCard> {
    vec![
        MetricCard::new(
            "Battery Level",
            snapshot.battery_level,
            "%",
            status_for_metric(snapshot.battery_level, BATTERY_THRESHOLDS),
            snapshot.battery_level,
            format!("Temperature: {}°C", snapshot.battery_temp),
        ),
        MetricCard::new(
            "Engine Temperature",
            snapshot.engine_temp,
            "°F",
            status_for_metric(ENGINE_TEMP_LIMIT - snapshot.engine_temp, ENGINE_THRESHOLDS),
            (snapshot.engine_temp - 180.0) / 40.0 * 100.0,
            format!("Oil Pressure: {} PSI", snapshot.oil_pressure),
        ),
        MetricCard::new(
            "Brake System",
            snapshot.brake_system,
            "%",
            status_for_metric(snapshot.brake_system, BRAKE_THRESHOLDS),
            snapshot.brake_system,
            "Fluid Level: 85%".to_string(),
        ),
        MetricCard::new(
            "Tire Pressure",
            snapshot.tire_pressure,
            "PSI",
            status_for_metric(snapshot.tire_pressure, TIRE_THRESHOLDS),
            (snapshot.tire_pressure - 25.0) / 10.0 * 100.0,
            "Tread Depth: 7/32\"".to_string(),
        ),
    ]
}
