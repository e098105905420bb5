// Substitute panel content shown while the vehicle backend is unreachable
use crate::domain::diagnostics::{
    AlertRecord, AlertSeverity, ApplicationRecord, ApplicationStatus, EntityCategory, FaultRecord, FaultStatus,
    VehicleEntity,
};
use crate::domain::telemetry::{DataParameter, MetricSample, VehicleMetrics};
use chrono::{Duration, Utc};
use rand::Rng;

pub const RECOMMENDATION: &str = "Unable to generate an AI recommendation right now. \
Monitor this system and schedule a diagnostic check at your next service visit.";

const METRIC_POINTS: i64 = 10;
const METRIC_SPACING_SECS: i64 = 30;

pub fn faults() -> Vec<FaultRecord> {
    vec![
        FaultRecord::new("Engine", "P0300", "Random/Multiple Cylinder Misfire Detected", FaultStatus::Active),
        FaultRecord::new("ABS", "C1234", "ABS Speed Sensor Malfunction", FaultStatus::Resolved),
        FaultRecord::new("Transmission", "P0700", "Transmission Control System Malfunction", FaultStatus::Pending),
    ]
}

pub fn applications() -> Vec<ApplicationRecord> {
    use ApplicationStatus::*;
    vec![
        ApplicationRecord::new("Navigation System", "nav-v2.1", "2024-01-15", "145MB", Running),
        ApplicationRecord::new("Climate Control", "climate-v1.3", "2024-01-10", "32MB", Running),
        ApplicationRecord::new("Entertainment Hub", "entertainment-v3.0", "2024-01-20", "256MB", Stopped),
        ApplicationRecord::new("Diagnostics Tool", "diag-v1.0", "2024-01-05", "78MB", Running),
    ]
}

pub fn entities() -> Vec<VehicleEntity> {
    vec![
        VehicleEntity::new("1", "Engine Control", EntityCategory::Components, "Active"),
        VehicleEntity::new("2", "Passenger Area", EntityCategory::Area, "Normal"),
        VehicleEntity::new("3", "Navigation App", EntityCategory::Apps, "Running"),
        VehicleEntity::new("4", "Climate Control", EntityCategory::Functions, "Active"),
    ]
}

pub fn data_parameters() -> Vec<DataParameter> {
    vec![
        DataParameter::new("Engine Temperature", "Engine", "92", "°C"),
        DataParameter::new("Battery Voltage", "Battery", "12.6", "V"),
        DataParameter::new("Speed", "Vehicle", "65", "km/h"),
        DataParameter::new("Fuel Level", "Tank", "75", "%"),
        DataParameter::new("Oil Pressure", "Engine", "45", "PSI"),
    ]
}

pub fn alerts() -> Vec<AlertRecord> {
    vec![
        AlertRecord::new(
            "1",
            AlertSeverity::Warning,
            "Battery System",
            "Battery temperature slightly elevated",
            "2024-01-15 14:30:00",
        ),
        AlertRecord::new(
            "2",
            AlertSeverity::Info,
            "Engine",
            "Engine oil pressure within normal range",
            "2024-01-15 14:25:00",
        ),
        AlertRecord::new(
            "3",
            AlertSeverity::Critical,
            "Brake System",
            "Brake pad wear detected - service required",
            "2024-01-15 14:20:00",
        ),
    ]
}

/// Ten random samples per series, thirty seconds apart, ending now
pub fn metrics() -> VehicleMetrics {
    let mut rng = rand::rng();
    let now = Utc::now();
    let timestamps: Vec<String> = (0..METRIC_POINTS)
        .map(|i| {
            let at = now - Duration::seconds((METRIC_POINTS - 1 - i) * METRIC_SPACING_SECS);
            at.format("%H:%M:%S").to_string()
        })
        .collect();

    let mut series = |low: u32, high: u32| -> Vec<MetricSample> {
        timestamps
            .iter()
            .map(|t| MetricSample::new(t.clone(), rng.random_range(low..high) as f64))
            .collect()
    };

    VehicleMetrics {
        cpu: series(0, 100),
        memory: series(20, 100),
        network: series(10, 60),
    }
}
