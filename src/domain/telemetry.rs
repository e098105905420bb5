// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw status reading as reported by the vehicle backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReading {
    pub battery: BatteryReading,
    pub engine: EngineReading,
    pub brakes: BrakeReading,
    pub tires: TireReading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    pub level: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineReading {
    pub temperature: f64,
    pub oil_pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrakeReading {
    pub fluid_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireReading {
    pub pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub battery_level: f64,
    pub battery_temp: f64,
    pub engine_temp: f64,
    pub oil_pressure: f64,
    pub brake_system: f64,
    pub tire_pressure: f64,
    pub last_update: Option<DateTime<Utc>>,
    pub is_connected: bool,
}

impl TelemetrySnapshot {
    pub fn from_reading(reading: &StatusReading, at: DateTime<Utc>) -> Self {
        Self {
            battery_level: reading.battery.level,
            battery_temp: reading.battery.temperature,
            engine_temp: reading.engine.temperature,
            oil_pressure: reading.engine.oil_pressure,
            brake_system: reading.brakes.fluid_level,
            tire_pressure: reading.tires.pressure,
            last_update: Some(at),
            is_connected: true,
        }
    }

    /// Reference values shown while the vehicle cannot be reached
    pub fn disconnected() -> Self {
        Self {
            battery_level: 87.0,
            battery_temp: 32.0,
            engine_temp: 195.0,
            oil_pressure: 45.0,
            brake_system: 15.0,
            tire_pressure: 31.0,
            last_update: None,
            is_connected: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataParameter {
    pub name: String,
    pub entity: String,
    #[serde(deserialize_with = "value_text")]
    pub value: String,
    pub unit: String,
}

impl DataParameter {
    pub fn new(name: &str, entity: &str, value: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            entity: entity.to_string(),
            value: value.to_string(),
            unit: unit.to_string(),
        }
    }
}

/// Parameter values arrive as text or as bare JSON numbers and booleans
fn value_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Text(String),
        Number(f64),
        Flag(bool),
    }

    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Text(text) => text,
        RawValue::Number(number) => number.to_string(),
        RawValue::Flag(flag) => flag.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: String,
    pub value: f64,
}

impl MetricSample {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleMetrics {
    #[serde(default)]
    pub cpu: Vec<MetricSample>,
    #[serde(default)]
    pub memory: Vec<MetricSample>,
    #[serde(default)]
    pub network: Vec<MetricSample>,
}

impl VehicleMetrics {
    /// Most recent value of a series, 0 when the series is empty
    pub fn latest(series: &[MetricSample]) -> f64 {
        series.last().map(|s| s.value).unwrap_or(0.0)
    }
}
