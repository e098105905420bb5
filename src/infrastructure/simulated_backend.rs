// In-process vehicle backend producing drifting telemetry for demo and offline runs
use crate::application::fallback;
use crate::application::vehicle_backend::{BackendResult, RecommendationRequest, SearchHit, VehicleBackend};
use crate::domain::diagnostics::{AlertRecord, ApplicationRecord, FaultRecord, VehicleEntity};
use crate::domain::fleet::{FleetSummary, FleetSummaryReport};
use crate::domain::telemetry::{
    BatteryReading, BrakeReading, DataParameter, EngineReading, StatusReading, TireReading, VehicleMetrics,
};
use crate::domain::vehicle::{StatusFilter, VehicleCatalog};
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::Mutex;

const BATTERY_LEVEL: RangeInclusive<f64> = 10.0..=100.0;
const BATTERY_TEMP: RangeInclusive<f64> = 20.0..=45.0;
const ENGINE_TEMP: RangeInclusive<f64> = 180.0..=220.0;
const OIL_PRESSURE: RangeInclusive<f64> = 30.0..=60.0;
const BRAKE_SYSTEM: RangeInclusive<f64> = 5.0..=100.0;
const TIRE_PRESSURE: RangeInclusive<f64> = 25.0..=35.0;

const SEARCH_LIMIT: usize = 10;

fn initial_reading() -> StatusReading {
    StatusReading {
        battery: BatteryReading {
            level: 87.0,
            temperature: 32.0,
        },
        engine: EngineReading {
            temperature: 195.0,
            oil_pressure: 45.0,
        },
        brakes: BrakeReading { fluid_level: 15.0 },
        tires: TireReading { pressure: 31.0 },
    }
}

fn drift<R: Rng>(rng: &mut R, value: f64, max_step: f64, bounds: &RangeInclusive<f64>) -> f64 {
    let next = value + rng.random_range(-max_step..=max_step);
    let clamped = next.clamp(*bounds.start(), *bounds.end());
    (clamped * 10.0).round() / 10.0
}

/// Advance a reading by one random-walk step
fn step<R: Rng>(rng: &mut R, reading: &mut StatusReading) {
    reading.battery.level = drift(rng, reading.battery.level, 1.0, &BATTERY_LEVEL);
    reading.battery.temperature = drift(rng, reading.battery.temperature, 0.5, &BATTERY_TEMP);
    reading.engine.temperature = drift(rng, reading.engine.temperature, 2.0, &ENGINE_TEMP);
    reading.engine.oil_pressure = drift(rng, reading.engine.oil_pressure, 1.0, &OIL_PRESSURE);
    reading.brakes.fluid_level = drift(rng, reading.brakes.fluid_level, 1.0, &BRAKE_SYSTEM);
    reading.tires.pressure = drift(rng, reading.tires.pressure, 0.3, &TIRE_PRESSURE);
}

fn advice_for(system: &str) -> &'static str {
    let system = system.to_lowercase();
    if system.contains("brake") {
        "Brake wear is beyond the service limit. Book a brake inspection and pad replacement before further long trips."
    } else if system.contains("battery") {
        "Battery temperature is trending upward. Check the cooling circuit and avoid fast charging until it stabilises."
    } else if system.contains("engine") {
        "Engine readings are within range. Keep to the regular oil change interval and recheck at the next service."
    } else {
        fallback::RECOMMENDATION
    }
}

pub struct SimulatedBackend {
    catalog: Arc<VehicleCatalog>,
    readings: Mutex<HashMap<String, StatusReading>>,
}

impl SimulatedBackend {
    pub fn new(catalog: Arc<VehicleCatalog>) -> Self {
        Self {
            catalog,
            readings: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl VehicleBackend for SimulatedBackend {
    async fn vehicle_status(&self, vin: &str) -> BackendResult<StatusReading> {
        let mut readings = self.readings.lock().await;
        let reading = readings.entry(vin.to_string()).or_insert_with(initial_reading);
        step(&mut rand::rng(), reading);
        Ok(reading.clone())
    }

    async fn data_parameters(&self, _vin: &str) -> BackendResult<Vec<DataParameter>> {
        Ok(fallback::data_parameters())
    }

    async fn metrics(&self, _vin: &str) -> BackendResult<VehicleMetrics> {
        Ok(fallback::metrics())
    }

    async fn entities(&self, _vin: &str) -> BackendResult<Vec<VehicleEntity>> {
        Ok(fallback::entities())
    }

    async fn faults(&self, _vin: &str) -> BackendResult<Vec<FaultRecord>> {
        Ok(fallback::faults())
    }

    async fn applications(&self, _vin: &str) -> BackendResult<Vec<ApplicationRecord>> {
        Ok(fallback::applications())
    }

    async fn alerts(&self, _vin: &str) -> BackendResult<Vec<AlertRecord>> {
        Ok(fallback::alerts())
    }

    async fn recommendation(&self, request: &RecommendationRequest) -> BackendResult<String> {
        let system = fallback::alerts()
            .into_iter()
            .find(|a| a.id == request.alert_id)
            .map(|a| a.system)
            .unwrap_or_else(|| request.message.clone());
        Ok(advice_for(&system).to_string())
    }

    async fn fleet_summary(&self) -> BackendResult<FleetSummaryReport> {
        let summary = FleetSummary::from_catalog(&self.catalog);
        Ok(FleetSummaryReport {
            total: Some(summary.total),
            healthy: Some(summary.healthy),
            critical: Some(summary.critical),
            warning: Some(summary.warning),
        })
    }

    async fn search_vehicles(&self, query: &str) -> BackendResult<Vec<SearchHit>> {
        Ok(self
            .catalog
            .filter(query, StatusFilter::All, SEARCH_LIMIT)
            .into_iter()
            .map(|v| SearchHit {
                vin: v.vin,
                label: Some(v.label),
            })
            .collect())
    }
}
