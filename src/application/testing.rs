// In-memory vehicle backend used by the unit tests
use crate::application::vehicle_backend::{
    BackendError, BackendResult, RecommendationRequest, SearchHit, VehicleBackend,
};
use crate::domain::diagnostics::{
    AlertRecord, AlertSeverity, ApplicationRecord, ApplicationStatus, EntityCategory, FaultRecord, FaultStatus,
    VehicleEntity,
};
use crate::domain::fleet::FleetSummaryReport;
use crate::domain::telemetry::{
    BatteryReading, BrakeReading, DataParameter, EngineReading, MetricSample, StatusReading, TireReading,
    VehicleMetrics,
};
use crate::domain::vehicle::{StatusFilter, VehicleCatalog};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<(&'static str, String)>>,
    failing: Mutex<HashSet<&'static str>>,
    delays: Mutex<HashMap<(&'static str, String), Duration>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Delay the answer to `op` called with `arg`
    pub fn delay(&self, op: &'static str, arg: &str, delay: Duration) {
        self.delays.lock().unwrap().insert((op, arg.to_string()), delay);
    }

    /// Arguments of every call made to `op`, in call order
    pub fn calls(&self, op: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| *name == op)
            .map(|(_, arg)| arg.clone())
            .collect()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls(op).len()
    }

    async fn enter(&self, op: &'static str, arg: &str) -> BackendResult<()> {
        self.calls.lock().unwrap().push((op, arg.to_string()));
        let delay = self.delays.lock().unwrap().get(&(op, arg.to_string())).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(BackendError::Status {
                status: 503,
                url: format!("http://backend.test/{op}"),
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

pub fn reading(battery_level: f64) -> StatusReading {
    StatusReading {
        battery: BatteryReading {
            level: battery_level,
            temperature: 28.0,
        },
        engine: EngineReading {
            temperature: 198.0,
            oil_pressure: 44.0,
        },
        brakes: BrakeReading { fluid_level: 91.0 },
        tires: TireReading { pressure: 33.0 },
    }
}

#[async_trait]
impl VehicleBackend for FakeBackend {
    async fn vehicle_status(&self, vin: &str) -> BackendResult<StatusReading> {
        self.enter("status", vin).await?;
        Ok(reading(76.0))
    }

    async fn data_parameters(&self, vin: &str) -> BackendResult<Vec<DataParameter>> {
        self.enter("parameters", vin).await?;
        Ok(vec![DataParameter::new("Odometer", "Vehicle", "48211", "km")])
    }

    async fn metrics(&self, vin: &str) -> BackendResult<VehicleMetrics> {
        self.enter("metrics", vin).await?;
        Ok(VehicleMetrics {
            cpu: vec![MetricSample::new("10:00:00", 41.0)],
            memory: vec![MetricSample::new("10:00:00", 63.0)],
            network: vec![],
        })
    }

    async fn entities(&self, vin: &str) -> BackendResult<Vec<VehicleEntity>> {
        self.enter("entities", vin).await?;
        Ok(vec![VehicleEntity::new("7", "Battery Pack", EntityCategory::Components, "Active")])
    }

    async fn faults(&self, vin: &str) -> BackendResult<Vec<FaultRecord>> {
        self.enter("faults", vin).await?;
        Ok(vec![FaultRecord::new(
            "Battery",
            "P0A80",
            &format!("Replace hybrid battery pack on {vin}"),
            FaultStatus::Active,
        )])
    }

    async fn applications(&self, vin: &str) -> BackendResult<Vec<ApplicationRecord>> {
        self.enter("applications", vin).await?;
        Ok(vec![ApplicationRecord::new(
            "Telematics Agent",
            "tel-v4.2",
            "2024-03-02",
            "12MB",
            ApplicationStatus::Error,
        )])
    }

    async fn alerts(&self, vin: &str) -> BackendResult<Vec<AlertRecord>> {
        self.enter("alerts", vin).await?;
        Ok(vec![AlertRecord::new(
            "a-1",
            AlertSeverity::Critical,
            "Brake System",
            "Brake fluid low",
            "2024-03-02 08:00:00",
        )])
    }

    async fn recommendation(&self, request: &RecommendationRequest) -> BackendResult<String> {
        self.enter("recommendation", &request.alert_id).await?;
        Ok(format!("Inspect: {}", request.message))
    }

    async fn fleet_summary(&self) -> BackendResult<FleetSummaryReport> {
        self.enter("fleet", "").await?;
        Ok(FleetSummaryReport {
            total: Some(10),
            healthy: Some(6),
            critical: Some(1),
            warning: None,
        })
    }

    async fn search_vehicles(&self, query: &str) -> BackendResult<Vec<SearchHit>> {
        self.enter("search", query).await?;
        Ok(VehicleCatalog::default()
            .filter(query, StatusFilter::All, 10)
            .into_iter()
            .map(|v| SearchHit {
                vin: v.vin,
                label: Some(v.label),
            })
            .collect())
    }
}
