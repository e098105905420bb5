// Backend trait for vehicle data access
use crate::domain::diagnostics::{AlertRecord, ApplicationRecord, FaultRecord, VehicleEntity};
use crate::domain::fleet::FleetSummaryReport;
use crate::domain::telemetry::{DataParameter, StatusReading, VehicleMetrics};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures talking to the vehicle backend.
///
/// Every variant ends up on the same fallback path in the panels; the split
/// only matters for logging.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request to vehicle backend failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("vehicle backend returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("malformed response from vehicle backend: {0}")]
    Decode(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub alert_id: String,
    pub message: String,
    pub vin: String,
}

/// A VIN search hit; `label` is absent when the backend answers with bare strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub vin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[async_trait]
pub trait VehicleBackend: Send + Sync {
    async fn vehicle_status(&self, vin: &str) -> BackendResult<StatusReading>;

    async fn data_parameters(&self, vin: &str) -> BackendResult<Vec<DataParameter>>;

    /// Time series for the live performance charts
    async fn metrics(&self, vin: &str) -> BackendResult<VehicleMetrics>;

    async fn entities(&self, vin: &str) -> BackendResult<Vec<VehicleEntity>>;

    async fn faults(&self, vin: &str) -> BackendResult<Vec<FaultRecord>>;

    async fn applications(&self, vin: &str) -> BackendResult<Vec<ApplicationRecord>>;

    async fn alerts(&self, vin: &str) -> BackendResult<Vec<AlertRecord>>;

    async fn recommendation(&self, request: &RecommendationRequest) -> BackendResult<String>;

    async fn fleet_summary(&self) -> BackendResult<FleetSummaryReport>;

    async fn search_vehicles(&self, query: &str) -> BackendResult<Vec<SearchHit>>;
}
