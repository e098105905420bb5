// Fleet summary domain model
use super::vehicle::{HealthStatus, VehicleCatalog};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: u32,
    pub healthy: u32,
    pub warning: u32,
    pub critical: u32,
}

/// Fleet summary as reported by the backend; every field may be absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetSummaryReport {
    pub total: Option<u32>,
    pub healthy: Option<u32>,
    pub critical: Option<u32>,
    pub warning: Option<u32>,
}

impl From<FleetSummaryReport> for FleetSummary {
    fn from(report: FleetSummaryReport) -> Self {
        let total = report.total.unwrap_or(0);
        let healthy = report.healthy.unwrap_or(0);
        let critical = report.critical.unwrap_or(0);
        let warning = report
            .warning
            .unwrap_or_else(|| total.saturating_sub(healthy).saturating_sub(critical));

        Self {
            total,
            healthy,
            warning,
            critical,
        }
    }
}

impl FleetSummary {
    pub fn from_catalog(catalog: &VehicleCatalog) -> Self {
        Self {
            total: catalog.vehicles().len() as u32,
            healthy: catalog.count(HealthStatus::Healthy) as u32,
            warning: catalog.count(HealthStatus::Warning) as u32,
            critical: catalog.count(HealthStatus::Critical) as u32,
        }
    }
}
