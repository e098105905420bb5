// Vehicle identity and the fleet reference catalog
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

/// Categorical filter applied before the text predicate in local search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Healthy,
    Warning,
    Critical,
}

impl StatusFilter {
    pub fn matches(&self, status: HealthStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Healthy => status == HealthStatus::Healthy,
            StatusFilter::Warning => status == HealthStatus::Warning,
            StatusFilter::Critical => status == HealthStatus::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleIdentity {
    pub vin: String,
    pub label: String,
    pub status: HealthStatus,
}

impl VehicleIdentity {
    pub fn new(vin: impl Into<String>, label: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            vin: vin.into(),
            label: label.into(),
            status,
        }
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.vin.to_lowercase().contains(needle) || self.label.to_lowercase().contains(needle)
    }
}

/// Immutable reference list of known vehicles.
///
/// Built once from configuration and handed to whoever needs it; nothing
/// mutates it after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleCatalog {
    vehicles: Vec<VehicleIdentity>,
}

impl VehicleCatalog {
    pub fn new(vehicles: Vec<VehicleIdentity>) -> Self {
        Self { vehicles }
    }

    pub fn vehicles(&self) -> &[VehicleIdentity] {
        &self.vehicles
    }

    /// Status filter first, then a case-insensitive substring match on VIN
    /// or label, capped at `limit` results.
    pub fn filter(&self, query: &str, status: StatusFilter, limit: usize) -> Vec<VehicleIdentity> {
        let needle = query.trim().to_lowercase();
        self.vehicles
            .iter()
            .filter(|v| status.matches(v.status))
            .filter(|v| needle.is_empty() || v.matches_text(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn count(&self, status: HealthStatus) -> usize {
        self.vehicles.iter().filter(|v| v.status == status).count()
    }
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        use HealthStatus::*;
        Self::new(vec![
            VehicleIdentity::new("5YJ3E1EA7KF317000", "Tesla Model 3 · 2019", Healthy),
            VehicleIdentity::new("1HGCM82633A004352", "Honda Accord · 2003", Warning),
            VehicleIdentity::new("JTDKB20U793123456", "TCS Car · 2025", Healthy),
            VehicleIdentity::new("1FADP3F22EL123456", "Ford Focus · 2014", Critical),
            VehicleIdentity::new("WDDGF8AB4EA123456", "Mercedes C250 · 2014", Warning),
            VehicleIdentity::new("1FTFW1ET5DFC12345", "Ford F-150 · 2013", Healthy),
            VehicleIdentity::new("1C4RJFAG2EC123456", "Jeep Grand Cherokee · 2014", Critical),
            VehicleIdentity::new("2T1BURHE9JC123456", "Toyota Corolla · 2018", Healthy),
            VehicleIdentity::new("1N4AL3AP8JC123456", "Nissan Altima · 2018", Warning),
            VehicleIdentity::new("KMHD84LF3JU123456", "Hyundai Elantra · 2018", Healthy),
        ])
    }
}
