// Diagnostics domain models - faults, applications, entities, alerts
use serde::{Deserialize, Serialize};

/// Badge style a status renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultStatus {
    Active,
    Resolved,
    Pending,
    #[serde(other)]
    Unknown,
}

impl FaultStatus {
    pub fn badge(&self) -> BadgeVariant {
        match self {
            FaultStatus::Active => BadgeVariant::Destructive,
            FaultStatus::Resolved => BadgeVariant::Default,
            FaultStatus::Pending => BadgeVariant::Secondary,
            FaultStatus::Unknown => BadgeVariant::Outline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub entity: String,
    pub code: String,
    pub description: String,
    pub status: FaultStatus,
}

impl FaultRecord {
    pub fn new(entity: &str, code: &str, description: &str, status: FaultStatus) -> Self {
        Self {
            entity: entity.to_string(),
            code: code.to_string(),
            description: description.to_string(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Running,
    Stopped,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationAction {
    Start,
    Stop,
    Restart,
}

impl std::fmt::Display for ApplicationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ApplicationAction::Start => "Start",
            ApplicationAction::Stop => "Stop",
            ApplicationAction::Restart => "Restart",
        };
        f.write_str(label)
    }
}

impl ApplicationStatus {
    pub fn badge(&self) -> BadgeVariant {
        match self {
            ApplicationStatus::Running => BadgeVariant::Default,
            ApplicationStatus::Stopped => BadgeVariant::Secondary,
            ApplicationStatus::Error => BadgeVariant::Destructive,
            ApplicationStatus::Unknown => BadgeVariant::Outline,
        }
    }

    /// The control offered for an application in this status
    pub fn action(&self) -> Option<ApplicationAction> {
        match self {
            ApplicationStatus::Running => Some(ApplicationAction::Stop),
            ApplicationStatus::Stopped => Some(ApplicationAction::Start),
            ApplicationStatus::Error => Some(ApplicationAction::Restart),
            ApplicationStatus::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub name: String,
    pub tag: String,
    pub creation_date: String,
    pub size: String,
    pub status: ApplicationStatus,
}

impl ApplicationRecord {
    pub fn new(name: &str, tag: &str, creation_date: &str, size: &str, status: ApplicationStatus) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            creation_date: creation_date.to_string(),
            size: size.to_string(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    Area,
    Components,
    Apps,
    Functions,
    #[serde(other)]
    Unknown,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::Area,
        EntityCategory::Components,
        EntityCategory::Apps,
        EntityCategory::Functions,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleEntity {
    pub id: String,
    pub name: String,
    pub category: EntityCategory,
    pub status: String,
}

impl VehicleEntity {
    pub fn new(id: &str, name: &str, category: EntityCategory, status: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            status: status.to_string(),
        }
    }
}

/// Entities bucketed by category, in display order. Unknown categories are left out.
pub fn group_entities(entities: &[VehicleEntity]) -> Vec<(EntityCategory, Vec<VehicleEntity>)> {
    EntityCategory::ALL
        .iter()
        .map(|category| {
            let items = entities
                .iter()
                .filter(|e| e.category == *category)
                .cloned()
                .collect();
            (*category, items)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
    Info,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub severity: AlertSeverity,
    pub system: String,
    pub message: String,
    pub timestamp: String,
}

impl AlertRecord {
    pub fn new(id: &str, severity: AlertSeverity, system: &str, message: &str, timestamp: &str) -> Self {
        Self {
            id: id.to_string(),
            severity,
            system: system.to_string(),
            message: message.to_string(),
            timestamp: timestamp.to_string(),
        }
    }
}
