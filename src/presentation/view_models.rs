// Mapper to convert panel state into the JSON the dashboard renders
use crate::application::diagnostics_service::DiagnosticsSnapshot;
use crate::application::polling::PanelState;
use crate::application::recommendations::RecommendationView;
use crate::domain::dashboard::{MetricCard, StatusOverview};
use crate::domain::diagnostics::{
    AlertRecord, AlertSeverity, ApplicationAction, ApplicationRecord, ApplicationStatus, BadgeVariant,
    EntityCategory, FaultRecord, FaultStatus, VehicleEntity, group_entities,
};
use crate::domain::fleet::FleetSummary;
use crate::domain::prediction::{BatteryPrediction, HealthGrade, PredictionPoint, health_grade};
use crate::domain::telemetry::{DataParameter, MetricSample, TelemetrySnapshot, VehicleMetrics};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Common envelope for one dashboard panel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView<T> {
    pub loading: bool,
    /// Content is substitute data because the last fetch failed
    pub degraded: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub data: Option<T>,
}

fn panel_to_view<K, T, V>(state: PanelState<K, T>, map: impl FnOnce(T) -> V) -> PanelView<V> {
    PanelView {
        loading: state.loading,
        degraded: state.error,
        updated_at: state.updated_at,
        data: state.data.map(map),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub is_connected: bool,
    pub connection_label: &'static str,
    pub last_update: Option<DateTime<Utc>>,
    pub cards: Vec<MetricCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSeriesView {
    pub name: &'static str,
    pub latest: f64,
    pub samples: Vec<MetricSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityGroupView {
    pub category: EntityCategory,
    pub entities: Vec<VehicleEntity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaultRow {
    pub entity: String,
    pub code: String,
    pub description: String,
    pub status: FaultStatus,
    pub badge: BadgeVariant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub name: String,
    pub tag: String,
    pub creation_date: String,
    pub size: String,
    pub status: ApplicationStatus,
    pub badge: BadgeVariant,
    pub action: Option<ApplicationAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertRow {
    pub id: String,
    #[serde(rename = "type")]
    pub severity: AlertSeverity,
    pub system: String,
    pub message: String,
    pub timestamp: String,
    pub expanded: bool,
    pub loading: bool,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsView {
    pub vin: Option<String>,
    pub status: PanelView<StatusView>,
    pub parameters: PanelView<Vec<DataParameter>>,
    pub metrics: PanelView<Vec<MetricSeriesView>>,
    pub entities: PanelView<Vec<EntityGroupView>>,
    pub faults: PanelView<Vec<FaultRow>>,
    pub applications: PanelView<Vec<ApplicationRow>>,
    pub alerts: PanelView<Vec<AlertRow>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub prediction: BatteryPrediction,
    pub grade: HealthGrade,
    pub curve: Vec<PredictionPoint>,
}

pub fn diagnostics_to_view(snapshot: DiagnosticsSnapshot) -> DiagnosticsView {
    let recommendations = snapshot.recommendations;

    DiagnosticsView {
        vin: snapshot.vin,
        status: panel_to_view(snapshot.status, status_to_view),
        parameters: panel_to_view(snapshot.parameters, |rows| rows),
        metrics: panel_to_view(snapshot.metrics, metrics_to_view),
        entities: panel_to_view(snapshot.entities, |entities| {
            group_entities(&entities)
                .into_iter()
                .map(|(category, entities)| EntityGroupView { category, entities })
                .collect()
        }),
        faults: panel_to_view(snapshot.faults, |faults| faults.into_iter().map(fault_to_row).collect()),
        applications: panel_to_view(snapshot.applications, |apps| {
            apps.into_iter().map(application_to_row).collect()
        }),
        alerts: panel_to_view(snapshot.alerts, |alerts| {
            alerts
                .into_iter()
                .map(|alert| {
                    let view = recommendations.get(&alert.id).cloned();
                    alert_to_row(alert, view)
                })
                .collect()
        }),
    }
}

fn status_to_view(snapshot: TelemetrySnapshot) -> StatusView {
    let overview = StatusOverview::from_snapshot(&snapshot);
    StatusView {
        is_connected: overview.is_connected,
        connection_label: overview.connection_label,
        last_update: snapshot.last_update,
        cards: overview.cards,
    }
}

fn metrics_to_view(metrics: VehicleMetrics) -> Vec<MetricSeriesView> {
    [("cpu", metrics.cpu), ("memory", metrics.memory), ("network", metrics.network)]
        .into_iter()
        .map(|(name, samples)| MetricSeriesView {
            name,
            latest: VehicleMetrics::latest(&samples),
            samples,
        })
        .collect()
}

fn fault_to_row(fault: FaultRecord) -> FaultRow {
    FaultRow {
        badge: fault.status.badge(),
        entity: fault.entity,
        code: fault.code,
        description: fault.description,
        status: fault.status,
    }
}

fn application_to_row(app: ApplicationRecord) -> ApplicationRow {
    ApplicationRow {
        badge: app.status.badge(),
        action: app.status.action(),
        name: app.name,
        tag: app.tag,
        creation_date: app.creation_date,
        size: app.size,
        status: app.status,
    }
}

fn alert_to_row(alert: AlertRecord, view: Option<RecommendationView>) -> AlertRow {
    let view = view.unwrap_or(RecommendationView {
        expanded: false,
        loading: false,
        recommendation: None,
    });
    AlertRow {
        id: alert.id,
        severity: alert.severity,
        system: alert.system,
        message: alert.message,
        timestamp: alert.timestamp,
        expanded: view.expanded,
        loading: view.loading,
        // Hidden while collapsed even when cached
        recommendation: view.recommendation.filter(|_| view.expanded),
    }
}

pub fn fleet_to_view(state: PanelState<(), FleetSummary>) -> PanelView<FleetSummary> {
    panel_to_view(state, |summary| summary)
}

pub fn prediction_to_view(prediction: &BatteryPrediction, now: DateTime<Utc>) -> PredictionView {
    PredictionView {
        grade: health_grade(prediction.current_health),
        curve: prediction.forecast(now, &mut rand::rng()),
        prediction: prediction.clone(),
    }
}
