// Diagnostics service - Use case for the per-vehicle panels of the selected VIN
use crate::application::fallback;
use crate::application::notifications::Notifier;
use crate::application::polling::{FallbackFn, FetchFn, PanelState, PollingSource, fetcher};
use crate::application::recommendations::{AlertRecommendations, RecommendationView};
use crate::application::vehicle_backend::{BackendResult, VehicleBackend};
use crate::domain::diagnostics::{AlertRecord, ApplicationAction, ApplicationRecord, FaultRecord, VehicleEntity};
use crate::domain::telemetry::{DataParameter, TelemetrySnapshot, VehicleMetrics};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug, PartialEq)]
pub enum DiagnosticsError {
    #[error("no vehicle selected")]
    NoVehicleSelected,

    #[error("unknown alert {0}")]
    UnknownAlert(String),

    #[error("unknown application {0}")]
    UnknownApplication(String),

    #[error("application {0} offers no action in its current status")]
    NoAction(String),
}

type Panel<T> = PollingSource<String, T>;

/// Everything the diagnostics view shows for one vehicle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsSnapshot {
    pub vin: Option<String>,
    pub status: PanelState<String, TelemetrySnapshot>,
    pub parameters: PanelState<String, Vec<DataParameter>>,
    pub metrics: PanelState<String, VehicleMetrics>,
    pub entities: PanelState<String, Vec<VehicleEntity>>,
    pub faults: PanelState<String, Vec<FaultRecord>>,
    pub applications: PanelState<String, Vec<ApplicationRecord>>,
    pub alerts: PanelState<String, Vec<AlertRecord>>,
    pub recommendations: BTreeMap<String, RecommendationView>,
}

fn vin_fetch<T, F, Fut>(backend: &Arc<dyn VehicleBackend>, call: F) -> FetchFn<String, T>
where
    T: Send + 'static,
    F: Fn(Arc<dyn VehicleBackend>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = BackendResult<T>> + Send + 'static,
{
    let backend = Arc::clone(backend);
    fetcher(move |vin: String| call(Arc::clone(&backend), vin))
}

pub struct DiagnosticsService {
    status: Panel<TelemetrySnapshot>,
    parameters: Panel<Vec<DataParameter>>,
    metrics: Panel<VehicleMetrics>,
    entities: Panel<Vec<VehicleEntity>>,
    faults: Panel<Vec<FaultRecord>>,
    applications: Panel<Vec<ApplicationRecord>>,
    alerts: Panel<Vec<AlertRecord>>,
    recommendations: AlertRecommendations,
    notifier: Notifier,
    selected: Mutex<Option<String>>,
}

impl DiagnosticsService {
    pub fn new(backend: Arc<dyn VehicleBackend>, interval: Duration, notifier: Notifier) -> Self {
        fn panel<T>(
            name: &'static str,
            title: &str,
            interval: Duration,
            fetch: FetchFn<String, T>,
            fallback: FallbackFn<T>,
            notifier: &Notifier,
        ) -> Panel<T>
        where
            T: Clone + Send + Sync + 'static,
        {
            PollingSource::new(name, title, interval, fetch, fallback, notifier.clone())
        }

        let status: Panel<TelemetrySnapshot> = panel(
            "status",
            "Failed to fetch vehicle status",
            interval,
            vin_fetch(&backend, |b, vin| async move {
                b.vehicle_status(&vin)
                    .await
                    .map(|reading| TelemetrySnapshot::from_reading(&reading, Utc::now()))
            }),
            Arc::new(TelemetrySnapshot::disconnected),
            &notifier,
        );
        let parameters: Panel<Vec<DataParameter>> = panel(
            "parameters",
            "Failed to fetch data parameters",
            interval,
            vin_fetch(&backend, |b, vin| async move { b.data_parameters(&vin).await }),
            Arc::new(fallback::data_parameters),
            &notifier,
        );
        let metrics: Panel<VehicleMetrics> = panel(
            "metrics",
            "Failed to fetch live metrics",
            interval,
            vin_fetch(&backend, |b, vin| async move { b.metrics(&vin).await }),
            Arc::new(fallback::metrics),
            &notifier,
        );
        let entities: Panel<Vec<VehicleEntity>> = panel(
            "entities",
            "Failed to fetch vehicle entities",
            interval,
            vin_fetch(&backend, |b, vin| async move { b.entities(&vin).await }),
            Arc::new(fallback::entities),
            &notifier,
        );
        let faults: Panel<Vec<FaultRecord>> = panel(
            "faults",
            "Failed to fetch vehicle faults",
            interval,
            vin_fetch(&backend, |b, vin| async move { b.faults(&vin).await }),
            Arc::new(fallback::faults),
            &notifier,
        );
        let applications: Panel<Vec<ApplicationRecord>> = panel(
            "applications",
            "Failed to fetch running applications",
            interval,
            vin_fetch(&backend, |b, vin| async move { b.applications(&vin).await }),
            Arc::new(fallback::applications),
            &notifier,
        );
        let alerts: Panel<Vec<AlertRecord>> = panel(
            "alerts",
            "Failed to fetch vehicle alerts",
            interval,
            vin_fetch(&backend, |b, vin| async move { b.alerts(&vin).await }),
            Arc::new(fallback::alerts),
            &notifier,
        );

        Self {
            status,
            parameters,
            metrics,
            entities,
            faults,
            applications,
            alerts,
            recommendations: AlertRecommendations::new(backend),
            notifier,
            selected: Mutex::new(None),
        }
    }

    /// Point every panel at `vin`. Reselecting the current VIN changes nothing.
    pub async fn select_vin(&self, vin: &str) {
        let mut selected = self.selected.lock().await;
        if selected.as_deref() == Some(vin) {
            return;
        }
        tracing::info!("loading diagnostics for {}", vin);
        self.recommendations.reset(vin).await;

        let key = vin.to_string();
        tokio::join!(
            self.status.activate(key.clone()),
            self.parameters.activate(key.clone()),
            self.metrics.activate(key.clone()),
            self.entities.activate(key.clone()),
            self.faults.activate(key.clone()),
            self.applications.activate(key.clone()),
            self.alerts.activate(key.clone()),
        );
        *selected = Some(key);
    }

    /// Stop polling and forget the selected vehicle
    pub async fn clear(&self) {
        let mut selected = self.selected.lock().await;
        tokio::join!(
            self.status.deactivate(),
            self.parameters.deactivate(),
            self.metrics.deactivate(),
            self.entities.deactivate(),
            self.faults.deactivate(),
            self.applications.deactivate(),
            self.alerts.deactivate(),
        );
        self.recommendations.reset("").await;
        *selected = None;
    }

    /// Fetch every panel now, on top of the regular schedule
    pub async fn refresh(&self) -> Result<(), DiagnosticsError> {
        let selected = self.selected.lock().await;
        if selected.is_none() {
            return Err(DiagnosticsError::NoVehicleSelected);
        }
        tokio::join!(
            self.status.refresh(),
            self.parameters.refresh(),
            self.metrics.refresh(),
            self.entities.refresh(),
            self.faults.refresh(),
            self.applications.refresh(),
            self.alerts.refresh(),
        );
        Ok(())
    }

    pub async fn selected_vin(&self) -> Option<String> {
        self.selected.lock().await.clone()
    }

    pub async fn snapshot(&self) -> DiagnosticsSnapshot {
        let alerts = self.alerts.state();
        let mut recommendations = BTreeMap::new();
        for alert in alerts.data.iter().flatten() {
            recommendations.insert(alert.id.clone(), self.recommendations.view(&alert.id).await);
        }

        DiagnosticsSnapshot {
            vin: self.selected_vin().await,
            status: self.status.state(),
            parameters: self.parameters.state(),
            metrics: self.metrics.state(),
            entities: self.entities.state(),
            faults: self.faults.state(),
            applications: self.applications.state(),
            alerts,
            recommendations,
        }
    }

    /// Expand or collapse one alert of the alerts panel
    pub async fn toggle_alert(&self, alert_id: &str) -> Result<RecommendationView, DiagnosticsError> {
        if self.selected.lock().await.is_none() {
            return Err(DiagnosticsError::NoVehicleSelected);
        }
        let alert = self
            .alerts
            .state()
            .data
            .and_then(|alerts| alerts.into_iter().find(|a| a.id == alert_id))
            .ok_or_else(|| DiagnosticsError::UnknownAlert(alert_id.to_string()))?;

        self.recommendations.toggle(&alert).await;
        Ok(self.recommendations.view(alert_id).await)
    }

    /// Acknowledge an application control. Nothing is sent to the vehicle.
    pub async fn application_action(&self, name: &str) -> Result<ApplicationAction, DiagnosticsError> {
        let app = self
            .applications
            .state()
            .data
            .and_then(|apps| apps.into_iter().find(|a| a.name == name))
            .ok_or_else(|| DiagnosticsError::UnknownApplication(name.to_string()))?;
        let action = app
            .status
            .action()
            .ok_or_else(|| DiagnosticsError::NoAction(name.to_string()))?;

        self.notifier
            .success(format!("{} action triggered for {}", action, app.name))
            .await;
        Ok(action)
    }
}
