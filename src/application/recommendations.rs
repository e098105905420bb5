// Alert recommendations - fetched on first expansion, cached per alert id
use crate::application::fallback;
use crate::application::vehicle_backend::{RecommendationRequest, VehicleBackend};
use crate::domain::diagnostics::AlertRecord;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationView {
    pub expanded: bool,
    pub loading: bool,
    pub recommendation: Option<String>,
}

#[derive(Default)]
struct Expansions {
    vin: String,
    generation: u64,
    expanded: HashSet<String>,
    in_flight: HashSet<String>,
    cache: HashMap<String, String>,
}

/// Expand/collapse state for the alert list of the selected vehicle
#[derive(Clone)]
pub struct AlertRecommendations {
    backend: Arc<dyn VehicleBackend>,
    inner: Arc<Mutex<Expansions>>,
}

impl AlertRecommendations {
    pub fn new(backend: Arc<dyn VehicleBackend>) -> Self {
        Self {
            backend,
            inner: Arc::new(Mutex::new(Expansions::default())),
        }
    }

    /// Start over for a newly selected vehicle
    pub async fn reset(&self, vin: &str) {
        let mut inner = self.inner.lock().await;
        inner.vin = vin.to_string();
        inner.generation += 1;
        inner.expanded.clear();
        inner.in_flight.clear();
        inner.cache.clear();
    }

    /// Flip an alert open or closed, returning whether it is now expanded
    pub async fn toggle(&self, alert: &AlertRecord) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.expanded.remove(&alert.id) {
            return false;
        }
        inner.expanded.insert(alert.id.clone());

        if inner.cache.contains_key(&alert.id) || inner.in_flight.contains(&alert.id) {
            return true;
        }
        inner.in_flight.insert(alert.id.clone());

        let request = RecommendationRequest {
            alert_id: alert.id.clone(),
            message: alert.message.clone(),
            vin: inner.vin.clone(),
        };
        let generation = inner.generation;
        let backend = Arc::clone(&self.backend);
        let shared = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let text = match backend.recommendation(&request).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("recommendation for alert {} unavailable: {}", request.alert_id, e);
                    fallback::RECOMMENDATION.to_string()
                }
            };

            let mut inner = shared.lock().await;
            if inner.generation == generation {
                inner.in_flight.remove(&request.alert_id);
                inner.cache.insert(request.alert_id, text);
            }
        });

        true
    }

    pub async fn view(&self, alert_id: &str) -> RecommendationView {
        let inner = self.inner.lock().await;
        let expanded = inner.expanded.contains(alert_id);
        RecommendationView {
            expanded,
            loading: expanded && inner.in_flight.contains(alert_id),
            recommendation: inner.cache.get(alert_id).cloned(),
        }
    }
}
