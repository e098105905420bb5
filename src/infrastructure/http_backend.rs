// REST vehicle backend implementation
use crate::application::vehicle_backend::{
    BackendError, BackendResult, RecommendationRequest, SearchHit, VehicleBackend,
};
use crate::domain::diagnostics::{AlertRecord, ApplicationRecord, FaultRecord, VehicleEntity};
use crate::domain::fleet::FleetSummaryReport;
use crate::domain::telemetry::{DataParameter, StatusReading, VehicleMetrics};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

// List endpoints wrap their rows in an object; a missing or null list is empty

#[derive(Debug, Deserialize)]
struct ParametersEnvelope {
    #[serde(default)]
    parameters: Option<Vec<DataParameter>>,
}

#[derive(Debug, Deserialize)]
struct EntitiesEnvelope {
    #[serde(default)]
    entities: Option<Vec<VehicleEntity>>,
}

#[derive(Debug, Deserialize)]
struct FaultsEnvelope {
    #[serde(default)]
    faults: Option<Vec<FaultRecord>>,
}

#[derive(Debug, Deserialize)]
struct ApplicationsEnvelope {
    #[serde(default)]
    applications: Option<Vec<ApplicationRecord>>,
}

#[derive(Debug, Deserialize)]
struct AlertsEnvelope {
    #[serde(default)]
    alerts: Option<Vec<AlertRecord>>,
}

#[derive(Debug, Deserialize)]
struct RecommendationEnvelope {
    recommendation: String,
}

/// Search answers with bare VIN strings or with `{vin, label}` objects
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchEntry {
    Vin(String),
    Hit(SearchHit),
}

impl From<SearchEntry> for SearchHit {
    fn from(entry: SearchEntry) -> Self {
        match entry {
            SearchEntry::Vin(vin) => SearchHit { vin, label: None },
            SearchEntry::Hit(hit) => hit,
        }
    }
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn vehicle_url(&self, resource: &str, vin: &str) -> String {
        format!("{}/vehicle/{}?vin={}", self.base_url, resource, urlencoding::encode(vin))
    }

    async fn read<T: DeserializeOwned>(&self, url: String, response: reqwest::Response) -> BackendResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(format!("{url}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> BackendResult<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        self.read(url, response).await
    }
}

#[async_trait]
impl VehicleBackend for HttpBackend {
    async fn vehicle_status(&self, vin: &str) -> BackendResult<StatusReading> {
        self.get(self.vehicle_url("status", vin)).await
    }

    async fn data_parameters(&self, vin: &str) -> BackendResult<Vec<DataParameter>> {
        let envelope: ParametersEnvelope = self.get(self.vehicle_url("data-parameters", vin)).await?;
        Ok(envelope.parameters.unwrap_or_default())
    }

    async fn metrics(&self, vin: &str) -> BackendResult<VehicleMetrics> {
        self.get(self.vehicle_url("metrics", vin)).await
    }

    async fn entities(&self, vin: &str) -> BackendResult<Vec<VehicleEntity>> {
        let envelope: EntitiesEnvelope = self.get(self.vehicle_url("entities", vin)).await?;
        Ok(envelope.entities.unwrap_or_default())
    }

    async fn faults(&self, vin: &str) -> BackendResult<Vec<FaultRecord>> {
        let envelope: FaultsEnvelope = self.get(self.vehicle_url("faults", vin)).await?;
        Ok(envelope.faults.unwrap_or_default())
    }

    async fn applications(&self, vin: &str) -> BackendResult<Vec<ApplicationRecord>> {
        let envelope: ApplicationsEnvelope = self.get(self.vehicle_url("applications", vin)).await?;
        Ok(envelope.applications.unwrap_or_default())
    }

    async fn alerts(&self, vin: &str) -> BackendResult<Vec<AlertRecord>> {
        let envelope: AlertsEnvelope = self.get(self.vehicle_url("alerts", vin)).await?;
        Ok(envelope.alerts.unwrap_or_default())
    }

    async fn recommendation(&self, request: &RecommendationRequest) -> BackendResult<String> {
        let url = format!("{}/ai/recommendation", self.base_url);
        tracing::debug!("POST {} for alert {}", url, request.alert_id);
        let response = self.client.post(&url).json(request).send().await?;
        let envelope: RecommendationEnvelope = self.read(url, response).await?;
        Ok(envelope.recommendation)
    }

    async fn fleet_summary(&self) -> BackendResult<FleetSummaryReport> {
        self.get(format!("{}/fleet/summary", self.base_url)).await
    }

    async fn search_vehicles(&self, query: &str) -> BackendResult<Vec<SearchHit>> {
        let url = format!("{}/vehicles/search?q={}", self.base_url, urlencoding::encode(query));
        let entries: Vec<SearchEntry> = self.get(url).await?;
        Ok(entries.into_iter().map(SearchHit::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostics::{AlertSeverity, EntityCategory, FaultStatus};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VIN: &str = "1HGCM82633A004352";

    async fn backend(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_status_decodes_nested_reading() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vehicle/status"))
            .and(query_param("vin", VIN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "battery": {"level": 64.0, "temperature": 30.5},
                "engine": {"temperature": 204.0, "oilPressure": 39.0},
                "brakes": {"fluidLevel": 72.0},
                "tires": {"pressure": 29.5}
            })))
            .mount(&server)
            .await;

        let reading = backend(&server).await.vehicle_status(VIN).await.unwrap();
        assert_eq!(reading.battery.level, 64.0);
        assert_eq!(reading.engine.oil_pressure, 39.0);
        assert_eq!(reading.brakes.fluid_level, 72.0);
    }

    #[tokio::test]
    async fn test_missing_or_null_lists_are_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vehicle/faults"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vehicle/alerts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"alerts": null})))
            .mount(&server)
            .await;

        let backend = backend(&server).await;
        assert!(backend.faults(VIN).await.unwrap().is_empty());
        assert!(backend.alerts(VIN).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_faults_with_unknown_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vehicle/faults"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "faults": [
                    {"entity": "Engine", "code": "P0301", "description": "Cylinder 1 misfire", "status": "Active"},
                    {"entity": "HVAC", "code": "B1001", "description": "Blend door stuck", "status": "Investigating"}
                ]
            })))
            .mount(&server)
            .await;

        let faults = backend(&server).await.faults(VIN).await.unwrap();
        assert_eq!(faults[0].status, FaultStatus::Active);
        assert_eq!(faults[1].status, FaultStatus::Unknown);
    }

    #[tokio::test]
    async fn test_unexpected_row_values_still_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vehicle/alerts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "alerts": [
                    {"id": "1", "type": "healthy", "system": "Battery System",
                     "message": "All cells balanced", "timestamp": "2024-01-15 14:30:00"},
                    {"id": "2", "type": "warning", "system": "Tires",
                     "message": "Low pressure", "timestamp": "2024-01-15 14:25:00"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vehicle/entities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entities": [
                    {"id": "1", "name": "Engine Control", "category": "Components", "status": "Active"},
                    {"id": "2", "name": "OTA Updater", "category": "Services", "status": "Idle"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vehicle/data-parameters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parameters": [{"name": "Speed", "entity": "Powertrain", "value": 65, "unit": "mph"}]
            })))
            .mount(&server)
            .await;

        let backend = backend(&server).await;

        let alerts = backend.alerts(VIN).await.unwrap();
        assert_eq!(alerts[0].severity, AlertSeverity::Unknown);
        assert_eq!(alerts[1].severity, AlertSeverity::Warning);

        let entities = backend.entities(VIN).await.unwrap();
        assert_eq!(entities[0].category, EntityCategory::Components);
        assert_eq!(entities[1].category, EntityCategory::Unknown);

        let params = backend.data_parameters(VIN).await.unwrap();
        assert_eq!(params[0].value, "65");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vehicle/applications"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = backend(&server).await.applications(VIN).await.unwrap_err();
        match err {
            BackendError::Status { status, url, body } => {
                assert_eq!(status, 503);
                assert!(url.ends_with(&format!("/vehicle/applications?vin={VIN}")));
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vehicle/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = backend(&server).await.metrics(VIN).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_search_accepts_strings_and_objects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vehicles/search"))
            .and(query_param("q", "1HG"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["1HGCM82633A004352"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vehicles/search"))
            .and(query_param("q", "ford focus"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"vin": "1FADP3F22EL123456", "label": "Ford Focus · 2014"}
            ])))
            .mount(&server)
            .await;

        let backend = backend(&server).await;
        let bare = backend.search_vehicles("1HG").await.unwrap();
        assert_eq!(bare, vec![SearchHit { vin: VIN.to_string(), label: None }]);

        let labelled = backend.search_vehicles("ford focus").await.unwrap();
        assert_eq!(labelled[0].label.as_deref(), Some("Ford Focus · 2014"));
    }

    #[tokio::test]
    async fn test_recommendation_posts_alert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai/recommendation"))
            .and(body_json(json!({"alertId": "3", "message": "Brake pad wear", "vin": VIN})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recommendation": "Replace front brake pads within 100 miles."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = RecommendationRequest {
            alert_id: "3".to_string(),
            message: "Brake pad wear".to_string(),
            vin: VIN.to_string(),
        };
        let text = backend(&server).await.recommendation(&request).await.unwrap();
        assert_eq!(text, "Replace front brake pads within 100 miles.");
    }

    #[tokio::test]
    async fn test_fleet_summary_partial_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fleet/summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 42, "healthy": 30})))
            .mount(&server)
            .await;

        let report = backend(&server).await.fleet_summary().await.unwrap();
        assert_eq!(report.total, Some(42));
        assert_eq!(report.critical, None);
    }
}
