// HTTP request handlers
use crate::application::diagnostics_service::DiagnosticsError;
use crate::presentation::app_state::AppState;
use crate::presentation::event_stream::notification_stream;
use crate::presentation::view_models::{diagnostics_to_view, fleet_to_view, prediction_to_view};
use crate::domain::vehicle::StatusFilter;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct VehiclesQuery {
    pub status: Option<StatusFilter>,
}

#[derive(Deserialize)]
pub struct SearchInput {
    pub query: String,
}

#[derive(Deserialize)]
pub struct SelectRequest {
    pub vin: String,
}

#[derive(Deserialize)]
pub struct StatusFilterRequest {
    pub status: StatusFilter,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for DiagnosticsError {
    fn into_response(self) -> Response {
        let status = match self {
            DiagnosticsError::NoVehicleSelected => StatusCode::CONFLICT,
            DiagnosticsError::UnknownAlert(_) | DiagnosticsError::UnknownApplication(_) => StatusCode::NOT_FOUND,
            DiagnosticsError::NoAction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        error_response(status, self.to_string())
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn fleet_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(fleet_to_view(state.fleet_service.summary()))
}

/// Catalog listing, optionally narrowed to one health status
pub async fn list_vehicles(
    Query(query): Query<VehiclesQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(state.search.browse(query.status.unwrap_or_default()))
}

pub async fn search_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.search.state())
}

pub async fn search_input(State(state): State<Arc<AppState>>, Json(input): Json<SearchInput>) -> impl IntoResponse {
    state.search.input(&input.query).await;
    Json(state.search.state())
}

pub async fn search_filter(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StatusFilterRequest>,
) -> impl IntoResponse {
    state.search.set_status_filter(request.status).await;
    Json(state.search.state())
}

pub async fn search_focus(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.search.focus().await;
    Json(state.search.state())
}

pub async fn search_blur(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.search.blur().await;
    Json(state.search.state())
}

pub async fn search_select(State(state): State<Arc<AppState>>, Json(request): Json<SelectRequest>) -> Response {
    let vin = request.vin.trim();
    if vin.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "vin must not be empty");
    }
    state.search.select(vin).await;
    Json(state.search.state()).into_response()
}

pub async fn get_diagnostics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(diagnostics_to_view(state.diagnostics_service.snapshot().await))
}

pub async fn refresh_diagnostics(State(state): State<Arc<AppState>>) -> Result<StatusCode, DiagnosticsError> {
    state.diagnostics_service.refresh().await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn clear_diagnostics(State(state): State<Arc<AppState>>) -> StatusCode {
    state.diagnostics_service.clear().await;
    StatusCode::NO_CONTENT
}

pub async fn toggle_alert(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, DiagnosticsError> {
    let view = state.diagnostics_service.toggle_alert(&id).await?;
    Ok(Json(view))
}

pub async fn application_action(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, DiagnosticsError> {
    let action = state.diagnostics_service.application_action(&name).await?;
    Ok(Json(json!({ "application": name, "action": action })))
}

pub async fn get_chat(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.chat.transcript().await)
}

pub async fn send_chat(State(state): State<Arc<AppState>>, Json(request): Json<ChatRequest>) -> impl IntoResponse {
    state.chat.send(&request.message).await;
    Json(state.chat.transcript().await)
}

pub async fn battery_prediction(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(prediction_to_view(&state.prediction, Utc::now()))
}

pub async fn list_notifications(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.notifier.active().await)
}

pub async fn dismiss_notification(Path(id): Path<Uuid>, State(state): State<Arc<AppState>>) -> Response {
    if state.notifier.dismiss(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, format!("no active notification {id}"))
    }
}

pub async fn notification_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    notification_stream(&state.notifier)
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/fleet/summary", get(fleet_summary))
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/search", get(search_state))
        .route("/api/search/input", post(search_input))
        .route("/api/search/filter", post(search_filter))
        .route("/api/search/focus", post(search_focus))
        .route("/api/search/blur", post(search_blur))
        .route("/api/search/select", post(search_select))
        .route(
            "/api/diagnostics",
            get(get_diagnostics).delete(clear_diagnostics),
        )
        .route("/api/diagnostics/refresh", post(refresh_diagnostics))
        .route("/api/alerts/:id/toggle", post(toggle_alert))
        .route("/api/applications/:name/action", post(application_action))
        .route("/api/chat", get(get_chat).post(send_chat))
        .route("/api/predictions/battery", get(battery_prediction))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/stream", get(notification_events))
        .route("/api/notifications/:id", delete(dismiss_notification))
        .with_state(state)
}
