// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::chat_service::ChatSession;
use crate::application::diagnostics_service::DiagnosticsService;
use crate::application::fleet_service::FleetService;
use crate::application::notifications::Notifier;
use crate::application::search::VinSearch;
use crate::application::vehicle_backend::VehicleBackend;
use crate::domain::prediction::BatteryPrediction;
use crate::infrastructure::config::{BackendMode, load_config};
use crate::infrastructure::http_backend::HttpBackend;
use crate::infrastructure::simulated_backend::SimulatedBackend;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config()?;
    let catalog = Arc::new(config.catalog());

    // Create backend (infrastructure layer)
    let backend: Arc<dyn VehicleBackend> = match config.backend.mode {
        BackendMode::Http => {
            tracing::info!("using vehicle backend at {}", config.backend.base_url);
            Arc::new(HttpBackend::new(&config.backend.base_url, config.backend_timeout())?)
        }
        BackendMode::Simulated => {
            tracing::info!("using simulated vehicle backend");
            Arc::new(SimulatedBackend::new(catalog.clone()))
        }
    };

    // Create services (application layer)
    let notifier = Notifier::new();
    let fleet_service = FleetService::new(backend.clone(), &catalog, config.fleet_interval(), notifier.clone());
    let search = VinSearch::new(backend.clone(), catalog.clone(), config.search_settings(), notifier.clone());
    let diagnostics_service = DiagnosticsService::new(backend, config.vehicle_interval(), notifier.clone());

    // Create application state
    let state = Arc::new(AppState {
        fleet_service,
        search,
        diagnostics_service,
        chat: ChatSession::new(config.chat_delay()),
        notifier,
        prediction: BatteryPrediction::default(),
    });
    state.fleet_service.start().await;
    state.follow_selection();

    // Build router (presentation layer)
    let router = routes(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting fleet-health service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
