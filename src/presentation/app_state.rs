// Application state for HTTP handlers
use crate::application::chat_service::ChatSession;
use crate::application::diagnostics_service::DiagnosticsService;
use crate::application::fleet_service::FleetService;
use crate::application::notifications::Notifier;
use crate::application::search::VinSearch;
use crate::domain::prediction::BatteryPrediction;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct AppState {
    pub fleet_service: FleetService,
    pub search: VinSearch,
    pub diagnostics_service: DiagnosticsService,
    pub chat: ChatSession,
    pub notifier: Notifier,
    pub prediction: BatteryPrediction,
}

impl AppState {
    /// Load the diagnostics panels for every VIN picked in the search box
    pub fn follow_selection(self: &Arc<Self>) -> JoinHandle<()> {
        let mut selection = self.search.subscribe_selection();
        let state = Arc::clone(self);
        tokio::spawn(async move {
            while selection.changed().await.is_ok() {
                let vin = selection.borrow_and_update().clone();
                if let Some(vin) = vin {
                    state.diagnostics_service.select_vin(&vin).await;
                }
            }
        })
    }
}
