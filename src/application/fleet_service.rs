// Fleet service - Use case for the fleet summary counters
use crate::application::notifications::Notifier;
use crate::application::polling::{FetchFn, PanelState, PollingSource, constant, fetcher};
use crate::application::vehicle_backend::VehicleBackend;
use crate::domain::fleet::FleetSummary;
use crate::domain::vehicle::VehicleCatalog;
use std::sync::Arc;
use std::time::Duration;

pub struct FleetService {
    summary: PollingSource<(), FleetSummary>,
}

impl FleetService {
    pub fn new(
        backend: Arc<dyn VehicleBackend>,
        catalog: &VehicleCatalog,
        interval: Duration,
        notifier: Notifier,
    ) -> Self {
        let fetch: FetchFn<(), FleetSummary> = fetcher(move |_: ()| {
            let backend = Arc::clone(&backend);
            async move { backend.fleet_summary().await.map(FleetSummary::from) }
        });

        Self {
            summary: PollingSource::new(
                "fleet",
                "Fleet summary unavailable",
                interval,
                fetch,
                constant(FleetSummary::from_catalog(catalog)),
                notifier,
            ),
        }
    }

    /// Begin polling; the fleet panel stays active for the life of the service
    pub async fn start(&self) {
        self.summary.activate(()).await;
    }

    pub fn summary(&self) -> PanelState<(), FleetSummary> {
        self.summary.state()
    }
}
