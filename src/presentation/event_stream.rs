// Server-sent event streaming of notifications
use crate::application::notifications::Notifier;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

/// Stream every notification raised from now on as a `notification` event
pub fn notification_stream(
    notifier: &Notifier,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    let mut rx = notifier.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(notification) => match Event::default().event("notification").json_data(&notification) {
                    Ok(event) => yield Ok(event),
                    Err(e) => tracing::warn!("could not encode notification {}: {}", notification.id, e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("notification stream fell behind, {} skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
