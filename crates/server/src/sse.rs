use core::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Extension;
use futures_util::stream::Stream;
use storefront_primitives::errors::NotFoundError;
use storefront_session::Session;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::service::{ApiError, AppState};

const EVENT_NAME: &str = "cart";

/// Streams the events of the session's cart.
pub async fn cart_events_handler(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Some(cart_id) = session.cart_id() else {
        return Err(ApiError::from_error(&NotFoundError::new("No cart in session")));
    };

    let mut subscription = state.actions.events().subscribe(cart_id);
    let (sender, receiver) = mpsc::channel::<Event>(32);

    debug!(cart_id = %subscription.cart_id(), "Cart event listener connected");

    drop(tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                () = sender.closed() => break,
                event = subscription.recv() => event,
            };
            let Some(event) = event else {
                break;
            };

            let event = match Event::default().event(EVENT_NAME).json_data(&event) {
                Ok(event) => event,
                Err(err) => {
                    error!(%err, "Failed to encode cart event");
                    continue;
                }
            };

            if sender.send(event).await.is_err() {
                break;
            }
        }

        debug!(cart_id = %subscription.cart_id(), "Cart event listener disconnected");
    }));

    Ok(Sse::new(ReceiverStream::new(receiver).map(Ok)).keep_alive(KeepAlive::default()))
}
