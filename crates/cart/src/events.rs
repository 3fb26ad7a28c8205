//! Cart notifications for listeners outside the request that caused them,
//! e.g. opening the cart drawer after a successful add.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartEvent {
    #[serde(rename_all = "camelCase")]
    SetOpen { cart_id: String, open: bool },
    #[serde(rename_all = "camelCase")]
    Changed { cart_id: String },
}

impl CartEvent {
    #[must_use]
    pub fn cart_id(&self) -> &str {
        match self {
            Self::SetOpen { cart_id, .. } | Self::Changed { cart_id } => cart_id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CartEvents {
    sender: broadcast::Sender<CartEvent>,
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl CartEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publishes an event, returning the number of listeners it reached.
    pub fn publish(&self, event: CartEvent) -> usize {
        debug!(?event, "Publishing cart event");

        // no listeners is not an error
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listeners(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Subscribes to the events of a single cart.
    #[must_use]
    pub fn subscribe(&self, cart_id: impl Into<String>) -> CartSubscription {
        CartSubscription {
            cart_id: cart_id.into(),
            receiver: self.sender.subscribe(),
        }
    }
}

#[derive(Debug)]
pub struct CartSubscription {
    cart_id: String,
    receiver: broadcast::Receiver<CartEvent>,
}

impl CartSubscription {
    #[must_use]
    pub fn cart_id(&self) -> &str {
        &self.cart_id
    }

    /// Waits for the next event of the subscribed cart, `None` once the
    /// channel is closed.
    pub async fn recv(&mut self) -> Option<CartEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.cart_id() == self.cart_id => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(cart_id = %self.cart_id, skipped, "Cart event listener lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
