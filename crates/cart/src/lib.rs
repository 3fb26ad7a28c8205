//! Cart reconciliation between the session, the remote cart and the UI.
//!
//! [`CartActions`] are the server actions: they read the cart id from the
//! request's session, call the remote cart service and settle every outcome
//! into a structured result. [`OptimisticCart`] is the client-side half that
//! projects pending actions over the last confirmed snapshot.

use storefront_session::SessionError;
use thiserror::Error;

pub mod actions;
pub mod config;
pub mod events;
pub mod optimistic;
pub mod phase;
pub mod selection;


pub use actions::{AddToCartForm, AddToCartResult, CartActions, CheckoutOutcome};
pub use config::{CartConfig, RollbackPolicy};
pub use events::{CartEvent, CartEvents, CartSubscription};
pub use optimistic::{Action, OptimisticCart, PendingId};
pub use phase::CartPhase;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Cart does not match the current session")]
    SessionMismatch,
    #[error("Quantity must be between 1 and {max}")]
    QuantityOutOfRange { quantity: u32, max: u32 },
    #[error(transparent)]
    Session(#[from] SessionError),
}
