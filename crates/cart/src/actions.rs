use serde::{Deserialize, Serialize};
use storefront_commerce::{CartActionResult, CartRemote, CartRemoteError, CommerceApi};
use storefront_primitives::cart::{Cart, CartLineInput, CartRef};
use storefront_session::{Session, SessionKey};
use tracing::{error, info, warn};

use crate::config::CartConfig;
use crate::events::{CartEvent, CartEvents};
use crate::CartError;

const INVALID_VARIANT: &str = "Invalid variant ID";
const ADD_FAILED: &str = "Failed to add item to cart";
const REMOVE_FAILED: &str = "Failed to remove item from cart.";
const UPDATE_FAILED: &str = "Failed to update item quantity.";
const CHECKOUT_FAILED: &str = "Failed to start checkout.";

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    #[serde(default)]
    pub variant_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AddToCartResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddToCartResult {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CheckoutOutcome {
    Redirect(String),
    Failed(CartActionResult),
}

/// Server-side cart actions, keyed by the cart id of the request's session.
#[derive(Debug)]
pub struct CartActions<A> {
    remote: CartRemote<A>,
    events: CartEvents,
    config: CartConfig,
}

impl<A: CommerceApi> CartActions<A> {
    pub const fn new(api: A, events: CartEvents, config: CartConfig) -> Self {
        Self {
            remote: CartRemote::new(api),
            events,
            config,
        }
    }

    pub const fn remote(&self) -> &CartRemote<A> {
        &self.remote
    }

    pub const fn events(&self) -> &CartEvents {
        &self.events
    }

    pub const fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Adds one unit of a variant, creating the cart on first use.
    ///
    /// Remote failures leave the session untouched and come back as a failed
    /// result. Only session misuse is returned as an error.
    pub async fn add_to_cart(
        &self,
        session: &Session,
        form: &AddToCartForm,
    ) -> Result<AddToCartResult, CartError> {
        let Some(variant_id) = form
            .variant_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        else {
            return Ok(AddToCartResult::failed(INVALID_VARIANT));
        };

        let lines = [CartLineInput::single(variant_id)];

        let outcome = match session.cart_id() {
            Some(cart_id) => self.remote.add_lines(&cart_id, &lines).await,
            None => self.remote.create_cart(&lines).await,
        };

        let cart = match outcome {
            Ok(cart) => cart,
            Err(err @ CartRemoteError::CartMismatch { .. }) => {
                error!(%err, %variant_id, "Refusing to adopt a foreign cart");
                return Ok(AddToCartResult::failed(err.to_string()));
            }
            Err(err) => {
                error!(%err, %variant_id, "Error adding to cart");
                return Ok(AddToCartResult::failed(ADD_FAILED));
            }
        };

        session.set(SessionKey::CartId, cart.id.clone())?;

        info!(cart_id = %cart.id, %variant_id, "Added item to cart");

        let _ = self.events.publish(CartEvent::SetOpen {
            cart_id: cart.id.clone(),
            open: true,
        });
        let _ = self.events.publish(CartEvent::Changed { cart_id: cart.id });

        Ok(AddToCartResult::ok())
    }

    pub async fn remove_from_cart(
        &self,
        session: &Session,
        cart_id: &str,
        line_id: &str,
    ) -> CartActionResult {
        if let Err(err) = guard(session, cart_id) {
            return refuse(cart_id, &err);
        }

        let outcome = self
            .remote
            .remove_lines(cart_id, &[line_id.to_owned()])
            .await;

        self.settle(cart_id, outcome, REMOVE_FAILED)
    }

    pub async fn set_line_quantity(
        &self,
        session: &Session,
        cart_id: &str,
        line_id: &str,
        quantity: u32,
    ) -> CartActionResult {
        if let Err(err) = guard(session, cart_id) {
            return refuse(cart_id, &err);
        }

        if !self.config.accepts_quantity(quantity) {
            return refuse(
                cart_id,
                &CartError::QuantityOutOfRange {
                    quantity,
                    max: self.config.max_quantity,
                },
            );
        }

        let outcome = self
            .remote
            .set_line_quantity(cart_id, line_id, quantity)
            .await;

        self.settle(cart_id, outcome, UPDATE_FAILED)
    }

    /// Resolves the checkout URL of the session's cart. No redirect is
    /// produced for anything but a verified cart.
    pub async fn checkout(&self, session: &Session, cart_id: &str) -> CheckoutOutcome {
        if let Err(err) = guard(session, cart_id) {
            return CheckoutOutcome::Failed(refuse(cart_id, &err));
        }

        match self.remote.checkout_url(cart_id).await {
            Ok(checkout) => {
                info!(%cart_id, "Redirecting to checkout");
                CheckoutOutcome::Redirect(checkout.checkout_url)
            }
            Err(err) => {
                CheckoutOutcome::Failed(CartActionResult::from_outcome(cart_id, Err(err), CHECKOUT_FAILED))
            }
        }
    }

    /// The session's cart for rendering. Remote failures render as no cart.
    pub async fn load_cart(&self, session: &Session) -> Option<Cart> {
        let cart_id = session.cart_id()?;

        match self.remote.cart(&cart_id).await {
            Ok(cart) => cart,
            Err(err) => {
                warn!(%err, %cart_id, "Failed to load cart");
                None
            }
        }
    }

    pub async fn cart_count(&self, session: &Session) -> u32 {
        self.load_cart(session)
            .await
            .map_or(0, |cart| cart.total_quantity())
    }

    fn settle(
        &self,
        cart_id: &str,
        outcome: Result<CartRef, CartRemoteError>,
        failure: &str,
    ) -> CartActionResult {
        let result = CartActionResult::from_outcome(cart_id, outcome, failure);

        if result.is_ok() {
            let _ = self.events.publish(CartEvent::Changed {
                cart_id: result.id.clone(),
            });
        }

        result
    }
}

fn guard(session: &Session, cart_id: &str) -> Result<(), CartError> {
    if session.cart_id().as_deref() != Some(cart_id) {
        return Err(CartError::SessionMismatch);
    }

    Ok(())
}

fn refuse(cart_id: &str, err: &CartError) -> CartActionResult {
    warn!(%err, %cart_id, "Refusing cart action");

    CartActionResult::failed(cart_id, err.to_string())
}
