//! Cart operations with session cross-checks.
//!
//! Every mutation answers with the id of the cart it touched. An answer that
//! names a different cart than the one the call was keyed by means the
//! session is stale or was tampered with, so it is reported as
//! [`CartRemoteError::CartMismatch`] instead of being adopted.

use serde::{Deserialize, Serialize};
use storefront_primitives::cart::{Cart, CartLineInput, CartRef};
use thiserror::Error;
use tracing::{debug, error};

use crate::{CommerceApi, CommerceError};

#[derive(Debug, Error)]
pub enum CartRemoteError {
    #[error("Cart does not match the current session")]
    CartMismatch { expected: String, found: String },
    #[error("cart {0} not found")]
    CartNotFound(String),
    #[error("cart has no checkout URL")]
    MissingCheckoutUrl,
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

/// Checkout target of a cart.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checkout {
    pub id: String,
    pub checkout_url: String,
}

/// Cart operations on top of a [`CommerceApi`].
#[derive(Clone, Debug)]
pub struct CartRemote<A> {
    api: A,
}

impl<A: CommerceApi> CartRemote<A> {
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    pub async fn create_cart(&self, lines: &[CartLineInput]) -> Result<CartRef, CartRemoteError> {
        let cart = self.api.cart_create(lines).await?;

        debug!(cart_id = %cart.id, "Created cart");

        Ok(cart)
    }

    pub async fn add_lines(
        &self,
        cart_id: &str,
        lines: &[CartLineInput],
    ) -> Result<CartRef, CartRemoteError> {
        let found = self.api.cart_lines_add(cart_id, lines).await?;

        verify(cart_id, found)
    }

    pub async fn remove_lines(
        &self,
        cart_id: &str,
        line_ids: &[String],
    ) -> Result<CartRef, CartRemoteError> {
        let found = self.api.cart_lines_remove(cart_id, line_ids).await?;

        verify(cart_id, found)
    }

    pub async fn set_line_quantity(
        &self,
        cart_id: &str,
        line_id: &str,
        quantity: u32,
    ) -> Result<CartRef, CartRemoteError> {
        let found = self
            .api
            .cart_lines_update(cart_id, line_id, quantity)
            .await?;

        verify(cart_id, found)
    }

    pub async fn checkout_url(&self, cart_id: &str) -> Result<Checkout, CartRemoteError> {
        let cart = self
            .api
            .cart(cart_id)
            .await?
            .ok_or_else(|| CartRemoteError::CartNotFound(cart_id.to_owned()))?;

        let CartRef { id } = verify(cart_id, CartRef::new(cart.id))?;
        let checkout_url = cart.checkout_url.ok_or(CartRemoteError::MissingCheckoutUrl)?;

        Ok(Checkout { id, checkout_url })
    }

    /// Reads a cart for rendering, `None` if the service does not know it.
    pub async fn cart(&self, cart_id: &str) -> Result<Option<Cart>, CartRemoteError> {
        let Some(cart) = self.api.cart(cart_id).await? else {
            return Ok(None);
        };

        if cart.id != cart_id {
            return Err(CartRemoteError::CartMismatch {
                expected: cart_id.to_owned(),
                found: cart.id,
            });
        }

        Ok(Some(cart))
    }
}

fn verify(expected: &str, found: CartRef) -> Result<CartRef, CartRemoteError> {
    if found.id != expected {
        return Err(CartRemoteError::CartMismatch {
            expected: expected.to_owned(),
            found: found.id,
        });
    }

    Ok(found)
}

/// Outcome of a cart action as handed to the presentation layer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CartActionResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CartActionResult {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            error: None,
        }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Settles a remote outcome, falling back to the last known cart id on
    /// failure. Mismatches keep their own message; every other failure is
    /// reported as `failure`.
    pub fn from_outcome(
        last_known_id: &str,
        outcome: Result<CartRef, CartRemoteError>,
        failure: &str,
    ) -> Self {
        match outcome {
            Ok(cart) => Self::ok(cart.id),
            Err(err @ CartRemoteError::CartMismatch { .. }) => {
                error!(%err, cart_id = %last_known_id, "Cart id cross-check failed");
                Self::failed(last_known_id, err.to_string())
            }
            Err(err) => {
                error!(%err, cart_id = %last_known_id, "{failure}");
                Self::failed(last_known_id, failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use storefront_primitives::money::{Money, PriceRange};
    use storefront_primitives::product::{Product, SelectedOption, Variant};

    use super::*;
    use crate::MockCommerce;

    const VARIANT: &str = "gid://shop/ProductVariant/7";

    async fn mock() -> MockCommerce {
        let mock = MockCommerce::new();
        mock.add_product(Product {
            id: "gid://shop/Product/1".to_owned(),
            handle: "mug".to_owned(),
            title: "Mug".to_owned(),
            price_range: PriceRange {
                min_variant_price: Money::new("12.0", "USD"),
                max_variant_price: Money::new("12.0", "USD"),
            },
            options: vec![],
            variants: vec![Variant {
                id: VARIANT.to_owned(),
                title: "Default Title".to_owned(),
                selected_options: vec![SelectedOption::new("Title", "Default Title")],
                price: Money::new("12.0", "USD"),
                available_for_sale: true,
            }],
        })
        .await;
        mock
    }

    #[tokio::test]
    async fn add_lines_keeps_cart_id() {
        let remote = CartRemote::new(mock().await);
        let cart = remote
            .create_cart(&[CartLineInput::single(VARIANT)])
            .await
            .unwrap();

        let added = remote
            .add_lines(&cart.id, &[CartLineInput::single(VARIANT)])
            .await
            .unwrap();

        assert_eq!(added, cart);
    }

    #[tokio::test]
    async fn foreign_cart_id_is_a_mismatch() {
        let mock = mock().await;
        let remote = CartRemote::new(mock.clone());
        let cart = remote
            .create_cart(&[CartLineInput::single(VARIANT)])
            .await
            .unwrap();
        mock.answer_with_cart_id("gid://shop/Cart/999").await;

        let err = remote
            .add_lines(&cart.id, &[CartLineInput::single(VARIANT)])
            .await
            .unwrap_err();

        match err {
            CartRemoteError::CartMismatch { expected, found } => {
                assert_eq!(expected, cart.id);
                assert_eq!(found, "gid://shop/Cart/999");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn checkout_url_is_cross_checked() {
        let mock = mock().await;
        let remote = CartRemote::new(mock.clone());
        let cart = remote
            .create_cart(&[CartLineInput::single(VARIANT)])
            .await
            .unwrap();

        let checkout = remote.checkout_url(&cart.id).await.unwrap();
        assert_eq!(checkout.id, cart.id);
        assert_eq!(checkout.checkout_url, "https://checkout.example/cart/1");

        mock.answer_with_cart_id("gid://shop/Cart/2").await;
        assert!(matches!(
            remote.checkout_url(&cart.id).await,
            Err(CartRemoteError::CartMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_cart_has_no_checkout() {
        let remote = CartRemote::new(mock().await);

        assert!(matches!(
            remote.checkout_url("gid://shop/Cart/404").await,
            Err(CartRemoteError::CartNotFound(_))
        ));
        assert_eq!(remote.cart("gid://shop/Cart/404").await.unwrap(), None);
    }

    #[tokio::test]
    async fn failures_settle_to_last_known_id() {
        let mock = mock().await;
        let remote = CartRemote::new(mock.clone());
        mock.fail_always("connection refused").await;

        let outcome = remote
            .remove_lines("cart-123", &["line-1".to_owned()])
            .await;
        let result =
            CartActionResult::from_outcome("cart-123", outcome, "Failed to remove item from cart.");

        assert_eq!(
            result,
            CartActionResult::failed("cart-123", "Failed to remove item from cart.")
        );
    }

    #[test]
    fn mismatch_keeps_its_message() {
        let outcome = Err(CartRemoteError::CartMismatch {
            expected: "cart-123".to_owned(),
            found: "cart-999".to_owned(),
        });

        let result = CartActionResult::from_outcome("cart-123", outcome, "Failed.");

        assert_eq!(result.id, "cart-123");
        assert_eq!(
            result.error.as_deref(),
            Some("Cart does not match the current session")
        );
    }

    #[test]
    fn success_omits_error_field() {
        let json = serde_json::to_string(&CartActionResult::ok("cart-123")).unwrap();

        assert_eq!(json, r#"{"id":"cart-123"}"#);
    }
}
