//! Client side of the remote commerce API.
//!
//! [`CommerceApi`] is the query/mutation contract the storefront relies on.
//! [`GraphQlClient`] speaks it over HTTP, [`MockCommerce`] keeps everything in
//! memory for tests and offline development, and [`CartRemote`] layers the
//! cart id cross-checks on top of either.

use std::sync::Arc;

use async_trait::async_trait;
use storefront_primitives::cart::{Cart, CartLineInput, CartRef};
use storefront_primitives::product::Product;
use thiserror::Error;

pub mod config;
pub mod graphql;
pub mod mock;
mod queries;
pub mod remote;
pub mod retry;

pub use config::CommerceConfig;
pub use graphql::GraphQlClient;
pub use mock::{MockCall, MockCommerce};
pub use remote::{CartActionResult, CartRemote, CartRemoteError, Checkout};
pub use retry::{Replay, RetryPolicy};

/// Error returned by the remote commerce service
#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("commerce API responded with status {0}")]
    Status(u16),
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("rejected by commerce API: {0}")]
    UserErrors(String),
    #[error("response did not contain a cart")]
    MissingCart,
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("commerce API unavailable: {0}")]
    Unavailable(String),
}

impl CommerceError {
    /// Whether repeating the same call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_timeout() || err.is_connect(),
            Self::Status(status) => *status >= 500 || *status == 429,
            Self::Unavailable(_) => true,
            Self::GraphQl(_) | Self::UserErrors(_) | Self::MissingCart | Self::Decode(_) => false,
        }
    }

    /// Whether the service certainly did not act on the call: the
    /// connection was never established or the call was throttled.
    #[must_use]
    pub fn is_unsent(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_connect(),
            Self::Status(status) => *status == 429,
            Self::Unavailable(_)
            | Self::GraphQl(_)
            | Self::UserErrors(_)
            | Self::MissingCart
            | Self::Decode(_) => false,
        }
    }
}

/// Query/mutation contract of the remote commerce service.
///
/// Every cart mutation answers with the id of the cart it touched.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    async fn cart_create(&self, lines: &[CartLineInput]) -> Result<CartRef, CommerceError>;

    async fn cart_lines_add(
        &self,
        cart_id: &str,
        lines: &[CartLineInput],
    ) -> Result<CartRef, CommerceError>;

    async fn cart_lines_remove(
        &self,
        cart_id: &str,
        line_ids: &[String],
    ) -> Result<CartRef, CommerceError>;

    async fn cart_lines_update(
        &self,
        cart_id: &str,
        line_id: &str,
        quantity: u32,
    ) -> Result<CartRef, CommerceError>;

    /// Reads a cart, `None` if the service does not know the id.
    async fn cart(&self, cart_id: &str) -> Result<Option<Cart>, CommerceError>;

    /// Reads a product by handle, `None` if there is no such product.
    async fn product(&self, handle: &str) -> Result<Option<Product>, CommerceError>;
}

#[async_trait]
impl<T: CommerceApi + ?Sized> CommerceApi for Arc<T> {
    async fn cart_create(&self, lines: &[CartLineInput]) -> Result<CartRef, CommerceError> {
        (**self).cart_create(lines).await
    }

    async fn cart_lines_add(
        &self,
        cart_id: &str,
        lines: &[CartLineInput],
    ) -> Result<CartRef, CommerceError> {
        (**self).cart_lines_add(cart_id, lines).await
    }

    async fn cart_lines_remove(
        &self,
        cart_id: &str,
        line_ids: &[String],
    ) -> Result<CartRef, CommerceError> {
        (**self).cart_lines_remove(cart_id, line_ids).await
    }

    async fn cart_lines_update(
        &self,
        cart_id: &str,
        line_id: &str,
        quantity: u32,
    ) -> Result<CartRef, CommerceError> {
        (**self).cart_lines_update(cart_id, line_id, quantity).await
    }

    async fn cart(&self, cart_id: &str) -> Result<Option<Cart>, CommerceError> {
        (**self).cart(cart_id).await
    }

    async fn product(&self, handle: &str) -> Result<Option<Product>, CommerceError> {
        (**self).product(handle).await
    }
}
