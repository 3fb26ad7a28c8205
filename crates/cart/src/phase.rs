use serde::Serialize;
use storefront_primitives::cart::Cart;

/// Where a shopper's cart stands, as far as rendering is concerned.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CartPhase {
    /// The session carries no cart id.
    NoCart,
    /// A cart id is known but no cart has been read for it yet.
    Created,
    Populated,
    /// Actions are in flight and the view is a projection.
    Mutating,
    Empty,
}

impl CartPhase {
    #[must_use]
    pub fn derive(session_cart_id: Option<&str>, view: Option<&Cart>, pending: bool) -> Self {
        if session_cart_id.is_none() {
            return Self::NoCart;
        }

        if pending {
            return Self::Mutating;
        }

        match view {
            None => Self::Created,
            Some(cart) if cart.is_empty() => Self::Empty,
            Some(_) => Self::Populated,
        }
    }
}

#[cfg(test)]
mod tests {
    use storefront_primitives::money::Money;

    use super::*;

    fn empty_cart() -> Cart {
        Cart {
            id: "cart-123".to_owned(),
            checkout_url: None,
            lines: vec![],
            total: Money::zero("USD"),
        }
    }

    #[test]
    fn phases() {
        let cart = empty_cart();

        assert_eq!(CartPhase::derive(None, None, false), CartPhase::NoCart);
        assert_eq!(CartPhase::derive(Some("cart-123"), None, false), CartPhase::Created);
        assert_eq!(CartPhase::derive(Some("cart-123"), Some(&cart), true), CartPhase::Mutating);
        assert_eq!(CartPhase::derive(Some("cart-123"), Some(&cart), false), CartPhase::Empty);
    }
}
