use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Reference to a remote cart, as returned by every cart mutation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CartRef {
    pub id: String,
}

impl CartRef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A merchandise entry to add to a cart.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: String,
    pub quantity: u32,
}

impl CartLineInput {
    #[must_use]
    pub fn single(merchandise_id: impl Into<String>) -> Self {
        Self {
            merchandise_id: merchandise_id.into(),
            quantity: 1,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub merchandise_id: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// Variant title, `"Default Title"` for single-variant products.
    pub title: String,
    pub product_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Denormalized read of a remote cart, used for rendering only.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    pub lines: Vec<CartLine>,
    pub total: Money,
}

impl Cart {
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_quantity() == 0
    }

    #[must_use]
    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: u32) -> CartLine {
        CartLine {
            id: id.to_owned(),
            merchandise_id: format!("gid://shop/ProductVariant/{id}"),
            quantity,
            unit_price: Money::new("5.0", "USD"),
            title: "Default Title".to_owned(),
            product_title: "Sticker".to_owned(),
            image_url: None,
        }
    }

    #[test]
    fn total_quantity_sums_lines() {
        let cart = Cart {
            id: "cart-1".to_owned(),
            checkout_url: None,
            lines: vec![line("a", 2), line("b", 3)],
            total: Money::new("25.0", "USD"),
        };

        assert_eq!(cart.total_quantity(), 5);
        assert!(!cart.is_empty());
        assert_eq!(cart.line("b").map(|l| l.quantity), Some(3));
    }

    #[test]
    fn cart_without_lines_is_empty() {
        let cart = Cart {
            id: "cart-1".to_owned(),
            checkout_url: None,
            lines: vec![],
            total: Money::zero("USD"),
        };

        assert!(cart.is_empty());
    }
}
