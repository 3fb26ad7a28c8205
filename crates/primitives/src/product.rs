use serde::{Deserialize, Serialize};

use crate::money::{Money, PriceRange};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OptionValue {
    pub id: String,
    pub name: String,
}

/// A named option dimension of a product, e.g. "Size" or "Color".
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub id: String,
    pub name: String,
    pub option_values: Vec<OptionValue>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

impl SelectedOption {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A purchasable combination of option values.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub title: String,
    pub selected_options: Vec<SelectedOption>,
    pub price: Money,
    pub available_for_sale: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub price_range: PriceRange,
    pub options: Vec<ProductOption>,
    pub variants: Vec<Variant>,
}

impl Product {
    #[must_use]
    pub fn has_single_variant(&self) -> bool {
        self.variants.len() < 2
    }
}
