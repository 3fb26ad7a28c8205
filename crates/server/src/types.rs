//! Request and response bodies of the HTTP surface.

use serde::{Deserialize, Serialize};
use storefront_cart::selection::Selection;
use storefront_cart::{AddToCartResult, CartPhase};
use storefront_commerce::CartActionResult;
use storefront_primitives::cart::CartLine;
use storefront_primitives::money::Money;
use storefront_primitives::product::Variant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub cart_id: String,
    pub line_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLineQuantityRequest {
    pub cart_id: String,
    pub line_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_id: String,
}

#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    pub data: AddToCartResult,
}

#[derive(Debug, Serialize)]
pub struct CartActionResponse {
    pub data: CartActionResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: Option<String>,
    pub lines: Vec<CartLine>,
    pub total_quantity: u32,
    pub total: Option<Money>,
    pub formatted_total: Option<String>,
    pub phase: CartPhase,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub data: CartView,
}

#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct CartCountResponse {
    pub data: CartCount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionValueView {
    pub name: String,
    pub selected: bool,
    /// Location that selects this value.
    pub location: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantView {
    pub handle: String,
    pub selection: Selection,
    pub variant: Option<Variant>,
    pub price: String,
    /// `None` until a variant is selected.
    pub available_for_sale: Option<bool>,
    /// Empty for products without a choice to make.
    pub options: Vec<OptionView>,
}

#[derive(Debug, Serialize)]
pub struct VariantResponse {
    pub data: VariantView,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    /// RFC 3339 time the check was answered
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub data: HealthStatus,
}
