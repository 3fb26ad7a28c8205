use std::sync::Arc;

use axum::extract::{Path, RawQuery};
use axum::http::StatusCode;
use axum::Extension;
use storefront_cart::selection::{
    display_price, selected_variant, selection_from_query, selection_location,
};
use storefront_primitives::errors::NotFoundError;
use tracing::error;

use crate::service::{ApiError, ApiResponse, AppState};
use crate::types::{OptionValueView, OptionView, VariantResponse, VariantView};

/// Resolves the variant picked by the `options` query parameter.
pub async fn variant_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(handle): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<ApiResponse<VariantResponse>, ApiError> {
    let product = state
        .api()
        .product(&handle)
        .await
        .map_err(|err| {
            error!(%err, %handle, "Failed to load product");
            ApiError::new(StatusCode::BAD_GATEWAY, "Failed to load product")
        })?
        .ok_or_else(|| {
            ApiError::from_error(&NotFoundError::new(format!("Could not find {handle}.")))
        })?;

    let selection = selection_from_query(query.as_deref());
    let variant = selected_variant(&product, &selection).cloned();
    let path = format!("/products/{handle}");

    let options = if product.has_single_variant() {
        Vec::new()
    } else {
        product
            .options
            .iter()
            .map(|option| OptionView {
                name: option.name.clone(),
                values: option
                    .option_values
                    .iter()
                    .map(|value| OptionValueView {
                        name: value.name.clone(),
                        selected: selection.get(&option.name) == Some(&value.name),
                        location: selection_location(
                            &path,
                            query.as_deref(),
                            &selection,
                            &option.name,
                            &value.name,
                        )
                        .0,
                    })
                    .collect(),
            })
            .collect()
    };

    Ok(ApiResponse {
        payload: VariantResponse {
            data: VariantView {
                price: display_price(&product, &selection),
                available_for_sale: variant.as_ref().map(|variant| variant.available_for_sale),
                handle,
                selection,
                variant,
                options,
            },
        },
    })
}
