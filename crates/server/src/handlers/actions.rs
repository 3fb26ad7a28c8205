use std::sync::Arc;

use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use storefront_cart::{AddToCartForm, CartError, CheckoutOutcome};
use storefront_session::Session;

use crate::service::{ActionInput, ApiError, ApiResponse, AppState};
use crate::types::{
    AddToCartResponse, CartActionResponse, CheckoutRequest, RemoveFromCartRequest,
    SetLineQuantityRequest,
};

pub async fn add_to_cart_handler(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    ActionInput(form): ActionInput<AddToCartForm>,
) -> Result<ApiResponse<AddToCartResponse>, ApiError> {
    let result = state
        .actions
        .add_to_cart(&session, &form)
        .await
        .map_err(|err: CartError| ApiError::from_error(&err))?;

    Ok(ApiResponse {
        payload: AddToCartResponse { data: result },
    })
}

pub async fn remove_from_cart_handler(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    ActionInput(req): ActionInput<RemoveFromCartRequest>,
) -> ApiResponse<CartActionResponse> {
    let result = state
        .actions
        .remove_from_cart(&session, &req.cart_id, &req.line_id)
        .await;

    ApiResponse {
        payload: CartActionResponse { data: result },
    }
}

pub async fn set_line_quantity_handler(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    ActionInput(req): ActionInput<SetLineQuantityRequest>,
) -> ApiResponse<CartActionResponse> {
    let result = state
        .actions
        .set_line_quantity(&session, &req.cart_id, &req.line_id, req.quantity)
        .await;

    ApiResponse {
        payload: CartActionResponse { data: result },
    }
}

/// Redirects to the checkout with `303 See Other`, or answers with the
/// failed action result.
pub async fn checkout_handler(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    ActionInput(req): ActionInput<CheckoutRequest>,
) -> Response {
    match state.actions.checkout(&session, &req.cart_id).await {
        CheckoutOutcome::Redirect(url) => Redirect::to(&url).into_response(),
        CheckoutOutcome::Failed(result) => ApiResponse {
            payload: CartActionResponse { data: result },
        }
        .into_response(),
    }
}
