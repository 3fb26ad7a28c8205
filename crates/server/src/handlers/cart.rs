use std::sync::Arc;

use axum::Extension;
use storefront_cart::CartPhase;
use storefront_primitives::money::format_price;
use storefront_session::Session;

use crate::service::{ApiResponse, AppState};
use crate::types::{CartCount, CartCountResponse, CartResponse, CartView};

pub async fn get_cart_handler(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
) -> ApiResponse<CartResponse> {
    let cart_id = session.cart_id();
    let cart = state.actions.load_cart(&session).await;
    let phase = CartPhase::derive(cart_id.as_deref(), cart.as_ref(), false);

    let view = match cart {
        Some(cart) => CartView {
            cart_id,
            total_quantity: cart.total_quantity(),
            formatted_total: Some(format_price(&cart.total)),
            total: Some(cart.total),
            lines: cart.lines,
            phase,
        },
        None => CartView {
            cart_id,
            lines: Vec::new(),
            total_quantity: 0,
            total: None,
            formatted_total: None,
            phase,
        },
    };

    ApiResponse {
        payload: CartResponse { data: view },
    }
}

pub async fn cart_count_handler(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
) -> ApiResponse<CartCountResponse> {
    let count = state.actions.cart_count(&session).await;

    ApiResponse {
        payload: CartCountResponse {
            data: CartCount { count },
        },
    }
}
