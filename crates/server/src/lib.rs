//! HTTP surface of the storefront.
//!
//! Every route runs inside the [`SessionLayer`], so handlers receive the
//! request's [`Session`](storefront_session::Session) as an extractor and the
//! cookie is written back once the handler has produced its response.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Extension, Router};
use eyre::Result as EyreResult;
use storefront_cart::{CartActions, CartEvents};
use storefront_commerce::CommerceApi;
use storefront_session::{SessionLayer, SessionStore};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::actions::{
    add_to_cart_handler, checkout_handler, remove_from_cart_handler, set_line_quantity_handler,
};
use crate::handlers::cart::{cart_count_handler, get_cart_handler};
use crate::handlers::health::health_check_handler;
use crate::handlers::products::variant_handler;
use crate::service::AppState;
use crate::sse::cart_events_handler;

pub mod config;
mod handlers;
pub mod service;
mod sse;
pub mod types;


/// Builds the application router.
pub fn router(state: Arc<AppState>, store: Arc<SessionStore>) -> Router {
    Router::new()
        .route("/actions/add-to-cart", post(add_to_cart_handler))
        .route("/actions/remove-from-cart", post(remove_from_cart_handler))
        .route("/actions/set-line-quantity", post(set_line_quantity_handler))
        .route("/actions/checkout", post(checkout_handler))
        .route("/cart", get(get_cart_handler))
        .route("/cart/count", get(cart_count_handler))
        .route("/cart/events", get(cart_events_handler))
        .route("/products/:handle/variant", get(variant_handler))
        .route("/health", get(health_check_handler))
        .layer(Extension(state))
        .layer(SessionLayer::new(store))
}

/// Cross-origin access for the configured origins only. Without any, the
/// browser keeps requests same-origin.
fn cors(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(origin) => Some(origin),
            Err(err) => {
                warn!(%origin, %err, "Ignoring invalid allowed origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Serves the storefront until the listener fails.
pub async fn start(config: ServerConfig, api: Arc<dyn CommerceApi>) -> EyreResult<()> {
    let store = Arc::new(SessionStore::new(config.session.clone())?);
    let actions = CartActions::new(api, CartEvents::new(), config.cart);
    let state = Arc::new(AppState::new(actions));

    let app = router(state, store).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors(&config)),
    );

    let listener = TcpListener::bind(config.listen).await?;

    info!("Storefront listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
