use core::fmt::{self, Display, Formatter};
use std::error::Error;
use std::sync::Arc;

use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, to_string as to_json_string};
use storefront_cart::CartActions;
use storefront_commerce::CommerceApi;
use storefront_primitives::errors::{decode_error, encode_error, StatusCodeError};
use tracing::error;

/// Shared state of every handler.
pub struct AppState {
    pub actions: CartActions<Arc<dyn CommerceApi>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("cart", self.actions.config())
            .finish_non_exhaustive()
    }
}

impl AppState {
    #[must_use]
    pub const fn new(actions: CartActions<Arc<dyn CommerceApi>>) -> Self {
        Self { actions }
    }

    pub fn api(&self) -> &dyn CommerceApi {
        &**self.actions.remote().api()
    }
}

#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub(crate) payload: T,
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response<Body> {
        match to_json_string(&self.payload) {
            Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(err) => ApiError::internal(format!("Failed to encode response: {err}")).into_response(),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub(crate) status_code: StatusCode,
    pub(crate) message: String,
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Maps an error that escaped a handler to a response. Errors that know
    /// their status cross as a digest and keep it, anything else is a 500.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let Some(known) = encode_error(err).as_deref().and_then(decode_error) else {
            error!(%err, "Unexpected error");
            return Self::internal(err.to_string());
        };

        let status_code =
            StatusCode::from_u16(known.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        Self::new(status_code, known.message())
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status_code, self.message)
    }
}

impl Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response<Body> {
        let body = json!({ "error": self.message }).to_string();

        (
            self.status_code,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

/// Action payload sent either as JSON or as a urlencoded form.
#[derive(Debug)]
pub struct ActionInput<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ActionInput<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(input) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
            return Ok(Self(input));
        }

        let Form(input) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        Ok(Self(input))
    }
}
