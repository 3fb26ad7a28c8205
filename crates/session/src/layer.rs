use core::task::{Context, Poll};
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};
use tracing::error;

use crate::session::Session;
use crate::store::SessionStore;
use crate::SessionError;

/// Provides every request with its own [`Session`].
#[derive(Clone, Debug)]
pub struct SessionLayer {
    store: Arc<SessionStore>,
}

impl SessionLayer {
    #[must_use]
    pub const fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            store: Arc::clone(&self.store),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionMiddleware<S> {
    inner: S,
    store: Arc<SessionStore>,
}

impl<S> Service<Request> for SessionMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let session = self.store.get(request.headers());
        let _previous = request.extensions_mut().insert(session.clone());

        let store = Arc::clone(&self.store);
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;

            session.finalize();

            if let Err(err) = store.commit(response.headers_mut(), &session) {
                error!(%err, "Failed to commit session");
                return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
            }

            Ok(response)
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(SessionError::Missing)
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        error!(err = %self, "Session error");

        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
