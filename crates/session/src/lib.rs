//! Signed cookie sessions scoped to a single request.
//!
//! The session payload lives entirely on the client in a tamper-evident
//! cookie. [`SessionLayer`] decodes it once per request, hands handlers an
//! exclusive [`Session`] through the request extensions, and writes a
//! `Set-Cookie` header back only when the data actually changed.
//!
//! Once the inner service has produced its response the session is
//! finalized: any later attempt to mutate it fails with
//! [`SessionError::ResponseGenerated`], since a cookie set at that point would
//! be silently dropped.

use thiserror::Error;

pub mod config;
pub mod layer;
pub mod session;
pub mod store;
mod token;


pub use config::SessionConfig;
pub use layer::SessionLayer;
pub use session::{Session, SessionData, SessionKey};
pub use store::SessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(
        "Cannot mutate session after response is generated: session.{operation}() was called after the response was generated."
    )]
    ResponseGenerated { operation: &'static str },
    #[error("No session context")]
    Missing,
    #[error("No session secret configured")]
    NoSecret,
    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid session cookie header: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}
