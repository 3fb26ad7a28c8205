//! Errors that carry an HTTP-equivalent status code.
//!
//! Such errors cross the rendering boundary as a JSON digest
//! (`{"status":404,"message":"..."}`) and are mapped back to a status code at
//! the edge. Any other error encodes to nothing and is treated as an
//! unexpected failure.

use std::error::Error;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// An error that knows which HTTP status it corresponds to.
pub trait StatusCodeError: Error {
    fn status(&self) -> u16;
}

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct NotFoundError {
    message: String,
}

impl NotFoundError {
    pub const STATUS: u16 = 404;

    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for NotFoundError {
    fn default() -> Self {
        Self::new("Not Found")
    }
}

impl StatusCodeError for NotFoundError {
    fn status(&self) -> u16 {
        Self::STATUS
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct Digest {
    status: u16,
    message: String,
}

/// Encodes a known status-code error into its digest form.
#[must_use]
pub fn encode_error(error: &(dyn Error + 'static)) -> Option<String> {
    let not_found = error.downcast_ref::<NotFoundError>()?;

    serde_json::to_string(&Digest {
        status: not_found.status(),
        message: not_found.message.clone(),
    })
    .ok()
}

/// Decodes a digest produced by [`encode_error`]. Digests of other shapes or
/// statuses are not recognised.
#[must_use]
pub fn decode_error(digest: &str) -> Option<NotFoundError> {
    let digest: Digest = serde_json::from_str(digest).ok()?;

    (digest.status == NotFoundError::STATUS).then(|| NotFoundError::new(digest.message))
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn not_found_digest_survives_the_boundary() {
        let error = NotFoundError::new("Could not find blue-shirt.");
        let digest = encode_error(&error).expect("not-found errors encode");

        assert_eq!(
            digest,
            r#"{"status":404,"message":"Could not find blue-shirt."}"#
        );
        assert_eq!(decode_error(&digest), Some(error));
    }

    #[test]
    fn other_errors_do_not_encode() {
        let error = io::Error::new(io::ErrorKind::Other, "boom");

        assert_eq!(encode_error(&error), None);
    }

    #[test]
    fn foreign_digests_do_not_decode() {
        assert_eq!(decode_error(r#"{"status":500,"message":"x"}"#), None);
        assert_eq!(decode_error("not json"), None);
        assert_eq!(decode_error(r#"{"status":404}"#), None);
    }

    #[test]
    fn default_message() {
        assert_eq!(NotFoundError::default().to_string(), "Not Found");
    }
}
