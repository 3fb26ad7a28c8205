//! `base64url(payload) "." base64url(hmac_sha256(secret, payload))`

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;

pub(crate) struct Signer {
    keys: Vec<hmac::Key>,
}

impl Signer {
    pub(crate) fn new<'a>(secrets: impl IntoIterator<Item = &'a str>) -> Self {
        let keys = secrets
            .into_iter()
            .map(|secret| hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()))
            .collect();

        Self { keys }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Signs with the newest secret. Returns `None` when no secret is configured.
    pub(crate) fn sign(&self, payload: &[u8]) -> Option<String> {
        let key = self.keys.first()?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);
        let tag = hmac::sign(key, encoded.as_bytes());

        Some(format!("{encoded}.{}", URL_SAFE_NO_PAD.encode(tag.as_ref())))
    }

    /// Returns the payload if any configured secret produced the signature.
    pub(crate) fn verify(&self, token: &str) -> Option<Vec<u8>> {
        let (encoded, signature) = token.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let trusted = self
            .keys
            .iter()
            .any(|key| hmac::verify(key, encoded.as_bytes(), &signature).is_ok());

        if !trusted {
            return None;
        }

        URL_SAFE_NO_PAD.decode(encoded).ok()
    }
}
