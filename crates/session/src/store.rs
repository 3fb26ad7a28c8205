use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};
use tracing::debug;

use crate::config::SessionConfig;
use crate::session::{Session, SessionData};
use crate::token::Signer;
use crate::SessionError;

/// Reads and writes sessions stored in signed cookies.
pub struct SessionStore {
    config: SessionConfig,
    signer: Signer,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("cookie_name", &self.config.cookie_name)
            .field("secure", &self.config.secure)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let signer = Signer::new(config.secrets.iter().map(String::as_str));

        if signer.is_empty() {
            return Err(SessionError::NoSecret);
        }

        Ok(Self { config, signer })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Builds the session for an incoming request.
    ///
    /// Missing, malformed or tampered cookies yield an empty session rather
    /// than an error.
    #[must_use]
    pub fn get(&self, headers: &HeaderMap) -> Session {
        Session::new(self.load(headers))
    }

    fn load(&self, headers: &HeaderMap) -> SessionData {
        let Some(token) = self.find_cookie(headers) else {
            return SessionData::default();
        };

        let Some(payload) = self.signer.verify(&token) else {
            debug!(cookie = %self.config.cookie_name, "Ignoring session cookie with invalid signature");
            return SessionData::default();
        };

        match serde_json::from_slice(&payload) {
            Ok(data) => data,
            Err(err) => {
                debug!(%err, "Ignoring undecodable session payload");
                SessionData::default()
            }
        }
    }

    fn find_cookie(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.config.cookie_name)
            .map(|cookie| cookie.value().to_owned())
    }

    /// Renders the `Set-Cookie` value for the given session data.
    pub fn cookie(&self, data: &SessionData) -> Result<String, SessionError> {
        let payload = serde_json::to_vec(data)?;
        let token = self.signer.sign(&payload).ok_or(SessionError::NoSecret)?;

        let mut cookie = Cookie::build((self.config.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure);

        if let Some(max_age) = self.config.max_age_secs {
            cookie = cookie.max_age(Duration::seconds(
                i64::try_from(max_age).unwrap_or(i64::MAX),
            ));
        }

        Ok(cookie.build().to_string())
    }

    /// Appends a `Set-Cookie` header if the session changed during the
    /// request. Returns whether a header was written.
    pub fn commit(&self, headers: &mut HeaderMap, session: &Session) -> Result<bool, SessionError> {
        if !session.is_modified() {
            return Ok(false);
        }

        let cookie = self.cookie(&session.data())?;
        headers.append(SET_COOKIE, HeaderValue::from_str(&cookie)?);

        Ok(true)
    }
}
