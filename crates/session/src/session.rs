use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Everything the storefront keeps in the client-held session.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionData {
    #[serde(rename = "cartId", default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<String>,
}

/// Keys addressable through [`Session::get`], [`Session::set`] and
/// [`Session::unset`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionKey {
    CartId,
}

impl SessionKey {
    fn slot(self, data: &mut SessionData) -> &mut Option<String> {
        match self {
            Self::CartId => &mut data.cart_id,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    initial: SessionData,
    data: SessionData,
    response_generated: bool,
}

/// Handle to the session of the request currently being served.
///
/// Cloning the handle does not copy the session, all clones observe the same
/// request-scoped state. A new `Session` is created for every request, so no
/// two requests ever share one.
#[derive(Clone, Debug)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    #[must_use]
    pub fn new(data: SessionData) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                initial: data.clone(),
                data,
                response_generated: false,
            })),
        }
    }

    #[must_use]
    pub fn get(&self, key: SessionKey) -> Option<String> {
        key.slot(&mut self.state.lock().data).clone()
    }

    #[must_use]
    pub fn cart_id(&self) -> Option<String> {
        self.get(SessionKey::CartId)
    }

    pub fn set(&self, key: SessionKey, value: impl Into<String>) -> Result<(), SessionError> {
        self.mutate("set", |data| *key.slot(data) = Some(value.into()))
    }

    pub fn unset(&self, key: SessionKey) -> Result<(), SessionError> {
        self.mutate("unset", |data| *key.slot(data) = None)
    }

    /// Replaces the session with an empty one, dropping the cart reference.
    pub fn destroy(&self) -> Result<(), SessionError> {
        self.mutate("destroy", |data| *data = SessionData::default())
    }

    #[must_use]
    pub fn data(&self) -> SessionData {
        self.state.lock().data.clone()
    }

    /// Whether the data differs from what the request arrived with.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        let state = self.state.lock();
        state.data != state.initial
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.state.lock().response_generated
    }

    /// Marks the response as generated. Every mutation after this point fails.
    pub fn finalize(&self) {
        self.state.lock().response_generated = true;
    }

    fn mutate(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut SessionData),
    ) -> Result<(), SessionError> {
        let mut state = self.state.lock();

        if state.response_generated {
            return Err(SessionError::ResponseGenerated { operation });
        }

        apply(&mut state.data);

        Ok(())
    }
}
