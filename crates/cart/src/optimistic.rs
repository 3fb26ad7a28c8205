//! Optimistic cart state.
//!
//! Two layers: the last snapshot the server confirmed, and the actions that
//! were dispatched since and have not settled. The rendered view is the
//! pending actions folded over the snapshot in dispatch order. Confirmations
//! rebase the remaining actions on the new snapshot.

use serde::{Deserialize, Serialize};
use storefront_primitives::cart::Cart;
use tracing::{debug, warn};

use crate::config::RollbackPolicy;
use crate::phase::CartPhase;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    RemoveLine { line_id: String },
    #[serde(rename_all = "camelCase")]
    SetQuantity { line_id: String, quantity: u32 },
    /// Has no local projection, only marks the cart as busy.
    Checkout,
}

impl Action {
    fn apply(&self, cart: &mut Cart) {
        match self {
            Self::RemoveLine { line_id } => cart.lines.retain(|line| &line.id != line_id),
            Self::SetQuantity { line_id, quantity } => {
                if let Some(line) = cart.lines.iter_mut().find(|line| &line.id == line_id) {
                    line.quantity = *quantity;
                }
            }
            Self::Checkout => {}
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PendingId(u64);

#[derive(Clone, Debug)]
pub struct OptimisticCart {
    snapshot: Option<Cart>,
    pending: Vec<(PendingId, Action)>,
    next_id: u64,
    policy: RollbackPolicy,
    error: Option<String>,
}

impl OptimisticCart {
    #[must_use]
    pub const fn new(snapshot: Option<Cart>, policy: RollbackPolicy) -> Self {
        Self {
            snapshot,
            pending: Vec::new(),
            next_id: 0,
            policy,
            error: None,
        }
    }

    /// Records an action and applies it to the view right away.
    pub fn dispatch(&mut self, action: Action) -> PendingId {
        self.next_id += 1;
        let id = PendingId(self.next_id);

        debug!(?id, ?action, "Dispatching optimistic cart action");

        self.pending.push((id, action));
        self.error = None;

        id
    }

    #[must_use]
    pub fn view(&self) -> Option<Cart> {
        let mut cart = self.snapshot.clone()?;

        for (_, action) in &self.pending {
            action.apply(&mut cart);
        }

        Some(cart)
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&Cart> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Error of the most recent failed action, cleared by the next dispatch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Settles an action with the state the server answered with. The latest
    /// confirmation always replaces the snapshot.
    pub fn confirm(&mut self, id: PendingId, snapshot: Option<Cart>) {
        if self.take(id).is_none() {
            debug!(?id, "Confirmed action was no longer pending");
        }

        self.snapshot = snapshot;
    }

    /// Settles an action whose remote call failed.
    pub fn fail(&mut self, id: PendingId, error: impl Into<String>) {
        let error = error.into();
        warn!(?id, %error, policy = ?self.policy, "Optimistic cart action failed");

        if let Some(action) = self.take(id) {
            if self.policy == RollbackPolicy::Keep {
                if let Some(snapshot) = &mut self.snapshot {
                    action.apply(snapshot);
                }
            }
        }

        self.error = Some(error);
    }

    #[must_use]
    pub fn phase(&self, session_cart_id: Option<&str>) -> CartPhase {
        CartPhase::derive(session_cart_id, self.view().as_ref(), self.is_pending())
    }

    fn take(&mut self, id: PendingId) -> Option<Action> {
        let index = self.pending.iter().position(|(pending, _)| *pending == id)?;

        Some(self.pending.remove(index).1)
    }
}
