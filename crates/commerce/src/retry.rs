use core::future::Future;
use core::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::CommerceError;

/// Whether a remote call may be sent again after it failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Replay {
    /// Sending the call twice leaves the remote in the same state.
    Safe,
    /// Sending the call twice may apply it twice, so it is only repeated
    /// when the first attempt never reached the service.
    Unsafe,
}

impl Replay {
    #[must_use]
    pub fn allows(self, err: &CommerceError) -> bool {
        match self {
            Self::Safe => err.is_transient(),
            Self::Unsafe => err.is_unsent(),
        }
    }
}

/// Timeout and bounded retry applied to remote calls.
///
/// Which failures are retried depends on the call's [`Replay`] class;
/// anything the service deliberately rejected fails fast.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RetryPolicy {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    200
}

const fn default_max_backoff_ms() -> u64 {
    2_000
}

impl RetryPolicy {
    /// Fail on the first error.
    #[must_use]
    pub const fn fail_fast() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: 0,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay before retry number `attempt` (zero based), doubling each time.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt);
        let delay = self.initial_backoff_ms.saturating_mul(factor);

        Duration::from_millis(delay.min(self.max_backoff_ms))
    }

    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        replay: Replay,
        mut call: F,
    ) -> Result<T, CommerceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CommerceError>>,
    {
        let mut attempt = 0;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if replay.allows(&err) && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(%operation, %err, attempt, ?delay, "Remote call failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
