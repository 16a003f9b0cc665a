//! Store connection with a bounded, constant-delay retry.
//!
//! - Delay is fixed (no growth, no jitter)
//! - Every failure that will be retried logs a warning
//! - The attempt that reaches `max_attempts` logs an error and returns
//!   [`Error::StoreUnavailable`]; the caller decides whether to exit

use crate::StoreConnector;
use authkey_config::RetryPolicy;
use authkey_core::{Error, Result};

/// Connect, retrying until the store is up or the ceiling is reached
pub async fn connect_with_retry<C>(connector: &C, policy: &RetryPolicy) -> Result<C::Store>
where
    C: StoreConnector,
{
    let max_attempts = policy.max_attempts.max(1);
    let store_name = connector.describe();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match connector.connect().await {
            Ok(store) => {
                tracing::info!(%store_name, attempt, "Key store connected");
                return Ok(store);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!(%store_name, attempts = attempt, error = %e, "Could not connect to key store");
                return Err(Error::StoreUnavailable { attempts: attempt });
            }
            Err(e) => {
                tracing::warn!(
                    %store_name,
                    attempt,
                    error = %e,
                    "Key store not available : Will retry in {} ms...",
                    policy.delay_ms
                );
                tokio::time::sleep(policy.delay()).await;
            }
        }
    }
}
