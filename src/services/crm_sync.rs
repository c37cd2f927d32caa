use {
    crate::domain::{
        error::CrmError,
        order::Order,
        provider::{CrmClient, CrmRecord},
    },
    std::{fmt, future::Future, sync::Arc, time::Duration},
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a retried operation together with how many tries it took.
#[derive(Debug)]
pub struct Attempted<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

impl<T, E> Attempted<T, E> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Bounded retry with linear backoff: after the n-th failed attempt the
/// policy waits `n * base_delay`. No jitter.
#[derive(Clone, Copy)]
pub struct RetryPolicy<P> {
    max_attempts: u32,
    base_delay: Duration,
    retryable: P,
}

impl<P> fmt::Debug for RetryPolicy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .finish_non_exhaustive()
    }
}

impl<P> RetryPolicy<P> {
    pub fn new(max_attempts: u32, base_delay: Duration, retryable: P) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            retryable,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. The last error is returned, never raised.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Attempted<T, E>
    where
        P: Fn(&E) -> bool,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            let err = match op(attempt).await {
                Ok(value) => {
                    return Attempted {
                        result: Ok(value),
                        attempts: attempt,
                    };
                }
                Err(err) => err,
            };

            if attempt >= self.max_attempts || !(self.retryable)(&err) {
                tracing::warn!(
                    attempt,
                    max_attempts = self.max_attempts,
                    error = %err,
                    "giving up"
                );
                return Attempted {
                    result: Err(err),
                    attempts: attempt,
                };
            }

            let wait = self.delay_after(attempt);
            tracing::info!(attempt, wait_ms = wait.as_millis() as u64, error = %err, "retrying");
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

pub type CrmRetryPolicy = RetryPolicy<fn(&CrmError) -> bool>;

impl CrmRetryPolicy {
    pub fn for_crm(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy::new(max_attempts, base_delay, CrmError::is_retryable as fn(&CrmError) -> bool)
    }
}

impl Default for CrmRetryPolicy {
    fn default() -> Self {
        Self::for_crm(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

pub type CrmSyncOutcome = Attempted<CrmRecord, CrmError>;

/// CRM collaborator wrapped in a per-call timeout and the retry policy.
pub struct CrmSync {
    client: Arc<dyn CrmClient>,
    policy: CrmRetryPolicy,
    call_timeout: Duration,
}

impl CrmSync {
    pub fn new(client: Arc<dyn CrmClient>, policy: CrmRetryPolicy, call_timeout: Duration) -> Self {
        Self {
            client,
            policy,
            call_timeout,
        }
    }

    #[tracing::instrument(name = "crm_sync", skip_all, fields(order_id = %order.order_id()))]
    pub async fn sync(&self, order: &Order) -> CrmSyncOutcome {
        let outcome = self
            .policy
            .run(|attempt| {
                tracing::debug!(attempt, max_attempts = self.policy.max_attempts(), "pushing order to CRM");
                let call = self.client.push_order(order);
                let limit = self.call_timeout;
                async move {
                    tokio::time::timeout(limit, call)
                        .await
                        .unwrap_or(Err(CrmError::Timeout))
                }
            })
            .await;

        match &outcome.result {
            Ok(record) => tracing::info!(
                crm_id = record.id.as_deref().unwrap_or("-"),
                attempts = outcome.attempts,
                "order synced to CRM"
            ),
            Err(e) => tracing::error!(
                error = %e,
                attempts = outcome.attempts,
                "CRM sync failed, needs manual follow-up"
            ),
        }
        outcome
    }
}
