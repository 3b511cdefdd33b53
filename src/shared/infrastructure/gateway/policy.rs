// Per-call timeout and retry policy.
//
// The default never retries: a failed mutation is resubmitted by the operator.
// Retries only kick in for transient failures (timeout, network, backend) and only
// when a caller opts in.

use crate::shared::infrastructure::gateway::RemoteError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Option<Duration>,
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: 0,
            backoff: Duration::from_millis(250),
        }
    }
}

impl CallPolicy {
    pub fn no_retry(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }
}

pub async fn run_with_policy<T, F, Fut>(policy: &CallPolicy, mut call: F) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut attempt = 0;
    loop {
        let result = match policy.timeout {
            Some(limit) => tokio::time::timeout(limit, call())
                .await
                .unwrap_or(Err(RemoteError::Timeout(limit))),
            None => call().await,
        };
        match result {
            Err(error) if attempt < policy.retries && error.is_transient() => {
                attempt += 1;
                warn!(attempt, retries = policy.retries, %error, "retrying remote call");
                tokio::time::sleep(policy.backoff).await;
            }
            other => return other,
        }
    }
}
