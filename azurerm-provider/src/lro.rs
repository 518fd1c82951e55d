//! Long-running operation handle
//!
//! ARM answers slow mutations (zone delete, subscription alias creation) with
//! `201`/`202` plus polling headers instead of the final resource. The
//! initiating call returns a [`LongRunningOperation`] that is either already
//! `Done` or `Pending` with the token needed to poll the server.
//!
//! The poll transport sits behind [`OperationPoller`]; the ARM implementation
//! lives in [`crate::clients::operation`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::{ProviderError, Result};

/// Bounds and pacing of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptions {
    /// Delay between polls when the server sends no `Retry-After`.
    pub interval: Duration,
    /// Upper bound for any single delay, including `Retry-After`.
    pub max_interval: Duration,
    /// Maximum number of status requests before giving up.
    pub max_attempts: u32,
    /// Maximum total time spent waiting.
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_interval: Duration::from_secs(60),
            max_attempts: 360,
            timeout: Duration::from_secs(60 * 60),
        }
    }
}

/// HTTP method of the request that started the operation.
///
/// Decides where the final result is read from once polling finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationMethod {
    Put,
    Patch,
    Post,
    Delete,
}

impl OperationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// How the status of a pending operation is observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PollingStrategy {
    /// GET the `Azure-AsyncOperation` status document until it is terminal.
    AsyncOperation {
        status_url: String,
        location: Option<String>,
    },
    /// GET the `Location` URL; `202` means still running.
    Location { url: String },
    /// GET the resource until its `provisioningState` is terminal.
    ProvisioningState,
}

/// Everything needed to resume polling a pending operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationToken {
    /// Operation name used in errors and logs (e.g. `zones.delete`).
    pub operation: String,
    pub method: OperationMethod,
    /// URL of the initiating request.
    pub resource_url: String,
    pub strategy: PollingStrategy,
}

/// Result of a single status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus<T> {
    /// Not terminal yet.
    InProgress { retry_after: Option<Duration> },
    /// Terminal success, with the final value.
    Succeeded(T),
}

/// Performs one status check for a pending operation.
///
/// Server-reported failure is returned as [`ProviderError::OperationFailed`];
/// any error ends polling.
#[async_trait]
pub trait OperationPoller<T>: Send + Sync {
    async fn poll(&self, token: &mut OperationToken) -> Result<PollStatus<T>>;
}

enum State<T> {
    Pending {
        token: OperationToken,
        retry_after: Option<Duration>,
        poller: Arc<dyn OperationPoller<T>>,
    },
    Done(T),
}

/// Handle to an operation that completes asynchronously on the server.
pub struct LongRunningOperation<T> {
    service: String,
    operation: String,
    state: State<T>,
    options: PollOptions,
}

impl<T> fmt::Debug for LongRunningOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Pending { .. } => "Pending",
            State::Done(_) => "Done",
        };
        f.debug_struct("LongRunningOperation")
            .field("service", &self.service)
            .field("operation", &self.operation)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> LongRunningOperation<T> {
    /// An operation the server completed synchronously.
    pub fn done(service: impl Into<String>, operation: impl Into<String>, value: T) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
            state: State::Done(value),
            options: PollOptions::default(),
        }
    }

    /// An operation still running on the server.
    pub fn pending(
        service: impl Into<String>,
        token: OperationToken,
        retry_after: Option<Duration>,
        poller: Arc<dyn OperationPoller<T>>,
        options: PollOptions,
    ) -> Self {
        Self {
            service: service.into(),
            operation: token.operation.clone(),
            state: State::Pending {
                token,
                retry_after,
                poller,
            },
            options,
        }
    }

    /// Overrides the polling bounds.
    #[must_use]
    pub fn with_options(mut self, options: PollOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done(_))
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Resume token of a pending operation.
    pub fn token(&self) -> Option<&OperationToken> {
        match &self.state {
            State::Pending { token, .. } => Some(token),
            State::Done(_) => None,
        }
    }

    /// Checks the status once. Returns `true` when the operation is done.
    pub async fn poll_once(&mut self) -> Result<bool> {
        let State::Pending {
            token,
            retry_after,
            poller,
        } = &mut self.state
        else {
            return Ok(true);
        };

        match poller.poll(token).await? {
            PollStatus::InProgress { retry_after: next } => {
                *retry_after = next;
                Ok(false)
            }
            PollStatus::Succeeded(value) => {
                log::debug!("[{}] Operation '{}' completed", self.service, self.operation);
                self.state = State::Done(value);
                Ok(true)
            }
        }
    }

    /// Final value of a done operation.
    ///
    /// Fails with [`ProviderError::OperationIncomplete`] while still pending.
    pub fn into_result(self) -> Result<T> {
        match self.state {
            State::Done(value) => Ok(value),
            State::Pending { .. } => Err(ProviderError::OperationIncomplete {
                service: self.service,
                operation: self.operation,
            }),
        }
    }

    /// Polls until the operation is done, fails, or the bounds are exhausted.
    pub async fn wait(mut self) -> Result<T> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        while !self.is_done() {
            let elapsed = started.elapsed();
            if attempts >= self.options.max_attempts || elapsed >= self.options.timeout {
                log::warn!(
                    "[{}] Operation '{}' not done after {attempts} polls ({}s)",
                    self.service,
                    self.operation,
                    elapsed.as_secs()
                );
                return Err(ProviderError::OperationTimedOut {
                    service: self.service,
                    operation: self.operation,
                    attempts,
                });
            }

            let delay = self.next_delay().min(self.options.timeout - elapsed);
            tokio::time::sleep(delay).await;

            attempts += 1;
            let remaining = self.options.timeout.saturating_sub(started.elapsed());
            let Ok(polled) = tokio::time::timeout(remaining, self.poll_once()).await else {
                log::warn!(
                    "[{}] Operation '{}' status check outlived the {}s polling timeout",
                    self.service,
                    self.operation,
                    self.options.timeout.as_secs()
                );
                return Err(ProviderError::OperationTimedOut {
                    service: self.service,
                    operation: self.operation,
                    attempts,
                });
            };
            polled?;
        }

        self.into_result()
    }

    /// Like [`wait`](Self::wait), but gives up with [`ProviderError::Cancelled`]
    /// as soon as `signal` resolves. The in-flight request is dropped.
    pub async fn wait_with_cancellation<F>(self, signal: F) -> Result<T>
    where
        F: Future<Output = ()>,
    {
        let service = self.service.clone();
        let operation = self.operation.clone();

        tokio::select! {
            result = self.wait() => result,
            () = signal => {
                log::warn!("[{service}] Operation '{operation}' cancelled by caller");
                Err(ProviderError::Cancelled { service, operation })
            }
        }
    }

    fn next_delay(&self) -> Duration {
        let server = match &self.state {
            State::Pending { retry_after, .. } => *retry_after,
            State::Done(_) => None,
        };
        server
            .unwrap_or(self.options.interval)
            .min(self.options.max_interval)
    }
}
