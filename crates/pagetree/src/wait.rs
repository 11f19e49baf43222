//! Readiness waits.
//!
//! [`wait_for_all`] runs every [`Condition`] in its own poll loop against one
//! shared deadline. The first loop to fail decides the outcome; the other
//! loops are detached and left to finish on their own, their results are
//! discarded.

use crate::result::{PagetreeError, PagetreeResult};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default deadline for `wait()` (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default delay between two evaluations of one condition (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Per-node timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Time allowed for all conditions, in milliseconds
    pub timeout_ms: u64,
    /// Delay between evaluations of one condition, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// CONDITION
// =============================================================================

/// Boxed future returned by one condition evaluation
pub type ConditionFuture = BoxFuture<'static, PagetreeResult<bool>>;

type CheckFn = dyn Fn() -> ConditionFuture + Send + Sync;

/// An async boolean predicate gating readiness
#[derive(Clone)]
pub struct Condition {
    description: String,
    check: Arc<CheckFn>,
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Condition {
    /// Create a condition from an async closure.
    ///
    /// The closure is called once per poll; each call must produce a fresh
    /// future, so capture component handles by clone.
    pub fn new<F, Fut>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PagetreeResult<bool>> + Send + 'static,
    {
        Self {
            description: description.into(),
            check: Arc::new(move || -> ConditionFuture { Box::pin(check()) }),
        }
    }

    /// Description used in logs and timeout errors
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluate the predicate once
    pub fn check(&self) -> ConditionFuture {
        (self.check)()
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Summary of a successful wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitResult {
    /// Time from the start of the wait until the last condition succeeded
    pub elapsed: Duration,
    /// Number of conditions that were waited on
    pub conditions: usize,
}

// =============================================================================
// ENGINE
// =============================================================================

/// Wait until every condition holds, or fail.
///
/// One deadline (`now + timeout`) is computed up front and shared by all
/// loops. Each loop evaluates its predicate, succeeds on `true`, fails
/// immediately on an error, and otherwise fails with
/// [`PagetreeError::Timeout`] once the deadline has passed or sleeps
/// `poll_interval` and retries. With `timeout_ms = 0` each condition is
/// evaluated exactly once.
///
/// Must be called from within a tokio runtime; on a multi-thread runtime the
/// loops may run in parallel on worker threads.
///
/// Loops are spawned on the current tokio runtime. When one fails, the join
/// handles of the others are dropped: they keep polling until their own
/// success, timeout or error, and nobody observes the result.
pub async fn wait_for_all(
    conditions: Vec<Condition>,
    options: WaitOptions,
) -> PagetreeResult<WaitResult> {
    let start = Instant::now();
    let deadline = start + options.timeout();
    let total = conditions.len();

    if total == 0 {
        return Ok(WaitResult {
            elapsed: start.elapsed(),
            conditions: 0,
        });
    }

    debug!(
        conditions = total,
        timeout_ms = options.timeout_ms,
        poll_interval_ms = options.poll_interval_ms,
        "waiting for conditions"
    );

    let mut loops: FuturesUnordered<_> = conditions
        .into_iter()
        .map(|condition| {
            let description = condition.description().to_string();
            let handle = tokio::spawn(poll_condition(condition, deadline, options));
            async move { (description, handle.await) }
        })
        .collect();

    while let Some((description, joined)) = loops.next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                debug!(condition = %description, error = %err, "wait failed");
                return Err(err);
            }
            Err(join_err) => {
                return Err(PagetreeError::ConditionAborted {
                    description,
                    message: join_err.to_string(),
                });
            }
        }
    }

    let elapsed = start.elapsed();
    debug!(conditions = total, elapsed_ms = elapsed.as_millis() as u64, "conditions met");
    Ok(WaitResult {
        elapsed,
        conditions: total,
    })
}

async fn poll_condition(
    condition: Condition,
    deadline: Instant,
    options: WaitOptions,
) -> PagetreeResult<()> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        if condition.check().await? {
            trace!(condition = condition.description(), attempt, "condition met");
            return Ok(());
        }
        if Instant::now() >= deadline {
            warn!(
                condition = condition.description(),
                attempt,
                timeout_ms = options.timeout_ms,
                "condition not met by deadline"
            );
            return Err(PagetreeError::Timeout {
                ms: options.timeout_ms,
                description: condition.description().to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
