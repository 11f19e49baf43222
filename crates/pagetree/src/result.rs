//! Result and error types for pagetree.

use crate::driver::{DriverError, DriverErrorKind};
use thiserror::Error;

/// Result type for pagetree operations
pub type PagetreeResult<T> = Result<T, PagetreeError>;

/// Errors that can occur while resolving or waiting on components
#[derive(Debug, Error)]
pub enum PagetreeError {
    /// The component tree was used in a way its declaration does not allow
    /// (missing locator, staleness probe before caching, unknown child name).
    /// Never retried.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// A readiness condition was still false at the deadline
    #[error("Condition {description:?} not satisfied within {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the condition that timed out
        description: String,
    },

    /// A poll task ended without producing an outcome (it panicked)
    #[error("Condition {description:?} aborted: {message}")]
    ConditionAborted {
        /// Description of the condition
        description: String,
        /// Join failure detail
        message: String,
    },

    /// Error reported by the remote automation client, passed through as-is
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl PagetreeError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Kind of the underlying driver failure, if this is one
    #[must_use]
    pub const fn driver_kind(&self) -> Option<DriverErrorKind> {
        match self {
            Self::Driver(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Remote "no such element"
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.driver_kind() == Some(DriverErrorKind::NoSuchElement)
    }

    /// Remote "stale element reference"
    #[must_use]
    pub fn is_stale_reference(&self) -> bool {
        self.driver_kind() == Some(DriverErrorKind::StaleElementReference)
    }

    /// Remote "no such frame"
    #[must_use]
    pub fn is_no_such_frame(&self) -> bool {
        self.driver_kind() == Some(DriverErrorKind::NoSuchFrame)
    }

    /// Deadline expired in `wait()`
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Misuse of the component declaration
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
