//! Remote automation client seam.
//!
//! The component tree never talks to a browser itself. Everything remote goes
//! through the traits below, so the same page objects run against a real
//! WebDriver session (see the `webdriver` feature) or the in-memory
//! [`MockDriver`](crate::mock::MockDriver).
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  SearchContext   find_element / find_elements           │
//! │     ├── Driver          + switch_to_frame / parent      │
//! │     └── RemoteElement   + probes / interaction          │
//! └────────────────────────────────────────────────────────┘
//! ```

use crate::locator::{Locator, Rect};
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared handle to one remote element
pub type ElementRef = Arc<dyn RemoteElement>;

/// Shared handle to an element's shadow root
pub type ShadowRootRef = Arc<dyn SearchContext>;

/// Result type for raw driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Failure classes the component tree reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverErrorKind {
    /// No element matched the locator
    NoSuchElement,
    /// A previously resolved element no longer backs a live DOM node
    StaleElementReference,
    /// The element cannot be entered as a browsing context
    NoSuchFrame,
    /// Anything else the client reports
    Other,
}

impl DriverErrorKind {
    /// W3C error code for this kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoSuchElement => "no such element",
            Self::StaleElementReference => "stale element reference",
            Self::NoSuchFrame => "no such frame",
            Self::Other => "unknown error",
        }
    }
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by the automation client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct DriverError {
    /// Classification
    pub kind: DriverErrorKind,
    /// Original detail from the client
    pub message: String,
}

impl DriverError {
    /// Create a driver error
    #[must_use]
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// "no such element"
    #[must_use]
    pub fn no_such_element(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::NoSuchElement, message)
    }

    /// "stale element reference"
    #[must_use]
    pub fn stale_element_reference(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::StaleElementReference, message)
    }

    /// "no such frame"
    #[must_use]
    pub fn no_such_frame(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::NoSuchFrame, message)
    }

    /// Any other failure
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Other, message)
    }
}

/// Something elements can be looked up from: the document root, an element,
/// or a shadow root.
#[async_trait]
pub trait SearchContext: Send + Sync {
    /// Find the first element matching `locator`
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef>;

    /// Find all elements matching `locator`
    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>>;
}

/// The automation session.
///
/// One driver is shared, unsynchronized, by every node in a tree. Concurrent
/// calls are allowed to race; the remote end serializes its own queue.
#[async_trait]
pub trait Driver: SearchContext {
    /// Make `frame` the active browsing context
    async fn switch_to_frame(&self, frame: &ElementRef) -> DriverResult<()>;

    /// Make the parent of the active browsing context active
    async fn switch_to_parent_frame(&self) -> DriverResult<()>;
}

/// One resolved remote element
#[async_trait]
pub trait RemoteElement: SearchContext + fmt::Debug {
    /// Backend access for drivers that need their own element type back
    fn as_any(&self) -> &dyn Any;

    /// Opaque element reference id
    async fn element_id(&self) -> DriverResult<String>;

    /// Click the element
    async fn click(&self) -> DriverResult<()>;

    /// Clear an editable element
    async fn clear(&self) -> DriverResult<()>;

    /// Submit the form the element belongs to
    async fn submit(&self) -> DriverResult<()>;

    /// Type text into the element
    async fn send_keys(&self, text: &str) -> DriverResult<()>;

    /// Rendered text
    async fn text(&self) -> DriverResult<String>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    /// Computed CSS property value
    async fn css_value(&self, property: &str) -> DriverResult<String>;

    /// Lower-case tag name
    async fn tag_name(&self) -> DriverResult<String>;

    /// Element rectangle
    async fn rect(&self) -> DriverResult<Rect>;

    /// Whether the element is displayed
    async fn is_displayed(&self) -> DriverResult<bool>;

    /// Whether the element is enabled
    async fn is_enabled(&self) -> DriverResult<bool>;

    /// Whether the element is selected/checked
    async fn is_selected(&self) -> DriverResult<bool>;

    /// PNG screenshot of the element, optionally scrolling it into view first
    async fn screenshot(&self, scroll_into_view: bool) -> DriverResult<Vec<u8>>;

    /// The element's open shadow root
    async fn shadow_root(&self) -> DriverResult<ShadowRootRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(DriverErrorKind::NoSuchElement.as_str(), "no such element");
        assert_eq!(
            DriverErrorKind::StaleElementReference.to_string(),
            "stale element reference"
        );
        assert_eq!(DriverErrorKind::NoSuchFrame.as_str(), "no such frame");
    }

    #[test]
    fn test_error_display_keeps_detail() {
        let err = DriverError::no_such_element("Unable to locate css=#nope");
        assert_eq!(err.kind, DriverErrorKind::NoSuchElement);
        assert_eq!(err.to_string(), "no such element: Unable to locate css=#nope");
    }
}
