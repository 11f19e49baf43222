//! Locator criteria for finding one remote element.
//!
//! A [`Locator`] is opaque to the component tree: it is handed to the driver
//! unchanged. Backends that only understand CSS can use [`Locator::to_css`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Criteria used to find a remote element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "using", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Element `id` attribute
    Id(String),
    /// XPath expression
    XPath(String),
    /// Exact link text of an anchor
    LinkText(String),
    /// Element `name` attribute
    Name(String),
    /// Tag name
    TagName(String),
    /// Single class name
    ClassName(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
}

impl Locator {
    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a link text locator
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Create a name attribute locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a tag name locator
    #[must_use]
    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    /// Create a class name locator
    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    /// Create a test ID locator
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Strategy name, as used in the W3C "using" field
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::Id(_) => "id",
            Self::XPath(_) => "xpath",
            Self::LinkText(_) => "link text",
            Self::Name(_) => "name",
            Self::TagName(_) => "tag name",
            Self::ClassName(_) => "class name",
            Self::TestId(_) => "test id",
        }
    }

    /// Raw criteria value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(v)
            | Self::Id(v)
            | Self::XPath(v)
            | Self::LinkText(v)
            | Self::Name(v)
            | Self::TagName(v)
            | Self::ClassName(v)
            | Self::TestId(v) => v,
        }
    }

    /// Equivalent CSS selector, when one exists.
    ///
    /// XPath and link text have no CSS form.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Css(s) => Some(s.clone()),
            Self::Id(id) => Some(format!("[id={}]", css_string(id))),
            Self::Name(name) => Some(format!("[name={}]", css_string(name))),
            Self::TagName(tag) => Some(tag.clone()),
            Self::ClassName(class) => Some(format!("[class~={}]", css_string(class))),
            Self::TestId(id) => Some(format!("[data-testid={}]", css_string(id))),
            Self::XPath(_) | Self::LinkText(_) => None,
        }
    }
}

fn css_string(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

/// Element rectangle in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers any area
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}
