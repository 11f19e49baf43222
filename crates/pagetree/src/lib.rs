//! Pagetree: page-object-model component trees for WebDriver UI tests
//!
//! A page is declared as a tree of components. Children are built lazily on
//! first access and memoized; every component re-resolves its element on each
//! call, scoped to its parent's element when asked to. Readiness is expressed
//! as a list of conditions polled concurrently against one deadline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PAGETREE Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Page /     │    │ Component  │    │ Driver     │            │
//! │   │ Blueprints │───►│ Tree       │───►│ (WebDriver │            │
//! │   │            │    │ + waits    │    │  or mock)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pagetree::prelude::*;
//!
//! struct SearchBox(Component);
//!
//! impl PageComponent for SearchBox {
//!     fn blueprint() -> Blueprint {
//!         Blueprint::fixed(Locator::name("q"))
//!     }
//!
//!     fn from_component(component: Component) -> Self {
//!         Self(component)
//!     }
//! }
//!
//! let page = Page::new(driver, PageBlueprint::new().with_child::<SearchBox>("search"));
//! let search: SearchBox = page.child_as("search")?;
//! search.0.send_keys("rust").await?;
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod component;
mod driver;
mod frame;
mod locator;
mod manager;
#[allow(clippy::missing_errors_doc)]
pub mod mock;
mod page;
mod result;
mod tree;
mod wait;
/// WebDriver backend over fantoccini
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use component::{Component, ReferenceNode};
pub use driver::{
    Driver, DriverError, DriverErrorKind, DriverResult, ElementRef, RemoteElement, SearchContext,
    ShadowRootRef,
};
pub use frame::FrameComponent;
pub use locator::{Locator, Rect};
pub use manager::ComponentManager;
pub use page::{Page, PageObject};
pub use result::{PagetreeError, PagetreeResult};
pub use tree::{
    Blueprint, ChildDescriptor, ChildMapping, LocatorFn, NodeHandle, NodeId, NodeKind,
    PageBlueprint, PageComponent,
};
pub use wait::{
    wait_for_all, Condition, ConditionFuture, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::component::*;
    pub use super::driver::*;
    pub use super::frame::*;
    pub use super::locator::*;
    pub use super::manager::*;
    pub use super::page::*;
    pub use super::result::*;
    pub use super::tree::*;
    pub use super::wait::*;
}
