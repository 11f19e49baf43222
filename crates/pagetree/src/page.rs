//! The root of a component tree.
//!
//! # Example
//!
//! ```ignore
//! struct LoginPage(Page);
//!
//! impl PageObject for LoginPage {
//!     fn blueprint() -> PageBlueprint {
//!         PageBlueprint::new()
//!             .with_timeout(5_000)
//!             .with_child::<LoginForm>("login_form")
//!     }
//!
//!     fn from_page(page: Page) -> Self {
//!         Self(page)
//!     }
//! }
//!
//! let login = Page::open::<LoginPage>(driver);
//! login.0.loaded().await?;
//! ```

use crate::driver::Driver;
use crate::manager::ComponentManager;
use crate::tree::{NodeHandle, PageBlueprint, Tree};
use std::fmt;
use std::sync::Arc;

/// Typed page wrappers
pub trait PageObject: Sized {
    /// Declaration of the page
    fn blueprint() -> PageBlueprint;

    /// Wrap the built page
    fn from_page(page: Page) -> Self;
}

/// The root node. Owns the driver shared by every component below it.
#[derive(Clone)]
pub struct Page {
    handle: NodeHandle,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("options", &self.handle.options())
            .field("nodes", &self.handle.tree_size())
            .finish()
    }
}

impl ComponentManager for Page {
    fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}

impl Page {
    /// Build a page over `driver`
    #[must_use]
    pub fn new<D: Driver + 'static>(driver: D, blueprint: PageBlueprint) -> Self {
        Self::from_shared(Arc::new(driver), blueprint)
    }

    /// Build a page over an already shared driver
    #[must_use]
    pub fn from_shared(driver: Arc<dyn Driver>, blueprint: PageBlueprint) -> Self {
        Self {
            handle: Tree::new_page(driver, blueprint),
        }
    }

    /// Build the typed page object `T`
    #[must_use]
    pub fn open<T: PageObject>(driver: impl Driver + 'static) -> T {
        T::from_page(Self::new(driver, T::blueprint()))
    }

    pub(crate) const fn from_handle(handle: NodeHandle) -> Self {
        Self { handle }
    }

    /// Nodes built so far, the page included
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.handle.tree_size()
    }
}
