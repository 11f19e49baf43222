//! Iframe components.

use crate::component::Component;
use crate::manager::ComponentManager;
use crate::result::PagetreeResult;
use crate::tree::NodeHandle;
use tracing::{debug, trace};

/// A component whose element is an iframe the driver can enter
#[derive(Debug, Clone)]
pub struct FrameComponent {
    component: Component,
}

impl ComponentManager for FrameComponent {
    fn handle(&self) -> &NodeHandle {
        self.component.handle()
    }
}

impl FrameComponent {
    pub(crate) const fn new(component: Component) -> Self {
        Self { component }
    }

    /// The underlying component, for element access
    #[must_use]
    pub const fn component(&self) -> &Component {
        &self.component
    }

    /// Make the iframe the active browsing context
    pub async fn switch_to(&self) -> PagetreeResult<()> {
        let element = self.component.get_element().await?;
        self.driver().switch_to_frame(&element).await?;
        debug!(node = %self.component.id(), "switched into frame");
        Ok(())
    }

    /// Whether the element can be entered as a frame.
    ///
    /// On success the driver is switched back to the parent, so the active
    /// context is the same before and after.
    pub async fn able_to_switch_to_frame(&self) -> PagetreeResult<bool> {
        match self.switch_to().await {
            Ok(()) => {
                self.component.switch_to_parent_frame().await?;
                Ok(true)
            }
            Err(err) if err.is_no_such_frame() => {
                trace!(node = %self.component.id(), "element is not a frame");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Whether the iframe is present and can be entered
    pub async fn iframe_is_ready(&self) -> PagetreeResult<bool> {
        if !self.component.is_present().await? {
            return Ok(false);
        }
        self.able_to_switch_to_frame().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{DriverError, SearchContext};
    use crate::locator::Locator;
    use crate::mock::{MockDriver, MockElementState};
    use crate::page::Page;
    use crate::tree::{Blueprint, ChildDescriptor, NodeKind, PageBlueprint};

    fn frame_page(driver: &MockDriver) -> FrameComponent {
        let page = Page::new(
            driver.clone(),
            PageBlueprint::new().with_child_descriptor(
                "editor",
                ChildDescriptor::from_fn("Editor", || Blueprint::frame(Locator::id("editor"))),
            ),
        );
        let editor = page.child("editor").unwrap();
        assert_eq!(editor.kind(), NodeKind::Frame);
        editor.as_frame().unwrap()
    }

    #[tokio::test]
    async fn test_absent_frame_is_not_ready() {
        let driver = MockDriver::new();
        let frame = frame_page(&driver);

        assert!(!frame.iframe_is_ready().await.unwrap());
        assert_eq!(driver.frame_switches(), 0);
        assert!(!driver.was_called("switch_to_parent_frame"));
    }

    #[tokio::test]
    async fn test_non_frame_element_is_not_ready() {
        let driver = MockDriver::new();
        driver.add_element(Locator::id("editor"), MockElementState::new("div1").with_tag("div"));
        let frame = frame_page(&driver);

        assert!(!frame.iframe_is_ready().await.unwrap());
        assert_eq!(driver.frame_depth(), 0);
        assert!(frame.switch_to().await.unwrap_err().is_no_such_frame());
    }

    #[tokio::test]
    async fn test_ready_frame_leaves_context_unchanged() {
        let driver = MockDriver::new();
        driver.add_element(Locator::id("editor"), MockElementState::new("f1").frame());
        let frame = frame_page(&driver);

        assert!(frame.iframe_is_ready().await.unwrap());
        assert_eq!(driver.frame_switches(), 1);
        assert_eq!(driver.frame_depth(), 0);
        assert!(driver.was_called("switch_to_frame:f1"));
        assert!(driver.was_called("switch_to_parent_frame"));
    }

    #[tokio::test]
    async fn test_switch_to_enters_frame_document() {
        let driver = MockDriver::new();
        driver.add_element(Locator::id("editor"), MockElementState::new("f1").frame());
        driver.add_frame_element("f1", Locator::id("body"), MockElementState::new("b1"));
        let frame = frame_page(&driver);

        frame.switch_to().await.unwrap();
        assert_eq!(driver.current_frame().as_deref(), Some("f1"));
        let body = driver.find_element(&Locator::id("body")).await.unwrap();
        assert_eq!(body.element_id().await.unwrap(), "b1");

        frame.component().switch_to_parent_frame().await.unwrap();
        assert_eq!(driver.current_frame(), None);
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let driver = MockDriver::new();
        driver.add_element(Locator::id("editor"), MockElementState::new("f1").frame());
        driver.set_failure("f1", Some(DriverError::stale_element_reference("detached")));
        let frame = frame_page(&driver);

        let err = frame.able_to_switch_to_frame().await.unwrap_err();
        assert!(err.is_stale_reference());
    }
}
