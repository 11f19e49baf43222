//! Element access for component nodes.
//!
//! A [`Component`] never holds on to its element. Every call re-resolves it:
//! the reference node is found first (the parent's element when
//! `find_from_parent` is set, the driver otherwise), then one lookup with the
//! component's locator is made from there. Resolving a component nested `n`
//! levels deep with `find_from_parent` set all the way up costs `n` lookups.

use crate::driver::{Driver, ElementRef, ShadowRootRef};
use crate::frame::FrameComponent;
use crate::locator::{Locator, Rect};
use crate::manager::ComponentManager;
use crate::result::{PagetreeError, PagetreeResult};
use crate::tree::{LocatorSource, NodeHandle, NodeId, NodeKind};
use base64::{engine::general_purpose::STANDARD, Engine};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Where a component's lookup starts from
#[derive(Clone)]
pub enum ReferenceNode {
    /// The document root of the active browsing context
    Driver(Arc<dyn Driver>),
    /// The parent component's freshly resolved element
    Element(ElementRef),
}

impl fmt::Debug for ReferenceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(_) => f.write_str("ReferenceNode::Driver"),
            Self::Element(element) => f.debug_tuple("ReferenceNode::Element").field(element).finish(),
        }
    }
}

impl ReferenceNode {
    /// Find the first element matching `locator` from here
    pub async fn find_element(&self, locator: &Locator) -> PagetreeResult<ElementRef> {
        let element = match self {
            Self::Driver(driver) => driver.find_element(locator).await?,
            Self::Element(element) => element.find_element(locator).await?,
        };
        Ok(element)
    }

    /// Find all elements matching `locator` from here
    pub async fn find_elements(&self, locator: &Locator) -> PagetreeResult<Vec<ElementRef>> {
        let elements = match self {
            Self::Driver(driver) => driver.find_elements(locator).await?,
            Self::Element(element) => element.find_elements(locator).await?,
        };
        Ok(elements)
    }

    /// Whether lookups start at the document root
    #[must_use]
    pub const fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}

/// A node of the tree that resolves to one remote element
#[derive(Clone)]
pub struct Component {
    handle: NodeHandle,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.handle.id())
            .field("kind", &self.handle.kind())
            .field("find_from_parent", &self.handle.find_from_parent())
            .finish()
    }
}

impl ComponentManager for Component {
    fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}

impl Component {
    pub(crate) const fn from_handle(handle: NodeHandle) -> Self {
        Self { handle }
    }

    /// Arena id
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.handle.id()
    }

    /// Node kind
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.handle.kind()
    }

    /// Whether lookups are scoped to the parent's element
    #[must_use]
    pub fn find_from_parent(&self) -> bool {
        self.handle.find_from_parent()
    }

    /// Enclosing component, `None` directly under the page
    #[must_use]
    pub fn parent_component(&self) -> Option<Self> {
        self.handle
            .parent()
            .filter(|parent| parent.kind().is_component())
            .map(Self::from_handle)
    }

    /// Current locator. Dynamic components compute it on every call.
    pub fn locator(&self) -> PagetreeResult<Locator> {
        match self.handle.locator_source() {
            LocatorSource::Fixed(Some(locator)) => Ok(locator.clone()),
            LocatorSource::Fixed(None) => Err(PagetreeError::configuration(
                "component requires a locator to be located",
            )),
            LocatorSource::Computed(Some(locate)) => locate(self).ok_or_else(|| {
                PagetreeError::configuration("dynamic component computed no locator")
            }),
            LocatorSource::Computed(None) => Err(PagetreeError::configuration(
                "dynamic component requires a computed locator to be located",
            )),
        }
    }

    /// Where this component's lookup starts
    pub async fn reference_node(&self) -> PagetreeResult<ReferenceNode> {
        if self.handle.find_from_parent() {
            if let Some(parent) = self.parent_component() {
                return Ok(ReferenceNode::Element(parent.resolve().await?));
            }
        }
        Ok(ReferenceNode::Driver(self.driver()))
    }

    fn resolve(&self) -> BoxFuture<'static, PagetreeResult<ElementRef>> {
        let this = self.clone();
        Box::pin(async move {
            let locator = this.locator()?;
            let reference = this.reference_node().await?;
            trace!(
                node = %this.id(),
                locator = %locator,
                from_parent = !reference.is_driver(),
                "resolving element"
            );
            reference.find_element(&locator).await
        })
    }

    /// Resolve the element now. Never cached.
    pub async fn get_element(&self) -> PagetreeResult<ElementRef> {
        self.resolve().await
    }

    /// Whether the element currently resolves
    pub async fn is_present(&self) -> PagetreeResult<bool> {
        match self.get_element().await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // Staleness
    // =========================================================================

    /// Resolve the element and remember it for [`Self::cache_has_gone_stale`]
    pub async fn cache_element_for_staleness_check(&self) -> PagetreeResult<()> {
        let element = self.get_element().await?;
        *self.handle.node().staleness_cache.lock().await = Some(element);
        debug!(node = %self.id(), "cached element for staleness check");
        Ok(())
    }

    /// Whether the cached element no longer backs a live DOM node.
    ///
    /// The cache is kept after the probe; drop it with
    /// [`Self::invalidate_staleness_cache`].
    pub async fn cache_has_gone_stale(&self) -> PagetreeResult<bool> {
        let cached = self.handle.node().staleness_cache.lock().await.clone();
        let element = cached.ok_or_else(|| {
            PagetreeError::configuration(
                "element reference must be cached before it can be checked for staleness",
            )
        })?;
        match element.tag_name().await {
            Ok(_) => Ok(false),
            Err(err) => {
                let err = PagetreeError::from(err);
                if err.is_stale_reference() {
                    trace!(node = %self.id(), "cached element has gone stale");
                    Ok(true)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Drop the cached element
    pub async fn invalidate_staleness_cache(&self) {
        self.handle.node().staleness_cache.lock().await.take();
    }

    /// Whether an element is cached for staleness checks
    pub async fn has_staleness_cache(&self) -> bool {
        self.handle.node().staleness_cache.lock().await.is_some()
    }

    // =========================================================================
    // Element passthrough
    // =========================================================================

    /// Click the element
    pub async fn click(&self) -> PagetreeResult<()> {
        Ok(self.get_element().await?.click().await?)
    }

    /// Clear an editable element
    pub async fn clear(&self) -> PagetreeResult<()> {
        Ok(self.get_element().await?.clear().await?)
    }

    /// Submit the element's form
    pub async fn submit(&self) -> PagetreeResult<()> {
        Ok(self.get_element().await?.submit().await?)
    }

    /// Type text into the element
    pub async fn send_keys(&self, text: &str) -> PagetreeResult<()> {
        Ok(self.get_element().await?.send_keys(text).await?)
    }

    /// Rendered text
    pub async fn text(&self) -> PagetreeResult<String> {
        Ok(self.get_element().await?.text().await?)
    }

    /// Attribute value
    pub async fn attribute(&self, name: &str) -> PagetreeResult<Option<String>> {
        Ok(self.get_element().await?.attribute(name).await?)
    }

    /// Computed CSS value
    pub async fn css_value(&self, property: &str) -> PagetreeResult<String> {
        Ok(self.get_element().await?.css_value(property).await?)
    }

    /// Tag name
    pub async fn tag_name(&self) -> PagetreeResult<String> {
        Ok(self.get_element().await?.tag_name().await?)
    }

    /// Element rectangle
    pub async fn rect(&self) -> PagetreeResult<Rect> {
        Ok(self.get_element().await?.rect().await?)
    }

    /// Remote element reference id
    pub async fn element_id(&self) -> PagetreeResult<String> {
        Ok(self.get_element().await?.element_id().await?)
    }

    /// Whether the element is displayed
    pub async fn is_displayed(&self) -> PagetreeResult<bool> {
        Ok(self.get_element().await?.is_displayed().await?)
    }

    /// Whether the element is enabled
    pub async fn is_enabled(&self) -> PagetreeResult<bool> {
        Ok(self.get_element().await?.is_enabled().await?)
    }

    /// Whether the element is selected
    pub async fn is_selected(&self) -> PagetreeResult<bool> {
        Ok(self.get_element().await?.is_selected().await?)
    }

    /// First descendant matching `locator`
    pub async fn find_element(&self, locator: &Locator) -> PagetreeResult<ElementRef> {
        Ok(self.get_element().await?.find_element(locator).await?)
    }

    /// Every descendant matching `locator`
    pub async fn find_elements(&self, locator: &Locator) -> PagetreeResult<Vec<ElementRef>> {
        Ok(self.get_element().await?.find_elements(locator).await?)
    }

    /// Base64-encoded PNG screenshot of the element
    pub async fn take_screenshot(&self, scroll_into_view: bool) -> PagetreeResult<String> {
        let png = self
            .get_element()
            .await?
            .screenshot(scroll_into_view)
            .await?;
        Ok(STANDARD.encode(png))
    }

    /// The element's shadow root
    pub async fn shadow_root(&self) -> PagetreeResult<ShadowRootRef> {
        Ok(self.get_element().await?.shadow_root().await?)
    }

    /// Make the parent of the active browsing context active
    pub async fn switch_to_parent_frame(&self) -> PagetreeResult<()> {
        trace!(node = %self.id(), "switching to parent frame");
        Ok(self.driver().switch_to_parent_frame().await?)
    }

    /// View this component as an iframe
    pub fn as_frame(&self) -> PagetreeResult<FrameComponent> {
        if self.kind() == NodeKind::Frame {
            Ok(FrameComponent::new(self.clone()))
        } else {
            Err(PagetreeError::configuration(format!(
                "component {} is {:?}, not a frame",
                self.id(),
                self.kind()
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::DriverError;
    use crate::mock::{MockDriver, MockElementState};
    use crate::page::Page;
    use crate::tree::{Blueprint, ChildDescriptor, PageBlueprint};

    fn nested(find_from_parent: bool) -> (MockDriver, Component) {
        let driver = MockDriver::new();
        driver.add_element(Locator::id("parent"), MockElementState::new("p1"));
        driver.add_child("p1", Locator::id("child"), MockElementState::new("c1"));
        driver.add_element(Locator::id("child"), MockElementState::new("c-doc"));

        let page = Page::new(
            driver.clone(),
            PageBlueprint::new().with_child_descriptor(
                "parent",
                ChildDescriptor::from_fn("Parent", move || {
                    Blueprint::fixed(Locator::id("parent")).with_child_descriptor(
                        "child",
                        ChildDescriptor::from_fn("Child", move || {
                            Blueprint::fixed(Locator::id("child"))
                                .find_from_parent(find_from_parent)
                        }),
                    )
                }),
            ),
        );
        let child = page.child("parent").unwrap().child("child").unwrap();
        (driver, child)
    }

    mod resolution_tests {
        use super::*;

        #[tokio::test]
        async fn test_find_from_parent_resolves_parent_first() {
            let (driver, child) = nested(true);
            let element = child.get_element().await.unwrap();

            assert_eq!(element.element_id().await.unwrap(), "c1");
            assert_eq!(driver.lookup_count(), 2);
            assert!(driver.was_called("find_element:document:id=parent"));
            assert!(driver.was_called("find_element:p1:id=child"));
        }

        #[tokio::test]
        async fn test_without_find_from_parent_one_lookup() {
            let (driver, child) = nested(false);
            let element = child.get_element().await.unwrap();

            assert_eq!(element.element_id().await.unwrap(), "c-doc");
            assert_eq!(driver.lookup_count(), 1);
            assert!(!driver.was_called("find_element:document:id=parent"));
        }

        #[tokio::test]
        async fn test_element_is_never_cached() {
            let (driver, child) = nested(true);
            child.get_element().await.unwrap();
            child.get_element().await.unwrap();
            assert_eq!(driver.lookup_count(), 4);
        }

        #[tokio::test]
        async fn test_reference_node_under_page_is_driver() {
            let (_driver, child) = nested(true);
            let parent = child.parent_component().unwrap();
            assert!(parent.parent_component().is_none());
            assert!(parent.reference_node().await.unwrap().is_driver());
            assert!(!child.reference_node().await.unwrap().is_driver());
        }

        #[tokio::test]
        async fn test_missing_locator_is_configuration_error() {
            let driver = MockDriver::new();
            let page = Page::new(
                driver.clone(),
                PageBlueprint::new().with_child_descriptor(
                    "bare",
                    ChildDescriptor::from_fn("Bare", Blueprint::component),
                ),
            );
            let err = page.child("bare").unwrap().get_element().await.unwrap_err();
            assert!(err.is_configuration());
            assert_eq!(driver.lookup_count(), 0);
        }
    }

    mod presence_tests {
        use super::*;

        #[tokio::test]
        async fn test_is_present_classifies_not_found() {
            let (driver, child) = nested(true);
            assert!(child.is_present().await.unwrap());

            driver.detach("c1");
            assert!(!child.is_present().await.unwrap());
        }

        #[tokio::test]
        async fn test_is_present_propagates_other_errors() {
            let (driver, child) = nested(true);
            driver.set_failure("p1", Some(DriverError::other("session deleted")));

            let err = child.is_present().await.unwrap_err();
            assert_eq!(err.to_string(), "unknown error: session deleted");
        }
    }

    mod staleness_tests {
        use super::*;

        #[tokio::test]
        async fn test_check_before_caching_fails() {
            let (driver, child) = nested(false);
            let err = child.cache_has_gone_stale().await.unwrap_err();
            assert!(err.is_configuration());
            assert_eq!(driver.lookup_count(), 0);
        }

        #[tokio::test]
        async fn test_stale_after_caching() {
            let (driver, child) = nested(false);
            child.cache_element_for_staleness_check().await.unwrap();
            assert!(child.has_staleness_cache().await);
            assert!(!child.cache_has_gone_stale().await.unwrap());

            driver.set_stale("c-doc", true);
            assert!(child.cache_has_gone_stale().await.unwrap());
            assert!(child.has_staleness_cache().await);
        }

        #[tokio::test]
        async fn test_probe_does_not_re_resolve() {
            let (driver, child) = nested(false);
            child.cache_element_for_staleness_check().await.unwrap();
            driver.clear_history();
            child.cache_has_gone_stale().await.unwrap();
            assert_eq!(driver.lookup_count(), 0);
            assert!(driver.was_called("tag_name:c-doc"));
        }

        #[tokio::test]
        async fn test_other_probe_errors_propagate() {
            let (driver, child) = nested(false);
            child.cache_element_for_staleness_check().await.unwrap();
            driver.set_failure("c-doc", Some(DriverError::other("boom")));
            let err = child.cache_has_gone_stale().await.unwrap_err();
            assert!(!err.is_stale_reference());
            assert!(!err.is_configuration());
        }

        #[tokio::test]
        async fn test_invalidate() {
            let (_driver, child) = nested(false);
            child.cache_element_for_staleness_check().await.unwrap();
            child.invalidate_staleness_cache().await;
            assert!(!child.has_staleness_cache().await);
            assert!(child.cache_has_gone_stale().await.unwrap_err().is_configuration());
        }
    }

    mod passthrough_tests {
        use super::*;

        #[tokio::test]
        async fn test_interaction_reaches_element() {
            let (driver, child) = nested(false);
            child.click().await.unwrap();
            child.send_keys("hello").await.unwrap();
            child.clear().await.unwrap();

            assert!(driver.was_called("click:c-doc"));
            assert!(driver.was_called("send_keys:c-doc:hello"));
            assert!(driver.was_called("clear:c-doc"));
            assert_eq!(driver.lookup_count(), 3);
        }

        #[tokio::test]
        async fn test_probes() {
            let driver = MockDriver::new();
            driver.add_element(
                Locator::css("button.go"),
                MockElementState::new("b1")
                    .with_tag("button")
                    .with_text("Go")
                    .with_attribute("type", "submit")
                    .with_css("color", "red")
                    .with_rect(Rect::new(1.0, 2.0, 30.0, 10.0))
                    .disabled(),
            );
            let page = Page::new(
                driver.clone(),
                PageBlueprint::new().with_child_descriptor(
                    "go",
                    ChildDescriptor::from_fn("Go", || Blueprint::fixed(Locator::css("button.go"))),
                ),
            );
            let go = page.child("go").unwrap();

            assert_eq!(go.tag_name().await.unwrap(), "button");
            assert_eq!(go.text().await.unwrap(), "Go");
            assert_eq!(go.attribute("type").await.unwrap().as_deref(), Some("submit"));
            assert_eq!(go.attribute("href").await.unwrap(), None);
            assert_eq!(go.css_value("color").await.unwrap(), "red");
            assert_eq!(go.rect().await.unwrap().width, 30.0);
            assert!(go.is_displayed().await.unwrap());
            assert!(!go.is_enabled().await.unwrap());
            assert!(!go.is_selected().await.unwrap());
            assert_eq!(go.element_id().await.unwrap(), "b1");
        }

        #[tokio::test]
        async fn test_screenshot_is_base64() {
            let driver = MockDriver::new();
            driver.add_element(
                Locator::id("logo"),
                MockElementState::new("l1").with_screenshot(vec![0x89, b'P', b'N', b'G']),
            );
            let page = Page::new(
                driver.clone(),
                PageBlueprint::new().with_child_descriptor(
                    "logo",
                    ChildDescriptor::from_fn("Logo", || Blueprint::fixed(Locator::id("logo"))),
                ),
            );
            let shot = page.child("logo").unwrap().take_screenshot(true).await.unwrap();
            assert_eq!(shot, "iVBORw==");
            assert!(driver.was_called("screenshot:l1:true"));
        }

        #[tokio::test]
        async fn test_shadow_root_lookup() {
            let driver = MockDriver::new();
            driver.add_element(Locator::tag_name("my-widget"), MockElementState::new("host"));
            driver.add_shadow_child("host", Locator::css(".inner"), MockElementState::new("in1"));
            let page = Page::new(
                driver.clone(),
                PageBlueprint::new().with_child_descriptor(
                    "widget",
                    ChildDescriptor::from_fn("Widget", || {
                        Blueprint::fixed(Locator::tag_name("my-widget"))
                    }),
                ),
            );
            let root = page.child("widget").unwrap().shadow_root().await.unwrap();
            let inner = root.find_element(&Locator::css(".inner")).await.unwrap();
            assert_eq!(inner.element_id().await.unwrap(), "in1");
        }

        #[tokio::test]
        async fn test_descendant_lookups() {
            let (driver, child) = nested(false);
            driver.add_child("c-doc", Locator::tag_name("li"), MockElementState::new("li1"));
            driver.add_child("c-doc", Locator::tag_name("li"), MockElementState::new("li2"));

            let all = child.find_elements(&Locator::tag_name("li")).await.unwrap();
            assert_eq!(all.len(), 2);
            let first = child.find_element(&Locator::tag_name("li")).await.unwrap();
            assert_eq!(first.element_id().await.unwrap(), "li1");
        }
    }

    mod dynamic_tests {
        use super::*;

        #[tokio::test]
        async fn test_dynamic_without_locator_fails() {
            let page = Page::new(
                MockDriver::new(),
                PageBlueprint::new().with_child_descriptor(
                    "row",
                    ChildDescriptor::from_fn("Row", Blueprint::dynamic),
                ),
            );
            let row = page.child("row").unwrap();
            assert_eq!(row.kind(), NodeKind::Dynamic);
            let err = row.get_element().await.unwrap_err();
            assert!(err.is_configuration());
            assert!(err.to_string().contains("computed locator"));
        }

        #[tokio::test]
        async fn test_dynamic_locator_is_computed_per_access() {
            let driver = MockDriver::new();
            driver.add_element(Locator::css("tr:nth-child(2)"), MockElementState::new("r2"));
            let index = 2;
            let page = Page::new(
                driver.clone(),
                PageBlueprint::new().with_child_descriptor(
                    "row",
                    ChildDescriptor::from_fn("Row", move || {
                        Blueprint::dynamic_with(move |_| {
                            Some(Locator::css(format!("tr:nth-child({index})")))
                        })
                    }),
                ),
            );
            let row = page.child("row").unwrap();
            assert_eq!(row.locator().unwrap(), Locator::css("tr:nth-child(2)"));
            assert_eq!(row.element_id().await.unwrap(), "r2");
        }
    }

    #[test]
    fn test_as_frame_rejects_static() {
        let (_driver, child) = nested(false);
        let err = child.as_frame().unwrap_err();
        assert!(err.is_configuration());
    }
}
