//! In-memory driver for unit testing page objects.
//!
//! Elements are registered against a scope (the document, a frame's
//! document, an element, or a shadow root) and a [`Locator`]. Every driver
//! and element call is recorded in the call history as `method:args`, for
//! example `find_element:document:id=parent` or `click:c1`.

use crate::driver::{
    Driver, DriverError, DriverResult, ElementRef, RemoteElement, SearchContext, ShadowRootRef,
};
use crate::locator::{Locator, Rect};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const DOCUMENT: &str = "document";

/// Scripted state of one mock element
#[derive(Debug, Clone, Default)]
pub struct MockElementState {
    /// Element reference id
    pub id: String,
    /// Tag name
    pub tag_name: String,
    /// Rendered text
    pub text: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Computed CSS values
    pub css: HashMap<String, String>,
    /// Rectangle
    pub rect: Rect,
    /// Displayed flag
    pub displayed: bool,
    /// Enabled flag
    pub enabled: bool,
    /// Selected flag
    pub selected: bool,
    /// Whether the element can be entered as a frame
    pub is_frame: bool,
    /// Whether the element has an open shadow root
    pub has_shadow_root: bool,
    /// Whether every call reports a stale reference
    pub stale: bool,
    /// Error returned by every call, checked after staleness
    pub failure: Option<DriverError>,
    /// Screenshot bytes
    pub screenshot: Vec<u8>,
    /// Text typed so far
    pub typed: String,
    /// Click count
    pub clicks: usize,
    /// Clear count
    pub clears: usize,
    /// Submit count
    pub submits: usize,
}

impl MockElementState {
    /// Displayed, enabled `div` with the given id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: "div".to_string(),
            displayed: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Set tag name
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = tag.into();
        self
    }

    /// Set text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a computed CSS value
    #[must_use]
    pub fn with_css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(property.into(), value.into());
        self
    }

    /// Set rectangle
    #[must_use]
    pub const fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Set screenshot bytes
    #[must_use]
    pub fn with_screenshot(mut self, png: Vec<u8>) -> Self {
        self.screenshot = png;
        self
    }

    /// Not displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Not enabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Selected
    #[must_use]
    pub const fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// An `iframe` that can be entered
    #[must_use]
    pub fn frame(mut self) -> Self {
        self.tag_name = "iframe".to_string();
        self.is_frame = true;
        self
    }

    /// Has an open shadow root
    #[must_use]
    pub const fn with_shadow_root(mut self) -> Self {
        self.has_shadow_root = true;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    elements: HashMap<String, MockElementState>,
    lookups: HashMap<(String, Locator), Vec<String>>,
    frame_stack: Vec<String>,
    frame_switches: usize,
    call_history: Vec<String>,
}

impl MockState {
    fn record(&mut self, call: String) {
        self.call_history.push(call);
    }

    fn document_scope(&self) -> String {
        self.frame_stack
            .last()
            .map_or_else(|| DOCUMENT.to_string(), |frame| format!("frame:{frame}"))
    }

    fn check(&self, id: &str) -> DriverResult<&MockElementState> {
        let element = self
            .elements
            .get(id)
            .ok_or_else(|| DriverError::stale_element_reference(format!("element {id} unknown")))?;
        if element.stale {
            return Err(DriverError::stale_element_reference(format!(
                "element {id} is no longer attached to the DOM"
            )));
        }
        if let Some(failure) = &element.failure {
            return Err(failure.clone());
        }
        Ok(element)
    }

    fn check_mut(&mut self, id: &str) -> DriverResult<&mut MockElementState> {
        self.check(id)?;
        self.elements
            .get_mut(id)
            .ok_or_else(|| DriverError::stale_element_reference(format!("element {id} unknown")))
    }

    fn matches(&self, scope: &str, locator: &Locator) -> Vec<String> {
        self.lookups
            .get(&(scope.to_string(), locator.clone()))
            .cloned()
            .unwrap_or_default()
    }

    fn register(&mut self, scope: String, locator: Locator, element: MockElementState) {
        let id = element.id.clone();
        self.lookups.entry((scope, locator)).or_default().push(id.clone());
        self.elements.insert(id, element);
    }
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn find_in(state: &Shared, scope: &str, locator: &Locator) -> DriverResult<ElementRef> {
    let ids = lock(state).matches(scope, locator);
    let id = ids
        .into_iter()
        .next()
        .ok_or_else(|| DriverError::no_such_element(format!("Unable to locate element: {locator}")))?;
    Ok(Arc::new(MockElement {
        id,
        state: Arc::clone(state),
    }))
}

fn find_all_in(state: &Shared, scope: &str, locator: &Locator) -> Vec<ElementRef> {
    lock(state)
        .matches(scope, locator)
        .into_iter()
        .map(|id| {
            Arc::new(MockElement {
                id,
                state: Arc::clone(state),
            }) as ElementRef
        })
        .collect()
}

/// Mock driver for unit testing.
///
/// Clones share state, so a test can keep one clone for scripting and
/// inspection while the page owns another.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Shared,
}

impl MockDriver {
    /// Create an empty mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `element` findable from the top-level document
    pub fn add_element(&self, locator: Locator, element: MockElementState) {
        lock(&self.state).register(DOCUMENT.to_string(), locator, element);
    }

    /// Make `element` findable from inside the frame `frame_id`
    pub fn add_frame_element(&self, frame_id: &str, locator: Locator, element: MockElementState) {
        lock(&self.state).register(format!("frame:{frame_id}"), locator, element);
    }

    /// Make `element` findable from the element `parent_id`
    pub fn add_child(&self, parent_id: &str, locator: Locator, element: MockElementState) {
        lock(&self.state).register(parent_id.to_string(), locator, element);
    }

    /// Make `element` findable from the shadow root of `host_id`
    pub fn add_shadow_child(&self, host_id: &str, locator: Locator, element: MockElementState) {
        let mut state = lock(&self.state);
        if let Some(host) = state.elements.get_mut(host_id) {
            host.has_shadow_root = true;
        }
        state.register(format!("shadow:{host_id}"), locator, element);
    }

    /// Mark an element stale (or live again)
    pub fn set_stale(&self, id: &str, stale: bool) {
        if let Some(element) = lock(&self.state).elements.get_mut(id) {
            element.stale = stale;
        }
    }

    /// Make every call on an element fail with `failure`
    pub fn set_failure(&self, id: &str, failure: Option<DriverError>) {
        if let Some(element) = lock(&self.state).elements.get_mut(id) {
            element.failure = failure;
        }
    }

    /// Remove an element from the DOM: it can no longer be found and
    /// references already handed out go stale
    pub fn detach(&self, id: &str) {
        let mut state = lock(&self.state);
        for ids in state.lookups.values_mut() {
            ids.retain(|candidate| candidate != id);
        }
        if let Some(element) = state.elements.get_mut(id) {
            element.stale = true;
        }
    }

    /// Snapshot of an element's state
    #[must_use]
    pub fn element(&self, id: &str) -> Option<MockElementState> {
        lock(&self.state).elements.get(id).cloned()
    }

    /// Call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.state).call_history.clone()
    }

    /// Check if a call starting with `method` was made
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        lock(&self.state)
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Number of calls starting with `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        lock(&self.state)
            .call_history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    /// Number of single-element lookups from any scope
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.call_count("find_element:")
    }

    /// Forget recorded calls
    pub fn clear_history(&self) {
        lock(&self.state).call_history.clear();
    }

    /// Depth of the active browsing context, 0 at top level
    #[must_use]
    pub fn frame_depth(&self) -> usize {
        lock(&self.state).frame_stack.len()
    }

    /// Successful switches into a frame so far
    #[must_use]
    pub fn frame_switches(&self) -> usize {
        lock(&self.state).frame_switches
    }

    /// Id of the active frame, `None` at top level
    #[must_use]
    pub fn current_frame(&self) -> Option<String> {
        lock(&self.state).frame_stack.last().cloned()
    }
}

#[async_trait]
impl SearchContext for MockDriver {
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        let scope = {
            let mut state = lock(&self.state);
            let scope = state.document_scope();
            state.record(format!("find_element:{scope}:{locator}"));
            scope
        };
        find_in(&self.state, &scope, locator)
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let scope = {
            let mut state = lock(&self.state);
            let scope = state.document_scope();
            state.record(format!("find_elements:{scope}:{locator}"));
            scope
        };
        Ok(find_all_in(&self.state, &scope, locator))
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn switch_to_frame(&self, frame: &ElementRef) -> DriverResult<()> {
        let mock = frame
            .as_any()
            .downcast_ref::<MockElement>()
            .ok_or_else(|| DriverError::other("element does not belong to this driver"))?;
        let mut state = lock(&self.state);
        state.record(format!("switch_to_frame:{}", mock.id));
        if !state.check(&mock.id)?.is_frame {
            return Err(DriverError::no_such_frame(format!(
                "element {} is not a frame",
                mock.id
            )));
        }
        state.frame_stack.push(mock.id.clone());
        state.frame_switches += 1;
        Ok(())
    }

    async fn switch_to_parent_frame(&self) -> DriverResult<()> {
        let mut state = lock(&self.state);
        state.record("switch_to_parent_frame".to_string());
        state.frame_stack.pop();
        Ok(())
    }
}

/// Element handed out by [`MockDriver`]
pub struct MockElement {
    id: String,
    state: Shared,
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockElement").field("id", &self.id).finish()
    }
}

impl MockElement {
    fn probe<T>(&self, method: &str, read: impl FnOnce(&MockElementState) -> T) -> DriverResult<T> {
        let mut state = lock(&self.state);
        state.record(format!("{method}:{}", self.id));
        state.check(&self.id).map(read)
    }

    fn act(&self, call: String, write: impl FnOnce(&mut MockElementState)) -> DriverResult<()> {
        let mut state = lock(&self.state);
        state.record(call);
        state.check_mut(&self.id).map(write)
    }
}

#[async_trait]
impl SearchContext for MockElement {
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        {
            let mut state = lock(&self.state);
            state.record(format!("find_element:{}:{locator}", self.id));
            state.check(&self.id)?;
        }
        find_in(&self.state, &self.id, locator)
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        {
            let mut state = lock(&self.state);
            state.record(format!("find_elements:{}:{locator}", self.id));
            state.check(&self.id)?;
        }
        Ok(find_all_in(&self.state, &self.id, locator))
    }
}

#[async_trait]
impl RemoteElement for MockElement {
    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn element_id(&self) -> DriverResult<String> {
        self.probe("element_id", |e| e.id.clone())
    }

    async fn click(&self) -> DriverResult<()> {
        self.act(format!("click:{}", self.id), |e| e.clicks += 1)
    }

    async fn clear(&self) -> DriverResult<()> {
        self.act(format!("clear:{}", self.id), |e| {
            e.clears += 1;
            e.typed.clear();
        })
    }

    async fn submit(&self) -> DriverResult<()> {
        self.act(format!("submit:{}", self.id), |e| e.submits += 1)
    }

    async fn send_keys(&self, text: &str) -> DriverResult<()> {
        self.act(format!("send_keys:{}:{text}", self.id), |e| e.typed.push_str(text))
    }

    async fn text(&self) -> DriverResult<String> {
        self.probe("text", |e| e.text.clone())
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.probe("attribute", |e| e.attributes.get(name).cloned())
    }

    async fn css_value(&self, property: &str) -> DriverResult<String> {
        self.probe("css_value", |e| e.css.get(property).cloned().unwrap_or_default())
    }

    async fn tag_name(&self) -> DriverResult<String> {
        self.probe("tag_name", |e| e.tag_name.clone())
    }

    async fn rect(&self) -> DriverResult<Rect> {
        self.probe("rect", |e| e.rect)
    }

    async fn is_displayed(&self) -> DriverResult<bool> {
        self.probe("is_displayed", |e| e.displayed)
    }

    async fn is_enabled(&self) -> DriverResult<bool> {
        self.probe("is_enabled", |e| e.enabled)
    }

    async fn is_selected(&self) -> DriverResult<bool> {
        self.probe("is_selected", |e| e.selected)
    }

    async fn screenshot(&self, scroll_into_view: bool) -> DriverResult<Vec<u8>> {
        let mut state = lock(&self.state);
        state.record(format!("screenshot:{}:{scroll_into_view}", self.id));
        state.check(&self.id).map(|e| e.screenshot.clone())
    }

    async fn shadow_root(&self) -> DriverResult<ShadowRootRef> {
        let has_shadow_root = self.probe("shadow_root", |e| e.has_shadow_root)?;
        if !has_shadow_root {
            return Err(DriverError::other(format!(
                "no such shadow root: element {} has none",
                self.id
            )));
        }
        Ok(Arc::new(MockShadowRoot {
            host: self.id.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockShadowRoot {
    host: String,
    state: Shared,
}

#[async_trait]
impl SearchContext for MockShadowRoot {
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        let scope = format!("shadow:{}", self.host);
        lock(&self.state).record(format!("find_element:{scope}:{locator}"));
        find_in(&self.state, &scope, locator)
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let scope = format!("shadow:{}", self.host);
        lock(&self.state).record(format!("find_elements:{scope}:{locator}"));
        Ok(find_all_in(&self.state, &scope, locator))
    }
}
