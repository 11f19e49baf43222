//! WebDriver backend over a [`fantoccini::Client`].
//!
//! Enabled with the `webdriver` feature. W3C error codes are mapped onto
//! [`DriverErrorKind`]; everything the component tree does not react to
//! becomes [`DriverErrorKind::Other`] with the client's message kept.

use crate::driver::{
    Driver, DriverError, DriverErrorKind, DriverResult, ElementRef, RemoteElement, SearchContext,
    ShadowRootRef,
};
use crate::locator::{Locator, Rect};
use async_trait::async_trait;
use fantoccini::error::{CmdError, ErrorStatus, WebDriver};
use fantoccini::{elements::Element, Client};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

const SUBMIT_SCRIPT: &str =
    "const el = arguments[0]; const form = el.form || el; \
     if (form.requestSubmit) { form.requestSubmit(); } else { form.submit(); }";
const SCROLL_SCRIPT: &str = "arguments[0].scrollIntoView({block: 'center', inline: 'center'});";

fn classify(err: CmdError) -> DriverError {
    let kind = match &err {
        CmdError::Standard(wd) => match wd.error {
            ErrorStatus::NoSuchElement => DriverErrorKind::NoSuchElement,
            ErrorStatus::StaleElementReference => DriverErrorKind::StaleElementReference,
            ErrorStatus::NoSuchFrame => DriverErrorKind::NoSuchFrame,
            _ => DriverErrorKind::Other,
        },
        _ => DriverErrorKind::Other,
    };
    DriverError::new(kind, err.to_string())
}

/// Closest fantoccini strategy for `locator`; `css` holds a converted selector
fn strategy<'a>(
    locator: &'a Locator,
    css: &'a mut Option<String>,
) -> DriverResult<fantoccini::Locator<'a>> {
    Ok(match locator {
        Locator::Css(s) => fantoccini::Locator::Css(s),
        Locator::Id(id) => fantoccini::Locator::Id(id),
        Locator::XPath(x) => fantoccini::Locator::XPath(x),
        Locator::LinkText(t) => fantoccini::Locator::LinkText(t),
        other => {
            let selector = other
                .to_css()
                .ok_or_else(|| DriverError::other(format!("unsupported locator {other}")))?;
            fantoccini::Locator::Css(css.insert(selector))
        }
    })
}

/// A WebDriver session
#[derive(Clone)]
pub struct WebDriverClient {
    client: Client,
}

impl fmt::Debug for WebDriverClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDriverClient").finish_non_exhaustive()
    }
}

impl WebDriverClient {
    /// Wrap a connected client
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying client, for navigation and session management
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    fn wrap(&self, element: Element) -> ElementRef {
        Arc::new(WebDriverElement {
            client: self.client.clone(),
            element,
        })
    }
}

#[async_trait]
impl SearchContext for WebDriverClient {
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        trace!(locator = %locator, "webdriver find_element");
        let mut css = None;
        let element = self
            .client
            .find(strategy(locator, &mut css)?)
            .await
            .map_err(classify)?;
        Ok(self.wrap(element))
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let mut css = None;
        let elements = self
            .client
            .find_all(strategy(locator, &mut css)?)
            .await
            .map_err(classify)?;
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }
}

#[async_trait]
impl Driver for WebDriverClient {
    async fn switch_to_frame(&self, frame: &ElementRef) -> DriverResult<()> {
        let element = frame
            .as_any()
            .downcast_ref::<WebDriverElement>()
            .ok_or_else(|| DriverError::other("element does not belong to this session"))?;
        element
            .element
            .clone()
            .enter_frame()
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn switch_to_parent_frame(&self) -> DriverResult<()> {
        self.client.enter_parent_frame().await.map_err(classify)
    }
}

/// Element of a [`WebDriverClient`] session
#[derive(Clone)]
pub struct WebDriverElement {
    client: Client,
    element: Element,
}

impl fmt::Debug for WebDriverElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDriverElement")
            .field("element", &self.element.element_id().to_string())
            .finish()
    }
}

impl WebDriverElement {
    fn wrap(&self, element: Element) -> ElementRef {
        Arc::new(Self {
            client: self.client.clone(),
            element,
        })
    }

    async fn run_script(&self, script: &str) -> DriverResult<()> {
        let arg = serde_json::to_value(&self.element)
            .map_err(|e| DriverError::other(format!("cannot pass element to script: {e}")))?;
        self.client
            .execute(script, vec![arg])
            .await
            .map(|_| ())
            .map_err(classify)
    }
}

#[async_trait]
impl SearchContext for WebDriverElement {
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        let mut css = None;
        let element = self
            .element
            .find(strategy(locator, &mut css)?)
            .await
            .map_err(classify)?;
        Ok(self.wrap(element))
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let mut css = None;
        let elements = self
            .element
            .find_all(strategy(locator, &mut css)?)
            .await
            .map_err(classify)?;
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }
}

#[async_trait]
impl RemoteElement for WebDriverElement {
    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn element_id(&self) -> DriverResult<String> {
        Ok(self.element.element_id().to_string())
    }

    async fn click(&self) -> DriverResult<()> {
        self.element.click().await.map_err(classify)
    }

    async fn clear(&self) -> DriverResult<()> {
        self.element.clear().await.map_err(classify)
    }

    async fn submit(&self) -> DriverResult<()> {
        self.run_script(SUBMIT_SCRIPT).await
    }

    async fn send_keys(&self, text: &str) -> DriverResult<()> {
        self.element.send_keys(text).await.map_err(classify)
    }

    async fn text(&self) -> DriverResult<String> {
        self.element.text().await.map_err(classify)
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.element.attr(name).await.map_err(classify)
    }

    async fn css_value(&self, property: &str) -> DriverResult<String> {
        self.element.css_value(property).await.map_err(classify)
    }

    async fn tag_name(&self) -> DriverResult<String> {
        self.element.tag_name().await.map_err(classify)
    }

    async fn rect(&self) -> DriverResult<Rect> {
        let (x, y, width, height) = self.element.rectangle().await.map_err(classify)?;
        Ok(Rect::new(x, y, width, height))
    }

    async fn is_displayed(&self) -> DriverResult<bool> {
        self.element.is_displayed().await.map_err(classify)
    }

    async fn is_enabled(&self) -> DriverResult<bool> {
        self.element.is_enabled().await.map_err(classify)
    }

    async fn is_selected(&self) -> DriverResult<bool> {
        self.element.is_selected().await.map_err(classify)
    }

    async fn screenshot(&self, scroll_into_view: bool) -> DriverResult<Vec<u8>> {
        if scroll_into_view {
            self.run_script(SCROLL_SCRIPT).await?;
        }
        self.element.screenshot().await.map_err(classify)
    }

    async fn shadow_root(&self) -> DriverResult<ShadowRootRef> {
        Err(DriverError::other(
            "shadow roots are not supported by the fantoccini backend",
        ))
    }
}
