//! Shared behavior of every tree node: child attachment and readiness.
//!
//! Both [`Page`](crate::page::Page) and [`Component`] are thin wrappers over a
//! [`NodeHandle`]; everything in [`ComponentManager`] is provided on top of
//! that one accessor.

use crate::component::Component;
use crate::driver::Driver;
use crate::result::PagetreeResult;
use crate::tree::{ChildDescriptor, NodeHandle, PageComponent};
use crate::wait::{Condition, WaitOptions, WaitResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Child attachment and readiness for pages and components
#[async_trait]
pub trait ComponentManager: Send + Sync {
    /// The node this manager wraps
    fn handle(&self) -> &NodeHandle;

    /// Timing configuration
    fn options(&self) -> WaitOptions {
        self.handle().options()
    }

    /// Deadline for `wait()` in milliseconds
    fn timeout_ms(&self) -> u64 {
        self.options().timeout_ms
    }

    /// Delay between condition evaluations in milliseconds
    fn poll_interval_ms(&self) -> u64 {
        self.options().poll_interval_ms
    }

    /// The tree's shared driver
    fn driver(&self) -> Arc<dyn Driver> {
        Arc::clone(self.handle().driver())
    }

    /// Child component registered as `name`, built on first access
    fn child(&self, name: &str) -> PagetreeResult<Component> {
        self.handle().child(name).map(Component::from_handle)
    }

    /// Child component wrapped in its typed page-component struct
    fn child_as<T: PageComponent>(&self, name: &str) -> PagetreeResult<T>
    where
        Self: Sized,
    {
        self.child(name).map(T::from_component)
    }

    /// Register one more memoized child slot
    fn attach_component_as(&self, name: &str, descriptor: ChildDescriptor) -> PagetreeResult<()> {
        self.handle().attach_component_as(name, descriptor)
    }

    /// Install a slot for every declared child. Idempotent.
    fn attach_components(&self) {
        self.handle().attach_components();
    }

    /// Whether declared children have been installed
    fn components_attached(&self) -> bool {
        self.handle().components_attached()
    }

    /// Readiness conditions, rebuilt on every call
    fn conditions(&self) -> Vec<Condition> {
        self.handle().conditions()
    }

    /// Wait until every condition holds or one fails
    async fn wait(&self) -> PagetreeResult<WaitResult> {
        self.handle().wait().await
    }

    /// Attach declared children if needed, then wait
    async fn loaded(&self) -> PagetreeResult<WaitResult> {
        self.handle().loaded().await
    }
}
