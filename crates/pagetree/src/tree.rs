//! Component tree: declarations and the node arena.
//!
//! A page is declared with a [`PageBlueprint`], every component below it with
//! a [`Blueprint`]. Declarations only name children in a [`ChildMapping`];
//! nothing is built until a child is first asked for. At that point the
//! child's blueprint is produced by its [`ChildDescriptor`], a node is pushed
//! into the tree's arena, and the slot is fixed to that node for the rest of
//! the tree's life.
//!
//! ```text
//!   Page (NodeId 0, owns the driver)
//!    └── "login_form"  ──►  NodeId 1  (Static, id=loginForm)
//!          ├── "username" ──► NodeId 2   (built on first access)
//!          └── "password" ──► (not built yet)
//! ```

use crate::component::Component;
use crate::driver::{Driver, ElementRef};
use crate::locator::Locator;
use crate::page::Page;
use crate::result::{PagetreeError, PagetreeResult};
use crate::wait::{wait_for_all, Condition, WaitOptions, WaitResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The page node of every tree
    pub const ROOT: Self = Self(0);

    /// Raw arena index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The page; owns the driver, has no locator
    Root,
    /// Component with a locator fixed at declaration
    Static,
    /// Component whose locator is computed on every access
    Dynamic,
    /// Component whose element is an iframe that can be entered
    Frame,
}

impl NodeKind {
    /// Whether nodes of this kind resolve to an element
    #[must_use]
    pub const fn is_component(self) -> bool {
        !matches!(self, Self::Root)
    }
}

/// Computes a dynamic component's locator from its own handle
pub type LocatorFn = dyn Fn(&Component) -> Option<Locator> + Send + Sync;

#[derive(Clone)]
pub(crate) enum LocatorSource {
    Fixed(Option<Locator>),
    Computed(Option<Arc<LocatorFn>>),
}

type ConditionsFn = dyn Fn(&NodeHandle) -> Vec<Condition> + Send + Sync;
type BlueprintFn = dyn Fn() -> Blueprint + Send + Sync;

// =============================================================================
// DECLARATIONS
// =============================================================================

/// Typed component wrappers.
///
/// ```ignore
/// struct Username(Component);
///
/// impl PageComponent for Username {
///     fn blueprint() -> Blueprint {
///         Blueprint::fixed(Locator::id("username")).find_from_parent(true)
///     }
///
///     fn from_component(component: Component) -> Self {
///         Self(component)
///     }
/// }
/// ```
pub trait PageComponent: Sized + 'static {
    /// Declaration used when the component is first built
    fn blueprint() -> Blueprint;

    /// Wrap the built node
    fn from_component(component: Component) -> Self;
}

/// How to build one declared child
#[derive(Clone)]
pub struct ChildDescriptor {
    type_name: &'static str,
    factory: Arc<BlueprintFn>,
}

impl fmt::Debug for ChildDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildDescriptor")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl ChildDescriptor {
    /// Child built from `T`'s own blueprint
    #[must_use]
    pub fn of<T: PageComponent>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            factory: Arc::new(T::blueprint),
        }
    }

    /// Child built from a closure; constructor arguments are captured by it
    pub fn from_fn<F>(type_name: &'static str, factory: F) -> Self
    where
        F: Fn() -> Blueprint + Send + Sync + 'static,
    {
        Self {
            type_name,
            factory: Arc::new(factory),
        }
    }

    /// Name of the declared child type
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Produce the child's blueprint
    #[must_use]
    pub fn blueprint(&self) -> Blueprint {
        (self.factory)()
    }
}

/// Declared table of child name → descriptor, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ChildMapping {
    entries: Vec<(String, ChildDescriptor)>,
}

impl ChildMapping {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`, replacing an earlier declaration of the same name
    pub fn insert(&mut self, name: impl Into<String>, descriptor: ChildDescriptor) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = descriptor;
        } else {
            self.entries.push((name, descriptor));
        }
    }

    /// Look up a declaration
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ChildDescriptor> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Declared names, in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of declarations
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &(String, ChildDescriptor)> {
        self.entries.iter()
    }
}

/// Declaration of one component
#[derive(Clone)]
pub struct Blueprint {
    kind: NodeKind,
    locator: LocatorSource,
    find_from_parent: bool,
    timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
    children: ChildMapping,
    conditions: Option<Arc<ConditionsFn>>,
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locator = match &self.locator {
            LocatorSource::Fixed(locator) => locator.as_ref().map(ToString::to_string),
            LocatorSource::Computed(Some(_)) => Some("<computed>".to_string()),
            LocatorSource::Computed(None) => None,
        };
        f.debug_struct("Blueprint")
            .field("kind", &self.kind)
            .field("locator", &locator)
            .field("find_from_parent", &self.find_from_parent)
            .field("children", &self.children.names())
            .finish_non_exhaustive()
    }
}

impl Blueprint {
    fn with_source(kind: NodeKind, locator: LocatorSource) -> Self {
        Self {
            kind,
            locator,
            find_from_parent: false,
            timeout_ms: None,
            poll_interval_ms: None,
            children: ChildMapping::new(),
            conditions: None,
        }
    }

    /// Static component with no locator; `get_element()` will fail until a
    /// subclass-like wrapper declares one with [`Blueprint::fixed`]
    #[must_use]
    pub fn component() -> Self {
        Self::with_source(NodeKind::Static, LocatorSource::Fixed(None))
    }

    /// Static component located by `locator`
    #[must_use]
    pub fn fixed(locator: Locator) -> Self {
        Self::with_source(NodeKind::Static, LocatorSource::Fixed(Some(locator)))
    }

    /// Dynamic component without a computed locator
    #[must_use]
    pub fn dynamic() -> Self {
        Self::with_source(NodeKind::Dynamic, LocatorSource::Computed(None))
    }

    /// Dynamic component whose locator is computed on every access
    pub fn dynamic_with<F>(locate: F) -> Self
    where
        F: Fn(&Component) -> Option<Locator> + Send + Sync + 'static,
    {
        Self::with_source(
            NodeKind::Dynamic,
            LocatorSource::Computed(Some(Arc::new(locate))),
        )
    }

    /// Iframe component located by `locator`
    #[must_use]
    pub fn frame(locator: Locator) -> Self {
        Self::with_source(NodeKind::Frame, LocatorSource::Fixed(Some(locator)))
    }

    /// Resolve relative to the parent component's element
    #[must_use]
    pub const fn find_from_parent(mut self, enabled: bool) -> Self {
        self.find_from_parent = enabled;
        self
    }

    /// Set timeout in milliseconds (otherwise inherited from the parent)
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set polling interval in milliseconds (otherwise inherited from the parent)
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = Some(poll_interval_ms);
        self
    }

    /// Set both timing values
    #[must_use]
    pub const fn with_options(self, options: WaitOptions) -> Self {
        self.with_timeout(options.timeout_ms)
            .with_poll_interval(options.poll_interval_ms)
    }

    /// Declare a child built from `T`'s blueprint
    #[must_use]
    pub fn with_child<T: PageComponent>(self, name: impl Into<String>) -> Self {
        self.with_child_descriptor(name, ChildDescriptor::of::<T>())
    }

    /// Declare a child from an explicit descriptor
    #[must_use]
    pub fn with_child_descriptor(
        mut self,
        name: impl Into<String>,
        descriptor: ChildDescriptor,
    ) -> Self {
        self.children.insert(name, descriptor);
        self
    }

    /// Readiness conditions, rebuilt from the component handle on every wait
    #[must_use]
    pub fn with_conditions<F>(mut self, conditions: F) -> Self
    where
        F: Fn(&Component) -> Vec<Condition> + Send + Sync + 'static,
    {
        self.conditions = Some(Arc::new(move |handle: &NodeHandle| {
            conditions(&Component::from_handle(handle.clone()))
        }));
        self
    }

    /// Declared kind
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Declared children
    #[must_use]
    pub const fn children(&self) -> &ChildMapping {
        &self.children
    }

    /// Whether lookups are scoped to the parent's element
    #[must_use]
    pub const fn is_find_from_parent(&self) -> bool {
        self.find_from_parent
    }
}

/// Declaration of a page (the tree root)
#[derive(Clone, Default)]
pub struct PageBlueprint {
    options: WaitOptions,
    children: ChildMapping,
    conditions: Option<Arc<ConditionsFn>>,
}

impl fmt::Debug for PageBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBlueprint")
            .field("options", &self.options)
            .field("children", &self.children.names())
            .finish_non_exhaustive()
    }
}

impl PageBlueprint {
    /// Page with default timing and no children
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.options.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set both timing values
    #[must_use]
    pub const fn with_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Declare a child built from `T`'s blueprint
    #[must_use]
    pub fn with_child<T: PageComponent>(self, name: impl Into<String>) -> Self {
        self.with_child_descriptor(name, ChildDescriptor::of::<T>())
    }

    /// Declare a child from an explicit descriptor
    #[must_use]
    pub fn with_child_descriptor(
        mut self,
        name: impl Into<String>,
        descriptor: ChildDescriptor,
    ) -> Self {
        self.children.insert(name, descriptor);
        self
    }

    /// Readiness conditions, rebuilt from the page handle on every wait
    #[must_use]
    pub fn with_conditions<F>(mut self, conditions: F) -> Self
    where
        F: Fn(&Page) -> Vec<Condition> + Send + Sync + 'static,
    {
        self.conditions = Some(Arc::new(move |handle: &NodeHandle| {
            conditions(&Page::from_handle(handle.clone()))
        }));
        self
    }

    /// Declared children
    #[must_use]
    pub const fn children(&self) -> &ChildMapping {
        &self.children
    }

    /// Page timing
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }
}

// =============================================================================
// ARENA
// =============================================================================

struct ChildSlot {
    descriptor: ChildDescriptor,
    instance: OnceLock<NodeId>,
}

pub(crate) struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    kind: NodeKind,
    locator: LocatorSource,
    find_from_parent: bool,
    options: WaitOptions,
    conditions: Option<Arc<ConditionsFn>>,
    declared: ChildMapping,
    attached: OnceLock<()>,
    slots: Mutex<HashMap<String, Arc<ChildSlot>>>,
    pub(crate) staleness_cache: tokio::sync::Mutex<Option<ElementRef>>,
}

impl Node {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Arc<ChildSlot>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) struct Tree {
    driver: Arc<dyn Driver>,
    nodes: RwLock<Vec<Arc<Node>>>,
}

impl Tree {
    pub(crate) fn new_page(driver: Arc<dyn Driver>, blueprint: PageBlueprint) -> NodeHandle {
        let root = Arc::new(Node {
            id: NodeId::ROOT,
            parent: None,
            kind: NodeKind::Root,
            locator: LocatorSource::Fixed(None),
            find_from_parent: false,
            options: blueprint.options,
            conditions: blueprint.conditions,
            declared: blueprint.children,
            attached: OnceLock::new(),
            slots: Mutex::new(HashMap::new()),
            staleness_cache: tokio::sync::Mutex::new(None),
        });
        let tree = Arc::new(Self {
            driver,
            nodes: RwLock::new(vec![Arc::clone(&root)]),
        });
        NodeHandle { tree, node: root }
    }

    fn get(&self, id: NodeId) -> Option<Arc<Node>> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .cloned()
    }

    fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn push(&self, parent: &Node, blueprint: Blueprint) -> Arc<Node> {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let options = WaitOptions {
            timeout_ms: blueprint.timeout_ms.unwrap_or(parent.options.timeout_ms),
            poll_interval_ms: blueprint
                .poll_interval_ms
                .unwrap_or(parent.options.poll_interval_ms),
        };
        let node = Arc::new(Node {
            id: NodeId(nodes.len()),
            parent: Some(parent.id),
            kind: blueprint.kind,
            locator: blueprint.locator,
            find_from_parent: blueprint.find_from_parent,
            options,
            conditions: blueprint.conditions,
            declared: blueprint.children,
            attached: OnceLock::new(),
            slots: Mutex::new(HashMap::new()),
            staleness_cache: tokio::sync::Mutex::new(None),
        });
        nodes.push(Arc::clone(&node));
        node
    }
}

/// Shared handle to one node of a tree.
///
/// Cloning is cheap; every clone addresses the same node. Handles keep the
/// whole tree (and its driver) alive.
#[derive(Clone)]
pub struct NodeHandle {
    tree: Arc<Tree>,
    node: Arc<Node>,
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("id", &self.node.id)
            .field("kind", &self.node.kind)
            .field("parent", &self.node.parent)
            .finish_non_exhaustive()
    }
}

impl NodeHandle {
    /// Arena id
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Node kind
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    /// Timing configuration
    #[must_use]
    pub fn options(&self) -> WaitOptions {
        self.node.options
    }

    /// Whether lookups are scoped to the parent's element
    #[must_use]
    pub fn find_from_parent(&self) -> bool {
        self.node.find_from_parent
    }

    /// The tree's shared driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.tree.driver
    }

    /// Number of nodes built so far in this tree
    #[must_use]
    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }

    /// Parent handle (none for the page)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parent = self.tree.get(self.node.parent?)?;
        Some(Self {
            tree: Arc::clone(&self.tree),
            node: parent,
        })
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn locator_source(&self) -> &LocatorSource {
        &self.node.locator
    }

    /// Whether the declared children have been installed
    #[must_use]
    pub fn components_attached(&self) -> bool {
        self.node.attached.get().is_some()
    }

    /// Install a memoized slot for every declared child. Idempotent.
    pub fn attach_components(&self) {
        self.node.attached.get_or_init(|| {
            let mut slots = self.node.slots();
            for (name, descriptor) in self.node.declared.iter() {
                slots.entry(name.clone()).or_insert_with(|| {
                    Arc::new(ChildSlot {
                        descriptor: descriptor.clone(),
                        instance: OnceLock::new(),
                    })
                });
            }
            debug!(node = %self.node.id, children = slots.len(), "attached components");
        });
    }

    /// Register one more memoized child slot
    pub fn attach_component_as(
        &self,
        name: &str,
        descriptor: ChildDescriptor,
    ) -> PagetreeResult<()> {
        self.attach_components();
        let mut slots = self.node.slots();
        if slots.contains_key(name) {
            return Err(PagetreeError::configuration(format!(
                "a component is already attached as {name:?}"
            )));
        }
        slots.insert(
            name.to_string(),
            Arc::new(ChildSlot {
                descriptor,
                instance: OnceLock::new(),
            }),
        );
        Ok(())
    }

    /// Child node for `name`, built on first access and memoized
    pub fn child(&self, name: &str) -> PagetreeResult<Self> {
        self.attach_components();
        let slot = self.node.slots().get(name).cloned().ok_or_else(|| {
            PagetreeError::configuration(format!("no component attached as {name:?}"))
        })?;

        let id = *slot.instance.get_or_init(|| {
            let blueprint = slot.descriptor.blueprint();
            let node = self.tree.push(&self.node, blueprint);
            debug!(
                parent = %self.node.id,
                node = %node.id,
                child = name,
                kind = ?node.kind,
                component = slot.descriptor.type_name(),
                "built component"
            );
            let child = Self {
                tree: Arc::clone(&self.tree),
                node,
            };
            child.attach_components();
            child.node.id
        });

        let node = self.tree.get(id).ok_or_else(|| {
            PagetreeError::configuration(format!("component {id} missing from its tree"))
        })?;
        Ok(Self {
            tree: Arc::clone(&self.tree),
            node,
        })
    }

    /// Current readiness conditions
    #[must_use]
    pub fn conditions(&self) -> Vec<Condition> {
        self.node
            .conditions
            .as_ref()
            .map_or_else(Vec::new, |build| build(self))
    }

    /// Wait for every condition against this node's timing
    pub async fn wait(&self) -> PagetreeResult<WaitResult> {
        wait_for_all(self.conditions(), self.node.options).await
    }

    /// Install declared children if needed, then wait
    pub async fn loaded(&self) -> PagetreeResult<WaitResult> {
        self.attach_components();
        self.wait().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    struct Leaf;

    impl PageComponent for Leaf {
        fn blueprint() -> Blueprint {
            Blueprint::fixed(Locator::id("leaf")).find_from_parent(true)
        }

        fn from_component(_component: Component) -> Self {
            Self
        }
    }

    struct Branch;

    impl PageComponent for Branch {
        fn blueprint() -> Blueprint {
            Blueprint::fixed(Locator::id("branch"))
                .with_timeout(500)
                .with_child::<Leaf>("leaf")
        }

        fn from_component(_component: Component) -> Self {
            Self
        }
    }

    fn page(blueprint: PageBlueprint) -> NodeHandle {
        Tree::new_page(Arc::new(MockDriver::new()), blueprint)
    }

    mod child_mapping_tests {
        use super::*;

        #[test]
        fn test_insert_keeps_order_and_replaces() {
            let mut mapping = ChildMapping::new();
            assert!(mapping.is_empty());
            mapping.insert("b", ChildDescriptor::of::<Leaf>());
            mapping.insert("a", ChildDescriptor::of::<Branch>());
            mapping.insert("b", ChildDescriptor::of::<Branch>());

            assert_eq!(mapping.names(), vec!["b", "a"]);
            assert_eq!(mapping.len(), 2);
            assert!(mapping.get("b").unwrap().type_name().ends_with("Branch"));
            assert!(mapping.get("c").is_none());
        }

        #[test]
        fn test_typed_declarations_use_component_blueprint() {
            let blueprint = Blueprint::component()
                .with_child::<Leaf>("leaf")
                .with_child::<Branch>("branch");
            let leaf = blueprint.children().get("leaf").unwrap().blueprint();
            assert_eq!(leaf.kind(), NodeKind::Static);
            assert!(leaf.is_find_from_parent());

            let page = PageBlueprint::new().with_child::<Branch>("branch");
            let branch = page.children().get("branch").unwrap().blueprint();
            assert_eq!(branch.children().names(), vec!["leaf"]);
        }

        #[test]
        fn test_from_fn_captures_arguments() {
            let row = 3;
            let descriptor = ChildDescriptor::from_fn("Row", move || {
                Blueprint::fixed(Locator::css(format!("tr:nth-child({row})")))
            });
            assert_eq!(descriptor.type_name(), "Row");
            assert!(format!("{:?}", descriptor.blueprint()).contains("tr:nth-child(3)"));
        }
    }

    mod attach_tests {
        use super::*;

        #[test]
        fn test_children_are_built_lazily_and_once() {
            let root = page(PageBlueprint::new().with_child::<Branch>("branch"));
            assert_eq!(root.tree_size(), 1);

            let first = root.child("branch").unwrap();
            let second = root.child("branch").unwrap();

            assert_eq!(first.id(), second.id());
            assert_eq!(root.tree_size(), 2);
            assert_eq!(first.parent().unwrap().id(), NodeId::ROOT);
        }

        #[test]
        fn test_built_child_has_its_own_children_attached() {
            let root = page(PageBlueprint::new().with_child::<Branch>("branch"));
            let branch = root.child("branch").unwrap();
            assert!(branch.components_attached());
            assert_eq!(root.tree_size(), 2);

            let leaf = branch.child("leaf").unwrap();
            assert_eq!(leaf.parent().unwrap().id(), branch.id());
            assert!(leaf.find_from_parent());
            assert_eq!(root.tree_size(), 3);
        }

        #[test]
        fn test_sibling_pages_do_not_share_children() {
            let blueprint = PageBlueprint::new().with_child::<Branch>("branch");
            let a = page(blueprint.clone());
            let b = page(blueprint);
            a.child("branch").unwrap();
            assert_eq!(a.tree_size(), 2);
            assert_eq!(b.tree_size(), 1);
        }

        #[test]
        fn test_unknown_child_is_configuration_error() {
            let root = page(PageBlueprint::new());
            let err = root.child("missing").unwrap_err();
            assert!(err.is_configuration());
            assert!(err.to_string().contains("missing"));
        }

        #[test]
        fn test_attach_component_as_registers_slot() {
            let root = page(PageBlueprint::new());
            root.attach_component_as("extra", ChildDescriptor::of::<Leaf>())
                .unwrap();
            let extra = root.child("extra").unwrap();
            assert_eq!(extra.kind(), NodeKind::Static);

            let err = root
                .attach_component_as("extra", ChildDescriptor::of::<Branch>())
                .unwrap_err();
            assert!(err.is_configuration());
        }

        #[test]
        fn test_attach_components_is_idempotent() {
            let root = page(PageBlueprint::new().with_child::<Leaf>("leaf"));
            assert!(!root.components_attached());
            root.attach_components();
            root.attach_components();
            assert!(root.components_attached());
            assert_eq!(root.node().slots().len(), 1);
        }
    }

    mod timing_tests {
        use super::*;

        #[test]
        fn test_unset_timing_is_inherited_by_value() {
            let root = page(
                PageBlueprint::new()
                    .with_timeout(2_000)
                    .with_poll_interval(20)
                    .with_child::<Branch>("branch"),
            );
            let branch = root.child("branch").unwrap();
            assert_eq!(branch.options().timeout_ms, 500);
            assert_eq!(branch.options().poll_interval_ms, 20);

            let leaf = branch.child("leaf").unwrap();
            assert_eq!(leaf.options().timeout_ms, 500);
            assert_eq!(leaf.options().poll_interval_ms, 20);
        }

        #[test]
        fn test_page_defaults() {
            let root = page(PageBlueprint::new());
            assert_eq!(root.options(), WaitOptions::default());
            assert_eq!(root.kind(), NodeKind::Root);
            assert!(root.parent().is_none());
        }
    }
}
