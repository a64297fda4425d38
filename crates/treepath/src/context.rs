//! Dynamic evaluation context.
//!
//! The static context belongs to the parser. [`XPathContext`] is the mutable
//! cursor one evaluation drives through the tree: the current item, the
//! position and size of the innermost active iteration group, variable
//! bindings and a lazily built parent map shared with every copy.
use core::fmt;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::axes::{Axis, AxisIter};
use crate::classify::{is_document_node, is_element_node};
use crate::error::Error;
use crate::model::{DocumentNode, ElementNode};
use crate::xdm::{XPathItem, XPathValue};

pub type ParentMap<E> = HashMap<E, E>;

/// Predicate answering "is the cursor on a principal node".
pub type NodeKindTest<D> = fn(&XPathItem<D>) -> bool;

pub(crate) fn element_test<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    is_element_node(item, None)
}

/// How hard the ancestor axis looks for circular parent links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleDetection {
    /// Fail only when a parent is the node the walk started from.
    #[default]
    Direct,
    /// Additionally fail when any ancestor is reached twice.
    Full,
}

/// The top of the queried tree. Always an element or a document.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextRoot<D: DocumentNode> {
    Document(D),
    Element(D::Element),
}

impl<D: DocumentNode> ContextRoot<D> {
    fn from_item(item: XPathItem<D>) -> Result<Self, Error> {
        if is_element_node(&item, None) || is_document_node(&item) {
            match item {
                XPathItem::Document(d) => return Ok(ContextRoot::Document(d)),
                XPathItem::Element(e) => return Ok(ContextRoot::Element(e)),
                _ => {}
            }
        }
        Err(Error::type_error(format!("argument 'root' must be an Element: {item:?}")))
    }

    /// The root element: the document's root, or the element itself.
    pub fn root_element(&self) -> D::Element {
        match self {
            ContextRoot::Document(d) => d.root(),
            ContextRoot::Element(e) => e.clone(),
        }
    }

    pub fn to_item(&self) -> XPathItem<D> {
        match self {
            ContextRoot::Document(d) => XPathItem::Document(d.clone()),
            ContextRoot::Element(e) => XPathItem::Element(e.clone()),
        }
    }

    fn elements(&self) -> Vec<D::Element> {
        match self {
            ContextRoot::Document(d) => d.iter(),
            ContextRoot::Element(e) => e.iter(),
        }
    }
}

/// The four cursor fields every axis traversal saves and restores.
pub(crate) struct CursorState<D: DocumentNode> {
    item: Option<XPathItem<D>>,
    size: usize,
    position: usize,
    active: Option<Axis>,
}

pub struct XPathContext<D: DocumentNode> {
    root: ContextRoot<D>,
    /// Current item. `None` positions the cursor on the document node.
    pub item: Option<XPathItem<D>>,
    /// 0-based position within the innermost active iteration group.
    pub position: usize,
    pub size: usize,
    pub variables: HashMap<String, XPathValue<D>>,
    parent_map: Rc<OnceCell<ParentMap<D::Element>>>,
    pub(crate) active: Option<Axis>,
    pub(crate) node_kind_test: NodeKindTest<D>,
    cycle_detection: CycleDetection,
}

impl<D: DocumentNode> XPathContext<D> {
    /// Context positioned on the root element with default bookkeeping.
    pub fn new(root: XPathItem<D>) -> Result<Self, Error> {
        XPathContextBuilder::new(root).build()
    }

    pub fn builder(root: XPathItem<D>) -> XPathContextBuilder<D> {
        XPathContextBuilder::new(root)
    }

    /// Independent cursor over the same tree.
    ///
    /// Variables are cloned, the parent map is shared. `item` replaces the
    /// current item when given.
    #[must_use]
    pub fn copy(&self, item: Option<XPathItem<D>>) -> Self {
        Self {
            root: self.root.clone(),
            item: item.or_else(|| self.item.clone()),
            position: self.position,
            size: self.size,
            variables: self.variables.clone(),
            parent_map: Rc::clone(&self.parent_map),
            active: None,
            node_kind_test: element_test::<D>,
            cycle_detection: self.cycle_detection,
        }
    }

    pub fn root(&self) -> &ContextRoot<D> {
        &self.root
    }

    pub fn root_element(&self) -> D::Element {
        self.root.root_element()
    }

    pub fn variable(&self, name: &str) -> Option<&XPathValue<D>> {
        self.variables.get(name)
    }

    /// Axis traversal that currently drives the cursor, if any.
    pub fn active_iterator(&self) -> Option<Axis> {
        self.active
    }

    /// Whether the current item is of the principal node kind of the active
    /// step: attribute inside the attribute axis, element otherwise.
    pub fn principal_node_kind(&self) -> bool {
        self.item.as_ref().is_some_and(|item| (self.node_kind_test)(item))
    }

    pub fn cycle_detection(&self) -> CycleDetection {
        self.cycle_detection
    }

    /// Child to parent map over every element reachable from the root.
    /// Built on first use, then shared by all copies of this context.
    pub fn parent_map(&self) -> &ParentMap<D::Element> {
        self.parent_map.get_or_init(|| {
            let mut map = HashMap::new();
            for elem in self.root.elements() {
                for child in elem.children() {
                    map.insert(child, elem.clone());
                }
            }
            debug!(entries = map.len(), "parent map built");
            map
        })
    }

    pub fn shares_parent_map(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.parent_map, &other.parent_map)
    }

    /// Whether the cursor denotes the document node.
    pub(crate) fn at_document(&self) -> bool {
        matches!(self.item, None | Some(XPathItem::Document(_)))
    }

    pub(crate) fn snapshot(&self) -> CursorState<D> {
        CursorState {
            item: self.item.clone(),
            size: self.size,
            position: self.position,
            active: self.active,
        }
    }

    pub(crate) fn restore(&mut self, state: CursorState<D>) {
        self.item = state.item;
        self.size = state.size;
        self.position = state.position;
        self.active = state.active;
    }

    // Axis traversals

    /// The current item, as a one-item sequence.
    pub fn iter_self(&mut self) -> AxisIter<'_, D> {
        AxisIter::self_axis(self)
    }

    /// Attributes of the current element, sorted by name.
    pub fn iter_attributes(&mut self) -> AxisIter<'_, D> {
        AxisIter::attributes(self)
    }

    /// Descendant-or-self in document order, starting at `item` if given.
    pub fn iter_descendants(&mut self, item: Option<XPathItem<D>>) -> AxisIter<'_, D> {
        AxisIter::descendants(self, item)
    }

    pub fn iter_children(&mut self, item: Option<XPathItem<D>>) -> AxisIter<'_, D> {
        AxisIter::children(self, item)
    }

    /// Ancestors, nearest first.
    pub fn iter_ancestors(&mut self, item: Option<XPathItem<D>>) -> AxisIter<'_, D> {
        AxisIter::ancestors(self, item)
    }
}

impl<D: DocumentNode> fmt::Debug for XPathContext<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "XPathContext(root={:?}, item={:?}, position={}, size={})",
            self.root, self.item, self.position, self.size
        )
    }
}

pub struct XPathContextBuilder<D: DocumentNode> {
    root: XPathItem<D>,
    item: Option<XPathItem<D>>,
    position: usize,
    size: usize,
    variables: HashMap<String, XPathValue<D>>,
    cycle_detection: CycleDetection,
}

impl<D: DocumentNode> XPathContextBuilder<D> {
    pub fn new(root: XPathItem<D>) -> Self {
        Self {
            root,
            item: None,
            position: 0,
            size: 1,
            variables: HashMap::new(),
            cycle_detection: CycleDetection::default(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: impl Into<XPathItem<D>>) -> Self {
        self.item = Some(item.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<XPathValue<D>>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_variables(mut self, variables: HashMap<String, XPathValue<D>>) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn with_cycle_detection(mut self, mode: CycleDetection) -> Self {
        self.cycle_detection = mode;
        self
    }

    /// Fails with a type error unless the root is an element or a document.
    pub fn build(self) -> Result<XPathContext<D>, Error> {
        let root = ContextRoot::from_item(self.root)?;
        let item = self.item.unwrap_or_else(|| XPathItem::Element(root.root_element()));
        trace!(position = self.position, size = self.size, "xpath context created");
        Ok(XPathContext {
            root,
            item: Some(item),
            position: self.position,
            size: self.size,
            variables: self.variables,
            parent_map: Rc::new(OnceCell::new()),
            active: None,
            node_kind_test: element_test::<D>,
            cycle_detection: self.cycle_detection,
        })
    }
}
