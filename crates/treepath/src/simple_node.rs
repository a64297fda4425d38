//! Simple in-memory tree provider used by tests, benches and quick prototypes.
//!
//! Focus:
//! - Ergonomic builder for quick test tree creation
//! - Identity semantics (two handles are equal only if they share the node)
//! - `append_child` after build, so tests can wire up unusual shapes
//!
//! Example:
//! ```
//! use treepath::simple_node::{elem, doc};
//! use treepath::model::{DocumentNode, ElementNode};
//!
//! // <root id="r">Hello<child/><child world="yes"/></root>
//! let document = doc(
//!     elem("root")
//!         .attr("id", "r")
//!         .text("Hello")
//!         .child(elem("child"))
//!         .child(elem("child").attr("world", "yes")),
//! );
//! let root = document.root();
//! assert_eq!(root.tag().name(), Some("root"));
//! assert_eq!(root.text().as_deref(), Some("Hello"));
//! assert_eq!(root.len(), 2);
//! assert_eq!(document.iter_tag("child").len(), 2);
//! ```
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::context::XPathContext;
use crate::model::{DocumentNode, ElementNode, ElementTag};
use crate::xdm::XPathItem;

pub type SimpleItem = XPathItem<SimpleDocument>;
pub type SimpleContext = XPathContext<SimpleDocument>;

struct Inner {
    tag: ElementTag,
    attrib: RwLock<Vec<(String, String)>>,
    text: RwLock<Option<String>>,
    children: RwLock<Vec<SimpleElement>>,
}

/// A simple Arc-backed element-like node (element, comment or PI).
#[derive(Clone)]
pub struct SimpleElement(Arc<Inner>);

impl PartialEq for SimpleElement {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleElement {}
impl std::hash::Hash for SimpleElement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SimpleElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Children are left out: a node may be linked into its own subtree.
        f.debug_struct("SimpleElement")
            .field("tag", &self.0.tag)
            .field("text", &self.text())
            .finish_non_exhaustive()
    }
}

impl SimpleElement {
    fn new(tag: ElementTag, text: Option<String>) -> Self {
        SimpleElement(Arc::new(Inner {
            tag,
            attrib: RwLock::new(Vec::new()),
            text: RwLock::new(text),
            children: RwLock::new(Vec::new()),
        }))
    }

    pub fn element(name: &str) -> SimpleElementBuilder {
        SimpleElementBuilder::new(SimpleElement::new(ElementTag::Name(name.to_string()), None))
    }

    pub fn comment(text: &str) -> SimpleElement {
        SimpleElement::new(ElementTag::Comment, Some(text.to_string()))
    }

    pub fn pi(target: &str, data: &str) -> SimpleElement {
        SimpleElement::new(ElementTag::ProcessingInstruction { target: target.to_string() }, Some(data.to_string()))
    }

    /// Append `child` after the existing children.
    pub fn append_child(&self, child: SimpleElement) {
        if let Ok(mut children) = self.0.children.write() {
            children.push(child);
        }
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        if let Ok(mut attrib) = self.0.attrib.write() {
            match attrib.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => attrib.push((name.to_string(), value.to_string())),
            }
        }
    }
}

pub struct SimpleElementBuilder {
    node: SimpleElement,
    pending_children: Vec<SimpleElement>,
    pending_attrs: Vec<(String, String)>,
}

impl SimpleElementBuilder {
    fn new(node: SimpleElement) -> Self {
        Self { node, pending_children: Vec::new(), pending_attrs: Vec::new() }
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<SimpleElementOrBuilder>) -> Self {
        self.pending_children.push(child.into().build());
        self
    }

    #[must_use]
    pub fn children<I: IntoIterator<Item = SimpleElementOrBuilder>>(mut self, it: I) -> Self {
        self.pending_children.extend(it.into_iter().map(SimpleElementOrBuilder::build));
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.pending_attrs.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn text(self, text: &str) -> Self {
        if let Ok(mut slot) = self.node.0.text.write() {
            *slot = Some(text.to_string());
        }
        self
    }

    pub fn build(self) -> SimpleElement {
        for (name, value) in &self.pending_attrs {
            self.node.set_attribute(name, value);
        }
        if let Ok(mut children) = self.node.0.children.write() {
            children.extend(self.pending_children);
        }
        self.node
    }
}

pub enum SimpleElementOrBuilder {
    Built(SimpleElement),
    Builder(SimpleElementBuilder),
}

impl SimpleElementOrBuilder {
    fn build(self) -> SimpleElement {
        match self {
            SimpleElementOrBuilder::Built(n) => n,
            SimpleElementOrBuilder::Builder(b) => b.build(),
        }
    }
}

impl From<SimpleElement> for SimpleElementOrBuilder {
    fn from(n: SimpleElement) -> Self {
        SimpleElementOrBuilder::Built(n)
    }
}
impl From<SimpleElementBuilder> for SimpleElementOrBuilder {
    fn from(b: SimpleElementBuilder) -> Self {
        SimpleElementOrBuilder::Builder(b)
    }
}

/// A document wrapping one root element.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleDocument {
    root: SimpleElement,
}

impl SimpleDocument {
    pub fn new(root: SimpleElement) -> Self {
        Self { root }
    }
}

// Convenience helper functions for concise test code
pub fn elem(name: &str) -> SimpleElementBuilder {
    SimpleElement::element(name)
}
pub fn comment(text: &str) -> SimpleElement {
    SimpleElement::comment(text)
}
pub fn pi(target: &str, data: &str) -> SimpleElement {
    SimpleElement::pi(target, data)
}
pub fn doc(root: impl Into<SimpleElementOrBuilder>) -> SimpleDocument {
    SimpleDocument::new(root.into().build())
}

impl ElementNode for SimpleElement {
    fn tag(&self) -> ElementTag {
        self.0.tag.clone()
    }
    fn attrib(&self) -> Vec<(String, String)> {
        self.0.attrib.read().map(|v| v.clone()).unwrap_or_default()
    }
    fn text(&self) -> Option<String> {
        self.0.text.read().ok().and_then(|t| t.clone())
    }
    fn children(&self) -> Vec<Self> {
        self.0.children.read().map(|v| v.clone()).unwrap_or_default()
    }
}

impl DocumentNode for SimpleDocument {
    type Element = SimpleElement;

    fn root(&self) -> SimpleElement {
        self.root.clone()
    }
}
