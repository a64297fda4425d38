//! Tree provider contracts consumed by the evaluation core.
//!
//! The core never builds or mutates trees. It only needs an element-like
//! capability set ([`ElementNode`]) and a document-like one ([`DocumentNode`]).
//! Attribute, namespace and text nodes are plain values (see [`crate::xdm`]).
use core::fmt;
use core::hash::Hash;
use std::collections::HashSet;

use crate::consts::XML_ID_ATTRIBUTE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

/// Tag of an element-like node. Comments and processing instructions are
/// element-like artifacts whose tag is a marker instead of a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementTag {
    Name(String),
    Comment,
    ProcessingInstruction { target: String },
}

impl ElementTag {
    pub fn name(&self) -> Option<&str> {
        match self {
            ElementTag::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        !matches!(self, ElementTag::Name(_))
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementTag::Name(n) => f.write_str(n),
            ElementTag::Comment => f.write_str("<Comment>"),
            ElementTag::ProcessingInstruction { target } => write!(f, "<ProcessingInstruction {target}>"),
        }
    }
}

/// Element-like capability set.
///
/// Implementations compare and hash by node identity: two handles are equal
/// only when they denote the same node of the same tree. The parent map and the
/// ancestor axis rely on this.
pub trait ElementNode: Clone + Eq + Hash + fmt::Debug {
    fn tag(&self) -> ElementTag;
    /// Attribute mapping as `(name, value)` pairs, in provider order.
    fn attrib(&self) -> Vec<(String, String)>;
    /// Text content placed before the first child, if any.
    fn text(&self) -> Option<String>;
    /// Immediate children in document order.
    fn children(&self) -> Vec<Self>;

    fn len(&self) -> usize {
        self.children().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pre-order enumeration of the subtree rooted at `self` (inclusive).
    ///
    /// Every element is reported once even if the provider links a node into
    /// its own subtree.
    fn iter(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![self.clone()];
        while let Some(elem) = stack.pop() {
            if !seen.insert(elem.clone()) {
                continue;
            }
            stack.extend(elem.children().into_iter().rev());
            out.push(elem);
        }
        out
    }
}

/// Document-like capability set.
pub trait DocumentNode: Clone + PartialEq + fmt::Debug {
    type Element: ElementNode;

    fn root(&self) -> Self::Element;

    fn iter(&self) -> Vec<Self::Element> {
        self.root().iter()
    }

    /// Elements of the document whose tag name equals `tag`, in document order.
    fn iter_tag(&self, tag: &str) -> Vec<Self::Element> {
        self.iter()
            .into_iter()
            .filter(|e| e.tag().name() == Some(tag))
            .collect()
    }
}

/// An attribute node: a `(name, value)` pair owned by an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeNode {
    pub name: String,
    pub value: String,
}

impl AttributeNode {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// True for `xml:id` in Clark notation.
    pub fn is_xml_id(&self) -> bool {
        self.name == XML_ID_ATTRIBUTE
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for AttributeNode {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// A namespace node: a `(prefix, uri)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceNode {
    pub prefix: String,
    pub uri: String,
}

impl NamespaceNode {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), uri: uri.into() }
    }
}
