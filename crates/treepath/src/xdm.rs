use core::fmt;

use crate::model::{AttributeNode, DocumentNode, NamespaceNode};

#[derive(Debug, Clone, PartialEq)]
pub enum AtomicValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
}

impl AtomicValue {
    /// Truth value of a scalar: `false`, `0`, `0.0`, `NaN` and `""` are false.
    pub fn truthiness(&self) -> bool {
        match self {
            AtomicValue::Boolean(b) => *b,
            AtomicValue::Integer(i) => *i != 0,
            AtomicValue::Double(d) => *d != 0.0 && !d.is_nan(),
            AtomicValue::String(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomicValue::Boolean(b) => write!(f, "{b}"),
            AtomicValue::Integer(i) => write!(f, "{i}"),
            AtomicValue::Double(d) => write!(f, "{d}"),
            AtomicValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Anything the cursor can denote: one of the seven node kinds or a scalar.
///
/// Comments and processing instructions travel as `Element` items; their
/// [`ElementTag`](crate::model::ElementTag) marker tells them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathItem<D: DocumentNode> {
    Document(D),
    Element(D::Element),
    Attribute(AttributeNode),
    Namespace(NamespaceNode),
    Text(String),
    Atomic(AtomicValue),
}

impl<D: DocumentNode> XPathItem<D> {
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        XPathItem::Attribute(AttributeNode::new(name, value))
    }

    pub fn namespace(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        XPathItem::Namespace(NamespaceNode::new(prefix, uri))
    }

    pub fn text(value: impl Into<String>) -> Self {
        XPathItem::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&D::Element> {
        match self {
            XPathItem::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl<D: DocumentNode> From<AttributeNode> for XPathItem<D> {
    fn from(a: AttributeNode) -> Self {
        XPathItem::Attribute(a)
    }
}

impl<D: DocumentNode> From<NamespaceNode> for XPathItem<D> {
    fn from(n: NamespaceNode) -> Self {
        XPathItem::Namespace(n)
    }
}

impl<D: DocumentNode> From<AtomicValue> for XPathItem<D> {
    fn from(a: AtomicValue) -> Self {
        XPathItem::Atomic(a)
    }
}

impl<D: DocumentNode> From<bool> for XPathItem<D> {
    fn from(b: bool) -> Self {
        XPathItem::Atomic(AtomicValue::Boolean(b))
    }
}

impl<D: DocumentNode> From<i64> for XPathItem<D> {
    fn from(i: i64) -> Self {
        XPathItem::Atomic(AtomicValue::Integer(i))
    }
}

impl<D: DocumentNode> From<f64> for XPathItem<D> {
    fn from(d: f64) -> Self {
        XPathItem::Atomic(AtomicValue::Double(d))
    }
}

impl<D: DocumentNode> From<&str> for XPathItem<D> {
    fn from(s: &str) -> Self {
        XPathItem::Atomic(AtomicValue::String(s.to_string()))
    }
}

/// Result of evaluating a token: a bare item or a sequence of items.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<D: DocumentNode> {
    Item(XPathItem<D>),
    Sequence(Vec<XPathItem<D>>),
}

impl<D: DocumentNode> XPathValue<D> {
    pub fn empty() -> Self {
        XPathValue::Sequence(Vec::new())
    }

    pub fn into_items(self) -> Vec<XPathItem<D>> {
        match self {
            XPathValue::Item(i) => vec![i],
            XPathValue::Sequence(s) => s,
        }
    }
}

impl<D: DocumentNode> From<XPathItem<D>> for XPathValue<D> {
    fn from(i: XPathItem<D>) -> Self {
        XPathValue::Item(i)
    }
}

impl<D: DocumentNode> From<Vec<XPathItem<D>>> for XPathValue<D> {
    fn from(s: Vec<XPathItem<D>>) -> Self {
        XPathValue::Sequence(s)
    }
}

impl<D: DocumentNode> From<AtomicValue> for XPathValue<D> {
    fn from(a: AtomicValue) -> Self {
        XPathValue::Item(XPathItem::Atomic(a))
    }
}
