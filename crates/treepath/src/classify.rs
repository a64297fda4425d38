//! XPath node kind tests.
//!
//! There are seven kinds of nodes: element, attribute, text, namespace,
//! processing-instruction, comment and document. Element-like items cover
//! elements, comments and processing instructions; the tag marker decides
//! which. All predicates are total and never fail.
use crate::model::{DocumentNode, ElementNode, ElementTag, NodeKind};
use crate::xdm::XPathItem;

pub fn is_element_like<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    matches!(item, XPathItem::Element(_))
}

/// Element test. With `tag`, the element name must also match.
pub fn is_element_node<D: DocumentNode>(item: &XPathItem<D>, tag: Option<&str>) -> bool {
    match item {
        XPathItem::Element(e) => match (e.tag(), tag) {
            (ElementTag::Name(_), None) => true,
            (ElementTag::Name(name), Some(tag)) => name == tag,
            _ => false,
        },
        _ => false,
    }
}

pub fn is_comment_node<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    matches!(item, XPathItem::Element(e) if e.tag() == ElementTag::Comment)
}

pub fn is_processing_instruction_node<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    matches!(item, XPathItem::Element(e) if matches!(e.tag(), ElementTag::ProcessingInstruction { .. }))
}

pub fn is_document_node<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    matches!(item, XPathItem::Document(_))
}

/// Attribute test. With `name`, the attribute name must also match.
pub fn is_attribute_node<D: DocumentNode>(item: &XPathItem<D>, name: Option<&str>) -> bool {
    match (item, name) {
        (XPathItem::Attribute(_), None) => true,
        (XPathItem::Attribute(attr), Some(name)) => attr.name == name,
        _ => false,
    }
}

pub fn is_namespace_node<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    matches!(item, XPathItem::Namespace(_))
}

pub fn is_text_node<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    matches!(item, XPathItem::Text(_))
}

/// True for every node kind, false for atomic values.
pub fn is_xpath_node<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    !matches!(item, XPathItem::Atomic(_))
}

pub fn node_kind<D: DocumentNode>(item: &XPathItem<D>) -> Option<NodeKind> {
    Some(match item {
        XPathItem::Document(_) => NodeKind::Document,
        XPathItem::Element(e) => match e.tag() {
            ElementTag::Name(_) => NodeKind::Element,
            ElementTag::Comment => NodeKind::Comment,
            ElementTag::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
        },
        XPathItem::Attribute(_) => NodeKind::Attribute,
        XPathItem::Namespace(_) => NodeKind::Namespace,
        XPathItem::Text(_) => NodeKind::Text,
        XPathItem::Atomic(_) => return None,
    })
}
