pub mod axes;
pub mod classify;
pub mod consts;
pub mod context;
pub mod error;
pub mod model;
pub mod simple_node;
pub mod token;
pub mod xdm;

pub use axes::{Axis, AxisIter};
pub use classify::{
    is_attribute_node, is_comment_node, is_document_node, is_element_like, is_element_node, is_namespace_node,
    is_processing_instruction_node, is_text_node, is_xpath_node, node_kind,
};
pub use context::{ContextRoot, CycleDetection, ParentMap, XPathContext, XPathContextBuilder};
pub use error::{Error, ErrorCode, ErrorKind};
pub use model::{AttributeNode, DocumentNode, ElementNode, ElementTag, NamespaceNode, NodeKind};
pub use simple_node::{SimpleDocument, SimpleElement, comment, doc, elem, pi};
pub use token::{Selection, TokenLabel, XPathToken};
pub use xdm::{AtomicValue, XPathItem, XPathValue};
