//! Stateful axis traversals over an [`XPathContext`].
//!
//! Each traversal borrows the context mutably, snapshots the cursor fields
//! `(item, size, position, active_iterator)`, moves the cursor onto every node
//! it yields and puts the snapshot back when it is exhausted, fails, or is
//! dropped half way. Between two calls to `next` the cursor describes the node
//! just yielded; [`AxisIter::context_mut`] lets a consumer read it or start a
//! nested traversal from there.
use core::fmt;
use std::collections::HashSet;

use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::classify::{is_attribute_node, is_element_like, is_element_node};
use crate::context::{ContextRoot, CursorState, CycleDetection, NodeKindTest, XPathContext, element_test};
use crate::error::Error;
use crate::model::{AttributeNode, DocumentNode, ElementNode};
use crate::xdm::XPathItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    SelfAxis,
    Attribute,
    Descendant,
    Child,
    Ancestor,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::SelfAxis => "self",
            Axis::Attribute => "attribute",
            Axis::Descendant => "descendant-or-self",
            Axis::Child => "child",
            Axis::Ancestor => "ancestor",
        })
    }
}

fn attribute_test<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    is_attribute_node(item, None)
}

// Pending children of one element during a pre-order walk
struct Frame<E> {
    siblings: Vec<E>,
    next: usize,
}

enum AxisState<D: DocumentNode> {
    SelfOnce {
        emitted: bool,
    },
    Attributes {
        pending: std::vec::IntoIter<AttributeNode>,
    },
    Descend {
        // document node to report before its root element
        document: Option<D>,
        start: Option<D::Element>,
        text: Option<String>,
        stack: SmallVec<[Frame<D::Element>; 16]>,
    },
    Children {
        root: Option<D::Element>,
        text: Option<String>,
        children: Vec<D::Element>,
        next: usize,
    },
    Ancestors {
        origin: D::Element,
        current: D::Element,
        visited: Option<HashSet<D::Element>>,
    },
    Done,
}

/// A running axis traversal. Yields `Result` because the ancestor axis can
/// detect a circular tree; the other axes never fail.
pub struct AxisIter<'c, D: DocumentNode> {
    ctx: &'c mut XPathContext<D>,
    saved: Option<CursorState<D>>,
    saved_kind_test: Option<NodeKindTest<D>>,
    state: AxisState<D>,
}

impl<'c, D: DocumentNode> AxisIter<'c, D> {
    fn begin(ctx: &'c mut XPathContext<D>, axis: Axis, item: Option<XPathItem<D>>) -> Self {
        let saved = ctx.snapshot();
        ctx.active = Some(axis);
        if let Some(item) = item {
            ctx.item = Some(item);
        }
        trace!(axis = %axis, position = ctx.position, size = ctx.size, "axis traversal started");
        Self { ctx, saved: Some(saved), saved_kind_test: None, state: AxisState::Done }
    }

    fn with_kind_test(mut self, test: NodeKindTest<D>) -> Self {
        self.saved_kind_test = Some(self.ctx.node_kind_test);
        self.ctx.node_kind_test = test;
        self
    }

    fn with_state(mut self, state: AxisState<D>) -> Self {
        self.state = state;
        self
    }

    pub(crate) fn self_axis(ctx: &'c mut XPathContext<D>) -> Self {
        // The element test stays installed after the traversal ends.
        ctx.node_kind_test = element_test::<D>;
        Self::begin(ctx, Axis::SelfAxis, None).with_state(AxisState::SelfOnce { emitted: false })
    }

    pub(crate) fn attributes(ctx: &'c mut XPathContext<D>) -> Self {
        let attrs = match &ctx.item {
            Some(item @ XPathItem::Element(e)) if is_element_node(item, None) => Some(e.attrib()),
            _ => None,
        };
        // Not on an element: the cursor is left untouched.
        let Some(attrs) = attrs else {
            return Self { ctx, saved: None, saved_kind_test: None, state: AxisState::Done };
        };
        let mut attrs: Vec<AttributeNode> = attrs.into_iter().map(AttributeNode::from).collect();
        attrs.sort();
        Self::begin(ctx, Axis::Attribute, None)
            .with_kind_test(attribute_test::<D>)
            .with_state(AxisState::Attributes { pending: attrs.into_iter() })
    }

    pub(crate) fn descendants(ctx: &'c mut XPathContext<D>, item: Option<XPathItem<D>>) -> Self {
        let iter = Self::begin(ctx, Axis::Descendant, item);
        let (document, start) = if iter.ctx.at_document() {
            match iter.ctx.root() {
                ContextRoot::Document(d) => (Some(d.clone()), Some(d.root())),
                ContextRoot::Element(e) => (None, Some(e.clone())),
            }
        } else {
            match &iter.ctx.item {
                Some(XPathItem::Element(e)) => (None, Some(e.clone())),
                _ => (None, None),
            }
        };
        if start.is_none() {
            return iter;
        }
        iter.with_state(AxisState::Descend { document, start, text: None, stack: SmallVec::new() })
    }

    pub(crate) fn children(ctx: &'c mut XPathContext<D>, item: Option<XPathItem<D>>) -> Self {
        let iter = Self::begin(ctx, Axis::Child, item);
        let state = if iter.ctx.at_document() {
            AxisState::Children {
                root: Some(iter.ctx.root_element()),
                text: None,
                children: Vec::new(),
                next: 0,
            }
        } else {
            match &iter.ctx.item {
                Some(item @ XPathItem::Element(e)) if is_element_node(item, None) => AxisState::Children {
                    root: None,
                    text: e.text(),
                    children: e.children(),
                    next: 0,
                },
                _ => AxisState::Done,
            }
        };
        iter.with_state(state)
    }

    pub(crate) fn ancestors(ctx: &'c mut XPathContext<D>, item: Option<XPathItem<D>>) -> Self {
        let iter = Self::begin(ctx, Axis::Ancestor, item);
        let origin = match &iter.ctx.item {
            Some(item @ XPathItem::Element(e)) if is_element_like(item) => Some(e.clone()),
            _ => None,
        };
        let Some(origin) = origin else {
            return iter;
        };
        let visited = match iter.ctx.cycle_detection() {
            CycleDetection::Direct => None,
            CycleDetection::Full => Some(HashSet::new()),
        };
        iter.with_state(AxisState::Ancestors { current: origin.clone(), origin, visited })
    }

    pub fn context(&self) -> &XPathContext<D> {
        &*self.ctx
    }

    pub fn context_mut(&mut self) -> &mut XPathContext<D> {
        &mut *self.ctx
    }

    fn restore(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.ctx.restore(saved);
        }
        if let Some(test) = self.saved_kind_test.take() {
            self.ctx.node_kind_test = test;
        }
    }

    // Enters an element during the descendant walk: reports it, queues its
    // text and its children.
    fn visit(
        ctx: &mut XPathContext<D>,
        elem: D::Element,
        text: &mut Option<String>,
        stack: &mut SmallVec<[Frame<D::Element>; 16]>,
    ) -> XPathItem<D> {
        *text = elem.text();
        let children = elem.children();
        if !children.is_empty() {
            stack.push(Frame { siblings: children, next: 0 });
        }
        let item = XPathItem::Element(elem);
        ctx.item = Some(item.clone());
        item
    }

    fn advance(&mut self) -> Option<Result<XPathItem<D>, Error>> {
        let ctx = &mut *self.ctx;
        match &mut self.state {
            AxisState::Done => None,
            AxisState::SelfOnce { emitted } => {
                if *emitted {
                    return None;
                }
                *emitted = true;
                Some(Ok(ctx.item.clone().unwrap_or_else(|| ctx.root().to_item())))
            }
            AxisState::Attributes { pending } => {
                let item = XPathItem::Attribute(pending.next()?);
                ctx.item = Some(item.clone());
                Some(Ok(item))
            }
            AxisState::Descend { document, start, text, stack } => {
                if let Some(doc) = document.take() {
                    ctx.size = 1;
                    ctx.position = 0;
                    return Some(Ok(XPathItem::Document(doc)));
                }
                if let Some(elem) = start.take() {
                    return Some(Ok(Self::visit(ctx, elem, text, stack)));
                }
                if let Some(t) = text.take() {
                    let item = XPathItem::Text(t);
                    ctx.item = Some(item.clone());
                    return Some(Ok(item));
                }
                while let Some(frame) = stack.last_mut() {
                    if let Some(child) = frame.siblings.get(frame.next).cloned() {
                        ctx.size = frame.siblings.len();
                        ctx.position = frame.next;
                        frame.next += 1;
                        return Some(Ok(Self::visit(ctx, child, text, stack)));
                    }
                    stack.pop();
                }
                None
            }
            AxisState::Children { root, text, children, next } => {
                if let Some(root) = root.take() {
                    ctx.size = 1;
                    ctx.position = 0;
                    let item = XPathItem::Element(root);
                    ctx.item = Some(item.clone());
                    return Some(Ok(item));
                }
                if let Some(t) = text.take() {
                    let item = XPathItem::Text(t);
                    ctx.item = Some(item.clone());
                    return Some(Ok(item));
                }
                let child = children.get(*next).cloned()?;
                ctx.size = children.len();
                ctx.position = *next;
                *next += 1;
                let item = XPathItem::Element(child);
                ctx.item = Some(item.clone());
                Some(Ok(item))
            }
            AxisState::Ancestors { origin, current, visited } => {
                let parent = ctx.parent_map().get(&*current).cloned()?;
                let revisited = visited.as_mut().is_some_and(|seen| !seen.insert(parent.clone()));
                if parent == *origin || revisited {
                    warn!(node = ?origin, "circular parent link in element tree");
                    return Some(Err(Error::value_error(format!(
                        "not an Element tree, circularity found for {origin:?}"
                    ))));
                }
                *current = parent.clone();
                let item = XPathItem::Element(parent);
                ctx.item = Some(item.clone());
                Some(Ok(item))
            }
        }
    }
}

impl<D: DocumentNode> Iterator for AxisIter<'_, D> {
    type Item = Result<XPathItem<D>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.advance();
        if !matches!(step, Some(Ok(_))) {
            self.state = AxisState::Done;
            self.restore();
        }
        step
    }
}

impl<D: DocumentNode> Drop for AxisIter<'_, D> {
    fn drop(&mut self) {
        self.restore();
    }
}
