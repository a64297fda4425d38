//! Evaluation contract of expression-tree tokens.
//!
//! Tokens are built by a parser that lives outside this crate. Each one
//! implements [`XPathToken::evaluate`]; the remaining methods are shared
//! behavior every token gets for free: lazy selection, the effective boolean
//! value, node-name extraction and error construction.
use core::fmt;

use crate::classify::{is_attribute_node, is_element_like, is_namespace_node, is_xpath_node};
use crate::context::XPathContext;
use crate::error::{Error, ErrorCode};
use crate::model::{DocumentNode, ElementNode, ElementTag};
use crate::xdm::{XPathItem, XPathValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenLabel {
    Operator,
    Function,
    Axis,
    Literal,
    Variable,
    Name,
    KindTest,
}

impl fmt::Display for TokenLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenLabel::Operator => "operator",
            TokenLabel::Function => "function",
            TokenLabel::Axis => "axis",
            TokenLabel::Literal => "literal",
            TokenLabel::Variable => "variable",
            TokenLabel::Name => "name",
            TokenLabel::KindTest => "kind test",
        })
    }
}

pub type Selection<'a, D> = Box<dyn Iterator<Item = Result<XPathValue<D>, Error>> + 'a>;

pub trait XPathToken<D: DocumentNode> {
    fn symbol(&self) -> &str;

    fn label(&self) -> TokenLabel;

    fn operands(&self) -> Vec<&dyn XPathToken<D>> {
        Vec::new()
    }

    /// Source form of the token's value (`'a'`, `1`, `foo`), if it has one.
    fn literal(&self) -> Option<String> {
        None
    }

    /// Value of the token at the current cursor position. `None` means the
    /// token produces nothing. Tokens that need a cursor must fail with
    /// [`XPathToken::missing_context`] when `context` is `None`.
    fn evaluate(&self, context: Option<&mut XPathContext<D>>) -> Result<Option<XPathValue<D>>, Error>;

    /// Lazy sequence of the token's results.
    ///
    /// `evaluate` runs on the first pull. A single-item result also becomes
    /// the context item; a sequence result leaves the cursor where it is.
    fn select<'a>(&'a self, context: &'a mut XPathContext<D>) -> Selection<'a, D>
    where
        D: 'a,
    {
        Box::new(Select { token: self, context, done: false })
    }

    fn describe(&self) -> String {
        let symbol = self.symbol();
        match (symbol, self.label()) {
            ("$", _) => {
                let name = self.operands().first().and_then(|t| t.literal()).unwrap_or_default();
                format!("${name} variable reference")
            }
            (",", _) => "comma operator".to_string(),
            (_, TokenLabel::Function) => {
                let args: Vec<String> = self.operands().iter().map(|t| t.literal().unwrap_or_default()).collect();
                format!("{symbol}({}) function", args.join(", "))
            }
            (_, TokenLabel::Axis) => format!("{symbol} axis"),
            (_, label) => format!("'{symbol}' {label}"),
        }
    }

    /// The effective boolean value, as computed by `fn:boolean()`.
    fn boolean(&self, value: &XPathValue<D>) -> Result<bool, Error> {
        match value {
            XPathValue::Sequence(items) => match items.as_slice() {
                [] => Ok(false),
                [first, ..] if is_xpath_node(first) => Ok(true),
                [single] => Ok(item_truthiness(single)),
                _ => Err(self.wrong_type("not a test expression")),
            },
            XPathValue::Item(item)
                if is_element_like(item) || is_attribute_node(item, None) || is_namespace_node(item) =>
            {
                Err(self.wrong_type("not a test expression"))
            }
            XPathValue::Item(item) => Ok(item_truthiness(item)),
        }
    }

    /// Node name as used by `fn:name()`.
    fn name(&self, value: &XPathValue<D>) -> Result<String, Error> {
        let item = match value {
            XPathValue::Sequence(items) => match items.as_slice() {
                [] => return Ok(String::new()),
                [single] => single,
                _ => return Err(self.wrong_type("an XPath node required, got a sequence of more than one item")),
            },
            XPathValue::Item(item) => item,
        };
        match item {
            XPathItem::Element(e) => Ok(match e.tag() {
                ElementTag::Name(name) => name,
                ElementTag::ProcessingInstruction { target } => target,
                ElementTag::Comment => String::new(),
            }),
            XPathItem::Attribute(attr) => Ok(attr.name.clone()),
            XPathItem::Document(_) | XPathItem::Namespace(_) | XPathItem::Text(_) => Ok(String::new()),
            XPathItem::Atomic(a) if !a.truthiness() => Ok(String::new()),
            XPathItem::Atomic(a) => Err(self.wrong_type(&format!("an XPath node required: {a}"))),
        }
    }

    fn wrong_type(&self, message: &str) -> Error {
        Error::type_error(format!("{}: {message}", self.describe()))
    }

    fn missing_context(&self) -> Error {
        Error::from_code(
            ErrorCode::XPDY0002,
            format!("{}: dynamic context required for evaluate", self.describe()),
        )
    }
}

fn item_truthiness<D: DocumentNode>(item: &XPathItem<D>) -> bool {
    match item {
        XPathItem::Atomic(a) => a.truthiness(),
        XPathItem::Text(s) => !s.is_empty(),
        _ => true,
    }
}

/// Default [`XPathToken::select`] sequence: at most one value.
pub struct Select<'a, D: DocumentNode, T: ?Sized> {
    token: &'a T,
    context: &'a mut XPathContext<D>,
    done: bool,
}

impl<D: DocumentNode, T: XPathToken<D> + ?Sized> Iterator for Select<'_, D, T> {
    type Item = Result<XPathValue<D>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.done = true;
        match self.token.evaluate(Some(&mut *self.context)) {
            Ok(Some(value)) => {
                if let XPathValue::Item(item) = &value {
                    self.context.item = Some(item.clone());
                }
                Some(Ok(value))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
