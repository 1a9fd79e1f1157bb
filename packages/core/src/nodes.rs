//! Virtual Node Support
//!
//! A [`VNode`] describes what a piece of the DOM should look like. Trees of them are cheap to
//! build and clone, and are compared against each other before any real node is touched.

use crate::innerlude::*;

/// A node of the virtual tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VNode {
    /// Renders nothing. Materializes as an empty text node.
    #[default]
    Empty,

    /// A text node.
    Text(String),

    /// An element with props and children.
    Element(VElement),

    /// A list of sibling nodes, materialized as a document fragment.
    Fragment(Vec<VNode>),
}

/// An element node.
///
/// The fields are public so trees can be assembled by hand; [`create_element`] is the checked way
/// in. An element with an empty tag is malformed and renders as an empty text node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VElement {
    pub tag: String,
    pub props: Props,
    pub children: Vec<VNode>,
    pub key: Option<String>,
}

impl VElement {
    pub fn is_malformed(&self) -> bool {
        self.tag.trim().is_empty()
    }
}

impl VNode {
    pub fn text(text: impl Into<String>) -> Self {
        VNode::Text(text.into())
    }

    /// Build an element without validating the tag.
    pub fn element(
        tag: impl Into<String>,
        props: Props,
        children: impl IntoIterator<Item = VNode>,
    ) -> Self {
        let key = props.key_value().map(str::to_string);
        VNode::Element(VElement {
            tag: tag.into(),
            props,
            children: flatten_children(children),
            key,
        })
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element(el) => Some(&el.tag),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            VNode::Element(el) => el.key.as_deref(),
            _ => None,
        }
    }

    pub fn props(&self) -> Option<&Props> {
        match self {
            VNode::Element(el) => Some(&el.props),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element(el) => &el.children,
            VNode::Fragment(children) => children,
            _ => &[],
        }
    }

    pub fn is_text_like(&self) -> bool {
        matches!(self, VNode::Text(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, VNode::Empty)
    }

    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            VNode::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl From<&str> for VNode {
    fn from(text: &str) -> Self {
        VNode::Text(text.to_string())
    }
}

impl From<String> for VNode {
    fn from(text: String) -> Self {
        VNode::Text(text)
    }
}

impl From<VElement> for VNode {
    fn from(el: VElement) -> Self {
        VNode::Element(el)
    }
}

impl<T: Into<VNode>> From<Option<T>> for VNode {
    fn from(node: Option<T>) -> Self {
        node.map(Into::into).unwrap_or(VNode::Empty)
    }
}

impl From<Vec<VNode>> for VNode {
    fn from(nodes: Vec<VNode>) -> Self {
        VNode::Fragment(nodes)
    }
}

macro_rules! number_text_node {
    ($($t:ty),*) => {
        $(
            impl From<$t> for VNode {
                fn from(value: $t) -> Self {
                    VNode::Text(value.to_string())
                }
            }
        )*
    };
}

number_text_node!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

/// Create an element node.
///
/// Children are flattened to any depth and [`VNode::Empty`] entries are dropped. The key is taken
/// from `props`. Fails with [`MintError::InvalidArgument`] when `tag` is empty.
///
/// ```rust
/// # use mintkit_core::prelude::*;
/// let node = create_element(
///     "div",
///     Props::new().class("a"),
///     [VNode::from("x"), VNode::Empty, VNode::from("y")],
/// )
/// .unwrap();
/// assert_eq!(node.children(), &[VNode::from("x"), VNode::from("y")]);
/// ```
pub fn create_element(
    tag: &str,
    props: Props,
    children: impl IntoIterator<Item = VNode>,
) -> Result<VNode> {
    if tag.trim().is_empty() {
        return Err(MintError::InvalidArgument(
            "create_element: tag must be a non-empty string".to_string(),
        ));
    }
    Ok(VNode::element(tag, props, children))
}

/// Two text nodes are always the same type; elements need a matching tag and key.
pub fn is_same_node_type(a: &VNode, b: &VNode) -> bool {
    match (a, b) {
        (VNode::Text(_), VNode::Text(_)) => true,
        (VNode::Element(a), VNode::Element(b)) => a.tag == b.tag && a.key == b.key,
        _ => false,
    }
}

fn flatten_children(children: impl IntoIterator<Item = VNode>) -> Vec<VNode> {
    let mut out = Vec::new();
    for child in children {
        push_flat(&mut out, child);
    }
    out
}

fn push_flat(out: &mut Vec<VNode>, node: VNode) {
    match node {
        VNode::Empty => {}
        VNode::Fragment(children) => {
            for child in children {
                push_flat(out, child);
            }
        }
        other => out.push(other),
    }
}
