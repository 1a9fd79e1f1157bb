//! The DOM environment Mintkit renders into.
//!
//! The core never talks to a browser directly. Everything it needs from the outside world goes
//! through [`Dom`], which hands out opaque [`NodeId`]s. A renderer maps those ids to whatever
//! real nodes it manages.

use std::cell::RefCell;
use std::rc::Rc;

use crate::innerlude::*;

/// An opaque handle to a node owned by a [`Dom`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

/// A live element property that is not an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
}

/// The node kinds a [`Dom`] knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Fragment,
}

/// A shared, single-threaded handle to a DOM environment.
pub type DomHandle = Rc<RefCell<dyn Dom>>;

/// Wrap a DOM implementation into a [`DomHandle`].
pub fn dom_handle(dom: impl Dom + 'static) -> DomHandle {
    Rc::new(RefCell::new(dom))
}

/// A DOM-like environment.
///
/// Implementations follow browser semantics: appending a fragment moves its children, appending
/// a node that already has a parent moves it.
pub trait Dom {
    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError>;
    fn create_text_node(&mut self, text: &str) -> NodeId;
    fn create_fragment(&mut self) -> NodeId;

    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    fn is_element(&self, node: NodeId) -> bool {
        self.node_kind(node) == Some(NodeKind::Element)
    }

    /// Lower-case tag name of an element.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;
    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), DomError>;
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Detach every child of `parent`, like assigning an empty `innerHTML`.
    fn clear_children(&mut self, parent: NodeId) -> Result<(), DomError> {
        for child in self.children(parent) {
            self.remove_child(parent, child)?;
        }
        Ok(())
    }

    /// Release a detached node and its descendants. The id must not be used afterwards.
    ///
    /// Nodes that still have a parent are left alone.
    fn reclaim(&mut self, _node: NodeId) {}

    /// Detach and reclaim every child of `parent`.
    fn discard_children(&mut self, parent: NodeId) -> Result<(), DomError> {
        for child in self.children(parent) {
            self.remove_child(parent, child)?;
            self.reclaim(child);
        }
        Ok(())
    }

    fn get_attribute(&self, element: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), DomError>;
    fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<(), DomError>;

    fn set_class_name(&mut self, element: NodeId, class: &str) -> Result<(), DomError>;

    /// Set one property of the live inline style. An empty value clears it.
    fn set_style_property(
        &mut self,
        element: NodeId,
        property: &str,
        value: &str,
    ) -> Result<(), DomError>;

    fn set_property(
        &mut self,
        element: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), DomError>;

    fn add_event_listener(
        &mut self,
        element: NodeId,
        event: &str,
        listener: Listener,
    ) -> Result<(), DomError>;
    fn remove_event_listener(
        &mut self,
        element: NodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), DomError>;

    /// The concatenated text of a node and its descendants.
    fn text_content(&self, node: NodeId) -> String;

    /// The document root (`<html>`).
    fn document_element(&self) -> NodeId;

    /// The `<head>` element, if the document has one.
    fn head(&self) -> Option<NodeId>;

    /// The first element under `root` (inclusive) matching a simple selector.
    fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId>;
}
