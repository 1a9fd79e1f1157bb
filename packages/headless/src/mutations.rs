//! The edit log of a headless document.

use mintkit_core::{NodeId, PropertyValue};

/// One edit applied to a [`Document`](crate::Document).
///
/// Node creation is logged too, so a render that creates nothing and edits nothing leaves the log
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateElement {
        id: NodeId,
        tag: String,
    },
    CreateTextNode {
        id: NodeId,
        text: String,
    },
    CreateFragment {
        id: NodeId,
    },
    AppendChild {
        parent: NodeId,
        child: NodeId,
    },
    ReplaceChild {
        parent: NodeId,
        new: NodeId,
        old: NodeId,
    },
    RemoveChild {
        parent: NodeId,
        child: NodeId,
    },
    SetAttribute {
        id: NodeId,
        name: String,
        value: String,
    },
    RemoveAttribute {
        id: NodeId,
        name: String,
    },
    SetClassName {
        id: NodeId,
        class: String,
    },
    SetStyleProperty {
        id: NodeId,
        property: String,
        value: String,
    },
    SetProperty {
        id: NodeId,
        name: String,
        value: PropertyValue,
    },
    AddEventListener {
        id: NodeId,
        event: String,
    },
    RemoveEventListener {
        id: NodeId,
        event: String,
    },
}

impl Mutation {
    /// Whether this edit changed the shape of the tree rather than a node's contents.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::AppendChild { .. }
                | Mutation::ReplaceChild { .. }
                | Mutation::RemoveChild { .. }
        )
    }

    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Mutation::CreateElement { .. }
                | Mutation::CreateTextNode { .. }
                | Mutation::CreateFragment { .. }
        )
    }
}
