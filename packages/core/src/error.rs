use crate::NodeId;

pub type Result<T, E = MintError> = std::result::Result<T, E>;

/// Errors surfaced to the caller of a Mintkit operation.
///
/// Failures inside a flush never show up here. They are contained and reported through
/// `tracing`.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// The caller passed something the operation cannot work with, like an empty tag name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The DOM environment refused an edit.
    #[error("dom error: {0}")]
    Dom(#[from] DomError),
}

/// An error raised by a [`Dom`](crate::Dom) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("{parent:?} has no child at index {index}")]
    MissingChild { parent: NodeId, index: usize },

    #[error("`{0}` is not a valid tag name")]
    InvalidTagName(String),

    #[error("cannot insert {child:?} into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
