//! Error types for herald-vdom.
//!
//! Every error except [`RenderError::Abandoned`] signals a defect in the layer
//! driving the tree (a description asked for a shape the node model forbids).
//! None of them are retried.

use thiserror::Error;

use crate::attr::AttrKey;
use crate::node::{NodeId, NodeKind};

/// Errors that can occur while building, mutating or observing a render tree.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A parent was asked to accept a child kind it does not permit
    #[error("'{child}' is not a valid {parent} child")]
    InvalidChild {
        /// Kind of the rejected child
        child: NodeKind,
        /// Kind of the parent that rejected it
        parent: NodeKind,
    },

    /// A structural operation targeted a leaf node
    #[error("elements of type '{0}' can't have children")]
    NotAParent(NodeKind),

    /// A host tag outside the enumerated kind set
    #[error("'{0}' is not a valid element type")]
    UnknownKind(String),

    /// Root and text nodes are not created from attribute descriptions
    #[error("'{0}' nodes can't be created from attributes")]
    NotCreatable(NodeKind),

    /// The node kind has no such attribute
    #[error("'{kind}' has no '{key}' attribute")]
    UnknownAttribute {
        /// Kind of the node being configured
        kind: NodeKind,
        /// Offending attribute
        key: AttrKey,
    },

    /// The attribute value has the wrong type for its key
    #[error("attribute '{key}' expects {expected}, found {found}")]
    AttributeType {
        /// Attribute being assigned
        key: AttrKey,
        /// Expected value type
        expected: &'static str,
        /// Provided value type
        found: &'static str,
    },

    /// A required attribute is absent or was unset
    #[error("'{kind}' requires a '{key}' attribute")]
    MissingAttribute {
        /// Kind of the node being configured
        kind: NodeKind,
        /// Required attribute
        key: AttrKey,
    },

    /// The operation is not defined for this node kind
    #[error("{operation} is not supported on '{kind}' nodes")]
    UnsupportedOperation {
        /// Name of the attempted operation
        operation: &'static str,
        /// Kind of the targeted node
        kind: NodeKind,
    },

    /// A field slot setter ran before the slot child exists
    #[error("field has no '{0}' child to update")]
    MissingSlot(NodeKind),

    /// An id-addressed operation targeted a node outside the tree
    #[error("node {0} is not attached to this tree")]
    NodeNotFound(NodeId),

    /// The handoff was dropped before any resource was provided
    #[error("render session dropped before a resource was provided")]
    Abandoned,
}

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

impl RenderError {
    /// Create an invalid-child error.
    pub fn invalid_child(child: NodeKind, parent: NodeKind) -> Self {
        Self::InvalidChild { child, parent }
    }

    /// Whether this error belongs to the structural-validity family.
    ///
    /// Unknown kinds and attribute errors count as structural: they all come
    /// from a malformed description, never from the environment.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Abandoned)
    }
}
