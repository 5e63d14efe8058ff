//! Parent contract shared by every node that owns children
//!
//! All structural mutation funnels through the provided methods here, so the
//! child-kind gate runs before every insertion regardless of the caller. Raw
//! child access needs an [`Internal`] witness, which only this crate can build.
//!
//! ```compile_fail
//! use herald_vdom::{Node, ParentNode};
//!
//! let mut embed = Node::embed(None);
//! let parent = embed.as_parent_mut().unwrap();
//! parent.children_mut(Default::default()).push(Node::message("x"));
//! ```

use tracing::trace;

use crate::error::{RenderError, RenderResult};

use super::{Children, Node, NodeId, NodeKind};

/// Witness for unchecked child access.
///
/// It can be named in signatures but not constructed outside the crate, so
/// [`ParentNode::children_mut`] is unreachable from other crates and the trait
/// cannot be implemented there.
#[derive(Debug, Clone, Copy)]
pub struct Internal(());

impl Internal {
    pub(crate) const TOKEN: Self = Self(());
}

/// A node owning an ordered sequence of children.
pub trait ParentNode {
    /// Kind of this parent
    fn kind(&self) -> NodeKind;

    /// Identity of this parent
    fn id(&self) -> NodeId;

    /// Ordered children
    fn children(&self) -> &Children;

    /// Mutable children; callers must uphold [`accepts`](Self::accepts)
    /// themselves.
    fn children_mut(&mut self, _: Internal) -> &mut Children;

    /// Child-kind predicate, stable for the parent's kind
    fn accepts(&self, child: NodeKind) -> bool;

    /// Whether `child` may be attached under this parent
    fn is_valid_child(&self, child: &Node) -> bool {
        self.accepts(child.kind())
    }

    /// Fail with [`RenderError::InvalidChild`] unless `child` is accepted
    fn ensure_valid_child(&self, child: &Node) -> RenderResult<()> {
        if self.is_valid_child(child) {
            Ok(())
        } else {
            Err(RenderError::invalid_child(child.kind(), self.kind()))
        }
    }

    /// Index of the direct child with this id
    fn position_of(&self, id: NodeId) -> Option<usize> {
        self.children().iter().position(|c| c.id() == id)
    }

    /// Insert at the end, or right after `after` when given.
    ///
    /// When `after` is not a current child nothing is inserted.
    fn append_child(&mut self, child: Node, after: Option<NodeId>) -> RenderResult<()> {
        self.ensure_valid_child(&child)?;
        match after {
            None => self.children_mut(Internal::TOKEN).push(child),
            Some(anchor) => match self.position_of(anchor) {
                Some(index) => self.children_mut(Internal::TOKEN).insert(index + 1, child),
                None => trace!(parent = %self.id(), %anchor, "append anchor not found, child dropped"),
            },
        }
        Ok(())
    }

    /// Insert at the start, or right before `before` when given.
    ///
    /// When `before` is not a current child nothing is inserted.
    fn prepend_child(&mut self, child: Node, before: Option<NodeId>) -> RenderResult<()> {
        self.ensure_valid_child(&child)?;
        match before {
            None => self.children_mut(Internal::TOKEN).insert(0, child),
            Some(anchor) => match self.position_of(anchor) {
                Some(index) => self.children_mut(Internal::TOKEN).insert(index, child),
                None => trace!(parent = %self.id(), %anchor, "prepend anchor not found, child dropped"),
            },
        }
        Ok(())
    }

    /// Detach the direct child with this id, handing ownership back
    fn remove_child(&mut self, child: NodeId) -> Option<Node> {
        let index = self.position_of(child)?;
        Some(self.children_mut(Internal::TOKEN).remove(index))
    }

    /// Drop every child.
    ///
    /// The sequence is truncated in place; its allocation is kept, so a
    /// `children()` borrow taken afterwards observes the same buffer, empty.
    fn remove_all_children(&mut self) {
        self.children_mut(Internal::TOKEN).clear();
    }
}
