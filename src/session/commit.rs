//! Commit batches
//!
//! A [`Commit`] brackets one batch of tree operations. Beginning a batch locks
//! the root, snapshots it and binds the session as active; [`Commit::end_commit`]
//! compares the live root to the snapshot and notifies listeners once if the
//! tree changed.
//!
//! A batch dropped without `end_commit` is aborted: operations already applied
//! stay applied (there is no rollback) but no notification fires.

use parking_lot::MutexGuard;
use tracing::{debug, trace};

use crate::attr::AttrPatch;
use crate::error::{RenderError, RenderResult};
use crate::mutation;
use crate::node::{Node, NodeId, ParentNode, Root};

use super::current::ActiveGuard;
use super::{RenderSession, Surface};

/// Exclusive handle on a session's tree for one batch.
#[must_use = "dropping a batch without `end_commit` suppresses its notification"]
pub struct Commit<'a, S: Surface> {
    pub(super) session: &'a RenderSession<S>,
    pub(super) root: MutexGuard<'a, Root>,
    pub(super) snapshot: Root,
    pub(super) _active: ActiveGuard,
}

impl<'a, S: Surface> Commit<'a, S> {
    /// Live tree, as mutated so far in this batch
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// Look up an attached node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Container-scoped operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a top-level part
    pub fn append_child_to_container(&mut self, child: Node) -> RenderResult<()> {
        trace!(child = %child.kind(), id = %child.id(), "append to root");
        self.root.append_child(child, None)
    }

    /// Insert a top-level part right before `before`
    pub fn insert_in_container_before(&mut self, child: Node, before: NodeId) -> RenderResult<()> {
        trace!(child = %child.kind(), id = %child.id(), %before, "insert into root");
        self.root.prepend_child(child, Some(before))
    }

    /// Detach a top-level part, handing it back
    pub fn remove_child_from_container(&mut self, child: NodeId) -> RenderResult<Node> {
        trace!(%child, "remove from root");
        self.root.remove_child(child).ok_or(RenderError::NodeNotFound(child))
    }

    /// Drop every top-level part
    pub fn clear_container(&mut self) {
        trace!(children = self.root.children().len(), "clear root");
        self.root.remove_all_children();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Node-scoped operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append `child` to the attached parent `parent`
    pub fn append_child(&mut self, parent: NodeId, child: Node) -> RenderResult<()> {
        trace!(%parent, child = %child.kind(), id = %child.id(), "append child");
        self.parent_mut(parent)?.append_child(child, None)
    }

    /// Insert `child` into `parent` right before its child `before`
    pub fn insert_before(&mut self, parent: NodeId, child: Node, before: NodeId) -> RenderResult<()> {
        trace!(%parent, child = %child.kind(), id = %child.id(), %before, "insert child");
        self.parent_mut(parent)?.prepend_child(child, Some(before))
    }

    /// Detach `child` from `parent`, handing it back
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> RenderResult<Node> {
        trace!(%parent, %child, "remove child");
        self.parent_mut(parent)?
            .remove_child(child)
            .ok_or(RenderError::NodeNotFound(child))
    }

    /// Merge an attribute patch onto an attached node
    pub fn commit_update(&mut self, id: NodeId, patch: &AttrPatch) -> RenderResult<()> {
        trace!(%id, keys = patch.len(), "update attributes");
        mutation::apply_update(self.node_mut(id)?, patch)
    }

    /// Replace the content of an attached text leaf
    pub fn commit_text_update(&mut self, id: NodeId, text: impl Into<String>) -> RenderResult<()> {
        trace!(%id, "update text");
        mutation::apply_text_update(self.node_mut(id)?, text)
    }

    /// Close the batch.
    ///
    /// Returns whether the tree differs from the snapshot taken when the batch
    /// began; listeners run, after the tree is unlocked, only in that case.
    pub fn end_commit(self) -> bool {
        let Commit {
            session,
            root,
            snapshot,
            _active,
        } = self;
        let changed = *root != snapshot;
        drop(root);
        drop(_active);

        if changed {
            debug!(nodes = snapshot.node_count(), "commit changed the tree");
            session.notify();
        } else {
            trace!("commit left the tree unchanged");
        }
        changed
    }

    fn node_mut(&mut self, id: NodeId) -> RenderResult<&mut Node> {
        self.root.find_mut(id).ok_or(RenderError::NodeNotFound(id))
    }

    fn parent_mut(&mut self, id: NodeId) -> RenderResult<&mut dyn ParentNode> {
        if self.root.id == id {
            let root: &mut dyn ParentNode = &mut *self.root;
            return Ok(root);
        }
        let node = self.node_mut(id)?;
        let kind = node.kind();
        node.as_parent_mut().ok_or(RenderError::NotAParent(kind))
    }
}
