//! Mutation protocol: node creation and attribute updates
//!
//! These are the operations a description-diffing engine issues to evolve a
//! tree. Everything that touches an attached tree (insertions, removals,
//! updates inside a batch) lives on [`Commit`](crate::session::Commit); the
//! free functions here work on detached nodes.
//!
//! # Example
//!
//! ```ignore
//! let mut attrs = Attrs::new();
//! attrs.set_attr(AttrKey::Color, Color::new(0xffaa00));
//! let mut embed = create_instance(NodeKind::Embed, &attrs)?;
//!
//! let mut next = attrs.clone();
//! next.remove_attr(AttrKey::Color);
//! if let Some(patch) = prepare_update(&attrs, &next) {
//!     apply_update(&mut embed, &patch)?;
//! }
//! ```

use tracing::trace;

use crate::attr::{AttrKey, AttrPatch, Attrs, AttrsExt};
use crate::error::{RenderError, RenderResult};
use crate::node::{
    Author, Description, Field, FieldName, FieldValue, Footer, Message, Node, NodeKind, Timestamp,
    Title,
};

// =============================================================================
// Creation
// =============================================================================

/// Create a detached node of `kind` from its description attributes.
///
/// Attributes are checked by type only. Text-bearing kinds and fields start
/// without children; the description layer appends their text and slots.
pub fn create_instance(kind: NodeKind, attrs: &Attrs) -> RenderResult<Node> {
    let required = |key: AttrKey| {
        attrs
            .get_attr(key)
            .cloned()
            .ok_or(RenderError::MissingAttribute { kind, key })
    };

    let mut node = match kind {
        NodeKind::Author => Node::Author(Box::new(Author::empty())),
        NodeKind::Description => Node::Description(Box::new(Description::empty())),
        NodeKind::Embed => Node::embed(None),
        NodeKind::Field => Node::Field(Box::new(Field::new(false))),
        NodeKind::FieldName => Node::FieldName(Box::new(FieldName::empty())),
        NodeKind::FieldValue => Node::FieldValue(Box::new(FieldValue::empty())),
        NodeKind::File => Node::file(required(AttrKey::File)?.into_file(AttrKey::File)?),
        NodeKind::Footer => Node::Footer(Box::new(Footer::empty())),
        NodeKind::Message => Node::Message(Box::new(Message::empty())),
        NodeKind::Image => Node::image(required(AttrKey::Url)?.into_text(AttrKey::Url)?),
        NodeKind::Reaction => Node::reaction(required(AttrKey::Emoji)?.into_emoji(AttrKey::Emoji)?),
        NodeKind::Thumbnail => Node::thumbnail(required(AttrKey::Url)?.into_text(AttrKey::Url)?),
        NodeKind::Timestamp => Node::Timestamp(Timestamp::now()),
        NodeKind::Title => Node::Title(Box::new(Title::empty())),
        NodeKind::Root | NodeKind::Text => return Err(RenderError::NotCreatable(kind)),
    };

    for (key, value) in attrs {
        node.set_attr(*key, Some(value.clone()))?;
    }

    trace!(%kind, id = %node.id(), attrs = attrs.len(), "created instance");
    Ok(node)
}

/// Create a detached text leaf
pub fn create_text_instance(text: impl Into<String>) -> Node {
    Node::text(text)
}

/// Append `child` to a detached parent while its subtree is being built
pub fn append_initial_child(parent: &mut Node, child: Node) -> RenderResult<()> {
    let kind = parent.kind();
    parent
        .as_parent_mut()
        .ok_or(RenderError::NotAParent(kind))?
        .append_child(child, None)
}

// =============================================================================
// Updates
// =============================================================================

/// Minimal attribute delta from `old` to `new`, or `None` when nothing changed.
///
/// Keys are taken in `old` order, then keys only present in `new`. A key
/// dropped from `new` maps to `None` (revert to default).
pub fn prepare_update(old: &Attrs, new: &Attrs) -> Option<AttrPatch> {
    let mut patch = AttrPatch::new();
    let keys = old.iter().chain(new.iter()).map(|(key, _)| *key);
    for key in keys {
        if patch.iter().any(|(seen, _)| *seen == key) {
            continue;
        }
        let next = new.get_attr(key);
        if old.get_attr(key) != next {
            patch.push((key, next.cloned()));
        }
    }
    (!patch.is_empty()).then_some(patch)
}

/// Merge `patch` onto the node's attributes.
///
/// Either every entry applies or none does.
pub fn apply_update(node: &mut Node, patch: &AttrPatch) -> RenderResult<()> {
    let mut staged = node.clone();
    for (key, value) in patch {
        staged.set_attr(*key, value.clone())?;
    }
    *node = staged;
    Ok(())
}

/// Replace a text leaf's content
pub fn apply_text_update(node: &mut Node, text: impl Into<String>) -> RenderResult<()> {
    match node {
        Node::Text(leaf) => {
            leaf.content = text.into();
            Ok(())
        }
        other => Err(RenderError::UnsupportedOperation {
            operation: "text update",
            kind: other.kind(),
        }),
    }
}
