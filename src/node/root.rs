//! Root node and tree-wide queries
//!
//! The root is the single entry point external code holds. Its children are
//! the top-level output parts: message blocks, embeds and reactions.

use crate::attr::Emoji;
use crate::payload::EmbedPayload;

use super::{Children, Embed, Internal, Message, Node, NodeId, NodeKind, ParentNode, Reaction};

// =============================================================================
// Root
// =============================================================================

/// Top-level parent bound to one render session
#[derive(Debug, Clone)]
pub struct Root {
    pub(crate) id: NodeId,
    children: Children,
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl Root {
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            children: Children::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Filtered views (order-preserving)
    // ─────────────────────────────────────────────────────────────────────────

    /// Embed children
    pub fn embeds(&self) -> impl Iterator<Item = &Embed> {
        self.children.iter().filter_map(Node::as_embed)
    }

    /// Message children
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.children.iter().filter_map(Node::as_message)
    }

    /// Reaction children
    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.children.iter().filter_map(Node::as_reaction)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived views
    // ─────────────────────────────────────────────────────────────────────────

    /// Text of every message block
    pub fn contents(&self) -> Vec<String> {
        self.messages().map(Message::text).collect()
    }

    /// One folded payload per embed child
    pub fn embed_payloads(&self) -> Vec<EmbedPayload> {
        self.embeds().map(Embed::payload).collect()
    }

    /// Emoji of every reaction child
    pub fn reaction_list(&self) -> Vec<Emoji> {
        self.reactions().map(|r| r.emoji.clone()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query API
    // ─────────────────────────────────────────────────────────────────────────

    /// Find a descendant by id (depth-first)
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Find a descendant by id (mutable)
    pub(crate) fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Iterate over all descendants (depth-first, pre-order)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(&self.children)
    }

    /// Count of all descendants
    pub fn node_count(&self) -> usize {
        self.descendants().count()
    }
}

impl PartialEq for Root {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl ParentNode for Root {
    fn kind(&self) -> NodeKind {
        NodeKind::Root
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> &Children {
        &self.children
    }

    fn children_mut(&mut self, _: Internal) -> &mut Children {
        &mut self.children
    }

    fn accepts(&self, child: NodeKind) -> bool {
        matches!(child, NodeKind::Embed | NodeKind::Message | NodeKind::Reaction)
    }
}

// =============================================================================
// Descendants - depth-first node traversal
// =============================================================================

/// Depth-first iterator over nodes below a root
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Descendants<'a> {
    fn new(children: &'a Children) -> Self {
        Self {
            stack: children.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so they're visited left-to-right
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
