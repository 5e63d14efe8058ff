//! Embed panel and field nodes

use crate::attr::Color;
use crate::error::{RenderError, RenderResult};
use crate::payload::EmbedPayload;

use super::{Children, FieldName, FieldValue, Internal, Node, NodeId, NodeKind, ParentNode};

// =============================================================================
// Embed
// =============================================================================

/// Rich embed panel.
///
/// Nested embeds are allowed so content can be pooled from several
/// description components; they are flattened into one payload.
#[derive(Debug, Clone)]
pub struct Embed {
    pub(crate) id: NodeId,
    /// Sidebar color
    pub color: Option<Color>,
    children: Children,
}

impl Embed {
    /// Kinds an embed may contain
    pub const CHILD_KINDS: &'static [NodeKind] = &[
        NodeKind::Author,
        NodeKind::Description,
        NodeKind::Embed,
        NodeKind::Field,
        NodeKind::File,
        NodeKind::Footer,
        NodeKind::Image,
        NodeKind::Thumbnail,
        NodeKind::Timestamp,
        NodeKind::Title,
    ];

    pub fn new(color: Option<Color>) -> Self {
        Self {
            id: NodeId::next(),
            color,
            children: Children::new(),
        }
    }

    /// Fold this embed and its descendants into one payload
    pub fn payload(&self) -> EmbedPayload {
        EmbedPayload::from_embed(self)
    }
}

impl PartialEq for Embed {
    fn eq(&self, other: &Self) -> bool {
        self.color == other.color && self.children == other.children
    }
}

impl ParentNode for Embed {
    fn kind(&self) -> NodeKind {
        NodeKind::Embed
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
        Self::CHILD_KINDS.contains(&child)
    }
}

// =============================================================================
// Field
// =============================================================================

/// Two-slot embed field: slot 0 holds the name, slot 1 the value.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) id: NodeId,
    /// Render side by side with neighbouring inline fields
    pub inline: bool,
    children: Children,
}

impl Field {
    pub fn new(inline: bool) -> Self {
        Self {
            id: NodeId::next(),
            inline,
            children: Children::new(),
        }
    }

    /// Field with both slots filled
    pub fn with_slots(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let mut field = Self::new(inline);
        field
            .children
            .push(Node::FieldName(Box::new(FieldName::with_text(name))));
        field
            .children
            .push(Node::FieldValue(Box::new(FieldValue::with_text(value))));
        field
    }

    fn name_node(&self) -> Option<&FieldName> {
        self.children.first().and_then(Node::as_field_name)
    }

    fn value_node(&self) -> Option<&FieldValue> {
        self.children.get(1).and_then(Node::as_field_value)
    }

    /// Text of the name slot, empty when the slot is absent
    pub fn name(&self) -> String {
        self.name_node().map(FieldName::text).unwrap_or_default()
    }

    /// Text of the value slot, empty when the slot is absent
    pub fn value(&self) -> String {
        self.value_node().map(FieldValue::text).unwrap_or_default()
    }

    /// Replace the name slot's text; fails if the slot does not exist yet
    pub fn set_name(&mut self, name: impl Into<String>) -> RenderResult<()> {
        match self.children.first_mut().and_then(Node::as_field_name_mut) {
            Some(slot) => {
                slot.set_text(name);
                Ok(())
            }
            None => Err(RenderError::MissingSlot(NodeKind::FieldName)),
        }
    }

    /// Replace the value slot's text; fails if the slot does not exist yet
    pub fn set_value(&mut self, value: impl Into<String>) -> RenderResult<()> {
        match self.children.get_mut(1).and_then(Node::as_field_value_mut) {
            Some(slot) => {
                slot.set_text(value);
                Ok(())
            }
            None => Err(RenderError::MissingSlot(NodeKind::FieldValue)),
        }
    }
}

/// Fields compare by projected name and value, not by slot structure.
impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.inline == other.inline && self.name() == other.name() && self.value() == other.value()
    }
}

impl ParentNode for Field {
    fn kind(&self) -> NodeKind {
        NodeKind::Field
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
        matches!(child, NodeKind::FieldName | NodeKind::FieldValue)
    }
}
