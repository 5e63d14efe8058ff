//! Text-bearing parent nodes
//!
//! Author, description, field name/value, footer, message and title all share
//! one shape: a run of plain-text leaves plus a few kind-specific attributes.
//! `TextBlock<A>` is that shape. Every kind has its own attribute type, so the
//! kind follows from `A` and a block only fits the `Node` variant of its kind.

use std::fmt;

use super::{Children, Internal, Node, NodeId, NodeKind, ParentNode, Text};

// =============================================================================
// Attribute sets
// =============================================================================

/// Attribute set of one text-bearing kind
pub trait BlockAttrs: fmt::Debug + Clone + Default + PartialEq {
    /// The kind every block carrying these attributes has
    const KIND: NodeKind;
}

/// Author line attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorAttrs {
    pub icon_url: Option<String>,
    pub url: Option<String>,
}

/// Footer attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterAttrs {
    pub icon_url: Option<String>,
}

/// Title attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleAttrs {
    pub url: Option<String>,
}

impl BlockAttrs for AuthorAttrs {
    const KIND: NodeKind = NodeKind::Author;
}

impl BlockAttrs for FooterAttrs {
    const KIND: NodeKind = NodeKind::Footer;
}

impl BlockAttrs for TitleAttrs {
    const KIND: NodeKind = NodeKind::Title;
}

/// Attribute-less kinds: a unit marker each
macro_rules! plain_attrs {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("Marker for `", stringify!($kind), "` blocks, which carry no attributes")]
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl BlockAttrs for $name {
                const KIND: NodeKind = NodeKind::$kind;
            }
        )*
    };
}

plain_attrs!(
    DescriptionAttrs => Description,
    FieldNameAttrs => FieldName,
    FieldValueAttrs => FieldValue,
    MessageAttrs => Message,
);

pub type Author = TextBlock<AuthorAttrs>;
pub type Description = TextBlock<DescriptionAttrs>;
pub type FieldName = TextBlock<FieldNameAttrs>;
pub type FieldValue = TextBlock<FieldValueAttrs>;
pub type Footer = TextBlock<FooterAttrs>;
pub type Message = TextBlock<MessageAttrs>;
pub type Title = TextBlock<TitleAttrs>;

// =============================================================================
// TextBlock<A>
// =============================================================================

/// Parent restricted to text leaves
#[derive(Debug, Clone)]
pub struct TextBlock<A> {
    pub(crate) id: NodeId,
    /// Kind-specific attributes
    pub attrs: A,
    children: Children,
}

impl<A: BlockAttrs> TextBlock<A> {
    /// Empty block
    pub fn empty() -> Self {
        Self::with_attrs(A::default())
    }

    /// Block holding one text leaf
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut block = Self::empty();
        block.set_text(text);
        block
    }

    pub fn with_attrs(attrs: A) -> Self {
        Self {
            id: NodeId::next(),
            attrs,
            children: Children::new(),
        }
    }

    /// Concatenated content of every text leaf, in order
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            if let Node::Text(t) = child {
                text.push_str(&t.content);
            }
        }
        text
    }

    /// Replace every child with a single text leaf
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(Node::Text(Text::new(text)));
    }
}

/// Equality is by concatenated text: segmentation into leaves is irrelevant.
impl<A: BlockAttrs> PartialEq for TextBlock<A> {
    fn eq(&self, other: &Self) -> bool {
        self.attrs == other.attrs && self.text() == other.text()
    }
}

impl<A: BlockAttrs> ParentNode for TextBlock<A> {
    fn kind(&self) -> NodeKind {
        A::KIND
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
        child == NodeKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(parts: &[&str]) -> Message {
        let mut block = Message::empty();
        for part in parts {
            block.append_child(Node::text(*part), None).unwrap();
        }
        block
    }

    #[test]
    fn test_text_concatenation() {
        let block = message(&["a", "b", "c"]);
        assert_eq!(block.children().len(), 3);
        assert_eq!(block.text(), "abc");
    }

    #[test]
    fn test_set_text_collapses_children() {
        let mut block = message(&["a", "b", "c"]);
        block.set_text("x");
        assert_eq!(block.children().len(), 1);
        assert_eq!(block.children()[0], Node::text("x"));
        assert_eq!(block.text(), "x");
    }

    #[test]
    fn test_equality_ignores_segmentation() {
        assert_eq!(message(&["ab"]), message(&["a", "b"]));
        assert_ne!(message(&["ab"]), message(&["a", "c"]));
    }

    #[test]
    fn test_equality_respects_attrs() {
        let mut a = Title::with_text("Docs");
        let b = a.clone();
        assert_eq!(a, b);
        a.attrs.url = Some("https://docs.example".into());
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_non_text_child() {
        let mut block = message(&["a"]);
        let err = block.append_child(Node::reaction("👍"), None).unwrap_err();
        assert_eq!(err.to_string(), "'reaction' is not a valid message child");
        assert_eq!(block.text(), "a");
    }

    #[test]
    fn test_kind_follows_attrs() {
        assert_eq!(Message::empty().kind(), NodeKind::Message);
        assert_eq!(Description::with_text("x").kind(), NodeKind::Description);
        assert_eq!(FieldName::empty().kind(), NodeKind::FieldName);
        assert_eq!(FieldValue::empty().kind(), NodeKind::FieldValue);
        for kind in NodeKind::all().iter().filter(|k| k.is_text_bearing()) {
            let node = crate::mutation::create_instance(*kind, &Default::default()).unwrap();
            assert_eq!(node.as_parent().map(|p| p.kind()), Some(*kind));
        }
    }

    #[test]
    fn test_error_names_block_kind() {
        let mut block = Description::with_text("x");
        let err = block.append_child(Node::image("u"), None).unwrap_err();
        assert_eq!(err.to_string(), "'image' is not a valid description child");
    }
}
