//! Node types for the render tree.
//!
//! The kind set is closed, so the tree is a sum type: [`Node`] has one variant
//! per kind that may appear below the [`Root`]. Parent variants are boxed and
//! implement [`ParentNode`]; leaves are stored inline.
//!
//! # Key Features
//!
//! - Child-kind gate on every insertion ([`ParentNode::is_valid_child`])
//! - Structural, attribute-aware equality (`PartialEq`), ids ignored
//! - Deep `Clone` with no shared child storage, used for commit snapshots

mod embed;
mod leaf;
mod parent;
mod root;
mod text_block;

pub use embed::{Embed, Field};
pub use leaf::{FileNode, Image, Reaction, Text, Thumbnail, Timestamp};
pub use parent::{Internal, ParentNode};
pub use root::{Descendants, Root};
pub use text_block::{
    Author, AuthorAttrs, BlockAttrs, Description, DescriptionAttrs, FieldName, FieldNameAttrs,
    FieldValue, FieldValueAttrs, Footer, FooterAttrs, Message, MessageAttrs, TextBlock, Title,
    TitleAttrs,
};

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use smallvec::SmallVec;

use crate::attr::{AttrKey, AttrValue, Color, Emoji, FileRef};
use crate::error::{RenderError, RenderResult};

/// Type alias for children collection.
pub type Children = SmallVec<[Node; 4]>;

// =============================================================================
// NodeId
// =============================================================================

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity.
///
/// Assigned once at construction and kept by clones, so a snapshot and the
/// live tree agree on identities. Equality of nodes never looks at ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 representation
    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// NodeKind
// =============================================================================

/// Kind tag of a node, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Author,
    Description,
    Embed,
    Field,
    FieldName,
    FieldValue,
    File,
    Footer,
    Message,
    Image,
    Reaction,
    Root,
    Text,
    Thumbnail,
    Timestamp,
    Title,
}

impl NodeKind {
    /// Returns all NodeKind variants
    pub const fn all() -> &'static [NodeKind] {
        &[
            Self::Author,
            Self::Description,
            Self::Embed,
            Self::Field,
            Self::FieldName,
            Self::FieldValue,
            Self::File,
            Self::Footer,
            Self::Message,
            Self::Image,
            Self::Reaction,
            Self::Root,
            Self::Text,
            Self::Thumbnail,
            Self::Timestamp,
            Self::Title,
        ]
    }

    /// Tag name as used by descriptions
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Description => "description",
            Self::Embed => "embed",
            Self::Field => "field",
            Self::FieldName => "field-name",
            Self::FieldValue => "field-value",
            Self::File => "file",
            Self::Footer => "footer",
            Self::Message => "message",
            Self::Image => "image",
            Self::Reaction => "reaction",
            Self::Root => "root",
            Self::Text => "text",
            Self::Thumbnail => "thumbnail",
            Self::Timestamp => "timestamp",
            Self::Title => "title",
        }
    }

    /// Parents restricted to text leaves
    pub const fn is_text_bearing(&self) -> bool {
        matches!(
            self,
            Self::Author
                | Self::Description
                | Self::FieldName
                | Self::FieldValue
                | Self::Footer
                | Self::Message
                | Self::Title
        )
    }

    /// Kinds that own children
    pub const fn is_parent(&self) -> bool {
        self.is_text_bearing() || matches!(self, Self::Embed | Self::Field | Self::Root)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| RenderError::UnknownKind(s.to_string()))
    }
}

// =============================================================================
// Node
// =============================================================================

/// Node in a render tree.
///
/// Root is not a variant: it is never a child, and the session holds it
/// directly.
#[derive(Debug, Clone)]
pub enum Node {
    Author(Box<Author>),
    Description(Box<Description>),
    Embed(Box<Embed>),
    Field(Box<Field>),
    FieldName(Box<FieldName>),
    FieldValue(Box<FieldValue>),
    File(FileNode),
    Footer(Box<Footer>),
    Message(Box<Message>),
    Image(Image),
    Reaction(Reaction),
    Text(Text),
    Thumbnail(Thumbnail),
    Timestamp(Timestamp),
    Title(Box<Title>),
}

impl Node {
    // Generates for each variant (field_name -> FieldName, etc.):
    //   - is_xxx(&self) -> bool
    //   - as_xxx(&self) -> Option<&Type>
    //   - as_xxx_mut(&mut self) -> Option<&mut Type>
    impl_node_accessors!(
        Author => Author,
        Description => Description,
        Embed => Embed,
        Field => Field,
        FieldName => FieldName,
        FieldValue => FieldValue,
        File => FileNode,
        Footer => Footer,
        Message => Message,
        Image => Image,
        Reaction => Reaction,
        Text => Text,
        Thumbnail => Thumbnail,
        Timestamp => Timestamp,
        Title => Title,
    );

    /// Kind tag
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Author(_) => NodeKind::Author,
            Self::Description(_) => NodeKind::Description,
            Self::Embed(_) => NodeKind::Embed,
            Self::Field(_) => NodeKind::Field,
            Self::FieldName(_) => NodeKind::FieldName,
            Self::FieldValue(_) => NodeKind::FieldValue,
            Self::File(_) => NodeKind::File,
            Self::Footer(_) => NodeKind::Footer,
            Self::Message(_) => NodeKind::Message,
            Self::Image(_) => NodeKind::Image,
            Self::Reaction(_) => NodeKind::Reaction,
            Self::Text(_) => NodeKind::Text,
            Self::Thumbnail(_) => NodeKind::Thumbnail,
            Self::Timestamp(_) => NodeKind::Timestamp,
            Self::Title(_) => NodeKind::Title,
        }
    }

    /// Identity
    pub fn id(&self) -> NodeId {
        match self {
            Self::File(n) => n.id,
            Self::Image(n) => n.id,
            Self::Reaction(n) => n.id,
            Self::Text(n) => n.id,
            Self::Thumbnail(n) => n.id,
            Self::Timestamp(n) => n.id,
            Self::Author(b) => b.id,
            Self::Description(b) => b.id,
            Self::FieldName(b) => b.id,
            Self::FieldValue(b) => b.id,
            Self::Message(b) => b.id,
            Self::Embed(e) => e.id,
            Self::Field(f) => f.id,
            Self::Footer(b) => b.id,
            Self::Title(b) => b.id,
        }
    }

    /// Parent view of this node, `None` for leaves
    pub fn as_parent(&self) -> Option<&dyn ParentNode> {
        match_parent!(self, p => Some(&**p as &dyn ParentNode), None)
    }

    /// Mutable parent view of this node, `None` for leaves
    pub fn as_parent_mut(&mut self) -> Option<&mut dyn ParentNode> {
        match_parent!(self, p => Some(&mut **p as &mut dyn ParentNode), None)
    }

    /// Direct children, empty for leaves
    pub fn children(&self) -> &[Node] {
        match self.as_parent() {
            Some(p) => p.children().as_slice(),
            None => &[],
        }
    }

    /// Concatenated text of a text-bearing node or a text leaf
    pub fn inner_text(&self) -> Option<String> {
        match self {
            Self::Text(t) => Some(t.content.clone()),
            Self::Author(b) => Some(b.text()),
            Self::Description(b) => Some(b.text()),
            Self::FieldName(b) => Some(b.text()),
            Self::FieldValue(b) => Some(b.text()),
            Self::Footer(b) => Some(b.text()),
            Self::Message(b) => Some(b.text()),
            Self::Title(b) => Some(b.text()),
            _ => None,
        }
    }

    /// Find this node or a descendant by id (depth-first)
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// Find this node or a descendant by id (mutable).
    ///
    /// Crate-only: a `&mut Node` can be overwritten with a node of any kind.
    pub(crate) fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id() == id {
            return Some(self);
        }
        let parent = self.as_parent_mut()?;
        parent.children_mut(Internal::TOKEN).iter_mut().find_map(|c| c.find_mut(id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attributes
    // ─────────────────────────────────────────────────────────────────────────

    /// Assign one attribute in place; `None` reverts it to the kind's default.
    ///
    /// Attributes are checked by type only. Required attributes (image and
    /// thumbnail `url`, file `file`, reaction `emoji`) cannot be unset.
    pub fn set_attr(&mut self, key: AttrKey, value: Option<AttrValue>) -> RenderResult<()> {
        let kind = self.kind();
        let required = |value: Option<AttrValue>| {
            value.ok_or(RenderError::MissingAttribute { kind, key })
        };
        match (self, key) {
            (Self::Author(b), AttrKey::IconUrl) => b.attrs.icon_url = text_attr(key, value)?,
            (Self::Author(b), AttrKey::Url) => b.attrs.url = text_attr(key, value)?,
            (Self::Footer(b), AttrKey::IconUrl) => b.attrs.icon_url = text_attr(key, value)?,
            (Self::Title(b), AttrKey::Url) => b.attrs.url = text_attr(key, value)?,
            (Self::Embed(e), AttrKey::Color) => {
                e.color = value.map(|v| v.into_color(key)).transpose()?;
            }
            (Self::Field(f), AttrKey::Inline) => {
                f.inline = value.map(|v| v.into_bool(key)).transpose()?.unwrap_or(false);
            }
            (Self::File(f), AttrKey::File) => f.file = required(value)?.into_file(key)?,
            (Self::Image(i), AttrKey::Url) => i.url = required(value)?.into_text(key)?,
            (Self::Thumbnail(t), AttrKey::Url) => t.url = required(value)?.into_text(key)?,
            (Self::Reaction(r), AttrKey::Emoji) => r.emoji = required(value)?.into_emoji(key)?,
            (Self::Timestamp(t), AttrKey::Time) => {
                t.time = match value {
                    Some(v) => v.into_time(key)?,
                    None => Utc::now(),
                };
            }
            _ => return Err(RenderError::UnknownAttribute { kind, key }),
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Plain text leaf
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(Text::new(content))
    }

    /// Message block holding `text`
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(Box::new(Message::with_text(text)))
    }

    /// Embed description holding `text`
    pub fn description(text: impl Into<String>) -> Self {
        Self::Description(Box::new(Description::with_text(text)))
    }

    /// Embed title holding `text`
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title(Box::new(Title::with_text(text)))
    }

    /// Embed author line holding `text`
    pub fn author(text: impl Into<String>) -> Self {
        Self::Author(Box::new(Author::with_text(text)))
    }

    /// Embed footer holding `text`
    pub fn footer(text: impl Into<String>) -> Self {
        Self::Footer(Box::new(Footer::with_text(text)))
    }

    /// Field name slot holding `text`
    pub fn field_name(text: impl Into<String>) -> Self {
        Self::FieldName(Box::new(FieldName::with_text(text)))
    }

    /// Field value slot holding `text`
    pub fn field_value(text: impl Into<String>) -> Self {
        Self::FieldValue(Box::new(FieldValue::with_text(text)))
    }

    /// Field with both slots filled
    pub fn field(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self::Field(Box::new(Field::with_slots(name, value, inline)))
    }

    /// Empty embed
    pub fn embed(color: Option<Color>) -> Self {
        Self::Embed(Box::new(Embed::new(color)))
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image(Image::new(url))
    }

    pub fn thumbnail(url: impl Into<String>) -> Self {
        Self::Thumbnail(Thumbnail::new(url))
    }

    pub fn file(file: FileRef) -> Self {
        Self::File(FileNode::new(file))
    }

    pub fn reaction(emoji: impl Into<Emoji>) -> Self {
        Self::Reaction(Reaction::new(emoji))
    }

    pub fn timestamp(time: DateTime<Utc>) -> Self {
        Self::Timestamp(Timestamp::new(time))
    }

    /// Append `child` and return self, for building subtrees
    pub fn with_child(mut self, child: Node) -> RenderResult<Self> {
        let kind = self.kind();
        self.as_parent_mut()
            .ok_or(RenderError::NotAParent(kind))?
            .append_child(child, None)?;
        Ok(self)
    }
}

fn text_attr(key: AttrKey, value: Option<AttrValue>) -> RenderResult<Option<String>> {
    value.map(|v| v.into_text(key)).transpose()
}

/// Structural, attribute-aware equality.
///
/// Same variant, same attributes, children pairwise equal; text-bearing
/// nodes compare by concatenated text.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Author(a), Self::Author(b)) => a == b,
            (Self::Description(a), Self::Description(b)) => a == b,
            (Self::Embed(a), Self::Embed(b)) => a == b,
            (Self::Field(a), Self::Field(b)) => a == b,
            (Self::FieldName(a), Self::FieldName(b)) => a == b,
            (Self::FieldValue(a), Self::FieldValue(b)) => a == b,
            (Self::File(a), Self::File(b)) => a == b,
            (Self::Footer(a), Self::Footer(b)) => a == b,
            (Self::Message(a), Self::Message(b)) => a == b,
            (Self::Image(a), Self::Image(b)) => a == b,
            (Self::Reaction(a), Self::Reaction(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Thumbnail(a), Self::Thumbnail(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Title(a), Self::Title(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_embed() -> Node {
        Node::embed(Some(Color::new(0x5865f2)))
            .with_child(Node::title("Weather"))
            .and_then(|e| e.with_child(Node::field("Temp", "21°C", true)))
            .and_then(|e| e.with_child(Node::image("https://x.example/sun.png")))
            .unwrap()
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in NodeKind::all() {
            assert_eq!(kind.name().parse::<NodeKind>().unwrap(), *kind);
        }
        let err = "button".parse::<NodeKind>().unwrap_err();
        assert!(matches!(err, RenderError::UnknownKind(tag) if tag == "button"));
    }

    #[test]
    fn test_kind_classification() {
        assert!(NodeKind::FieldName.is_text_bearing());
        assert!(!NodeKind::Field.is_text_bearing());
        assert!(NodeKind::Field.is_parent());
        assert!(NodeKind::Root.is_parent());
        for leaf in [NodeKind::Image, NodeKind::File, NodeKind::Thumbnail, NodeKind::Timestamp, NodeKind::Reaction, NodeKind::Text] {
            assert!(!leaf.is_parent(), "{leaf}");
        }
    }

    #[test]
    fn test_node_accessors() {
        let node = Node::message("hi");
        assert!(node.is_message());
        assert!(!node.is_embed());
        assert_eq!(node.as_message().map(Message::text).as_deref(), Some("hi"));
        assert!(node.as_parent().is_some());
        assert!(Node::reaction("👍").as_parent().is_none());
        assert!(Node::reaction("👍").children().is_empty());
    }

    #[test]
    fn test_clone_is_equal_and_independent() {
        let original = sample_embed();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        assert_eq!(copy.id(), original.id());

        let title_id = copy.children()[0].id();
        copy.find_mut(title_id)
            .unwrap()
            .as_title_mut()
            .unwrap()
            .set_text("Changed");
        assert_ne!(copy, original);
        assert_eq!(original.children()[0].inner_text().as_deref(), Some("Weather"));

        copy.as_parent_mut().unwrap().remove_all_children();
        assert_eq!(original.children().len(), 3);
    }

    #[test]
    fn test_equality_across_kinds() {
        // same text, different kind
        assert_ne!(Node::message("x"), Node::description("x"));
        assert_ne!(Node::image("u"), Node::thumbnail("u"));
        assert_eq!(Node::image("u"), Node::image("u"));
    }

    #[test]
    fn test_set_attr() {
        let mut embed = Node::embed(None);
        embed.set_attr(AttrKey::Color, Some(Color::new(1).into())).unwrap();
        assert_eq!(embed.as_embed().unwrap().color, Some(Color::new(1)));
        embed.set_attr(AttrKey::Color, None).unwrap();
        assert_eq!(embed.as_embed().unwrap().color, None);

        let err = embed.set_attr(AttrKey::Inline, Some(true.into())).unwrap_err();
        assert!(matches!(err, RenderError::UnknownAttribute { kind: NodeKind::Embed, key: AttrKey::Inline }));

        let mut image = Node::image("a");
        let err = image.set_attr(AttrKey::Url, None).unwrap_err();
        assert!(matches!(err, RenderError::MissingAttribute { kind: NodeKind::Image, key: AttrKey::Url }));
        let err = image.set_attr(AttrKey::Url, Some(false.into())).unwrap_err();
        assert!(matches!(err, RenderError::AttributeType { key: AttrKey::Url, .. }));
        assert_eq!(image.as_image().unwrap().url, "a");
    }

    #[test]
    fn test_find_mut_reaches_nested_text() {
        let mut embed = sample_embed();
        let text_id = embed.children()[0].children()[0].id();
        embed.find_mut(text_id).unwrap().as_text_mut().unwrap().content = "Storm".into();
        assert_eq!(embed.children()[0].inner_text().as_deref(), Some("Storm"));
    }

    #[test]
    fn test_with_child_builds_nested_subtree() {
        let field = Node::field("HP", "10", false);
        let embed = Node::embed(None)
            .with_child(Node::embed(None).with_child(field).unwrap())
            .unwrap();
        assert_eq!(embed.children()[0].children()[0].kind(), NodeKind::Field);

        let err = Node::embed(None).with_child(Node::message("x")).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidChild { child: NodeKind::Message, parent: NodeKind::Embed }
        ));
    }

    #[test]
    fn test_public_insertion_paths_reject_invalid_children() {
        let mut embed = Node::embed(None).with_child(Node::title("T")).unwrap();
        let title_id = embed.children()[0].id();
        let parent = embed.as_parent_mut().unwrap();
        assert!(parent.append_child(Node::message("x"), None).is_err());
        assert!(parent.prepend_child(Node::reaction("👍"), Some(title_id)).is_err());
        assert!(parent.append_child(Node::text("loose"), Some(title_id)).is_err());
        assert_eq!(embed.children().len(), 1);

        // the fold still sees a well-formed embed
        let payload = embed.as_embed().unwrap().payload();
        assert_eq!(payload.title.as_deref(), Some("T"));
    }

    #[test]
    fn test_variant_and_block_agree_on_kind() {
        let nodes = [
            Node::author("a"),
            Node::description("d"),
            Node::field_name("n"),
            Node::field_value("v"),
            Node::footer("f"),
            Node::message("m"),
            Node::title("t"),
        ];
        for node in &nodes {
            assert_eq!(node.as_parent().map(|p| p.kind()), Some(node.kind()));
        }
    }

    #[test]
    fn test_with_child_on_leaf_fails() {
        let err = Node::image("a").with_child(Node::text("x")).unwrap_err();
        assert!(matches!(err, RenderError::NotAParent(NodeKind::Image)));
    }
}
