//! Outbound payload shapes
//!
//! An embed subtree folds into one [`EmbedPayload`]; the whole root becomes a
//! [`Draft`], the message a synchronization layer sends or edits.

use chrono::{DateTime, Utc};

use crate::attr::{Color, Emoji, FileRef};
use crate::node::{Embed, Node, ParentNode, Root};
use crate::session::RenderConfig;

// =============================================================================
// EmbedPayload
// =============================================================================

/// Author line of an embed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EmbedAuthor {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub icon_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub url: Option<String>,
}

/// One `(name, value, inline)` field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Footer line of an embed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EmbedFooter {
    pub text: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub icon_url: Option<String>,
}

/// Flattened embed, ready for a platform client.
///
/// Nested embeds do not nest here: their content lands in the same payload.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EmbedPayload {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub color: Option<Color>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub author: Option<EmbedAuthor>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub fields: Vec<EmbedField>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub footer: Option<EmbedFooter>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub image: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub thumbnail: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub timestamp: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub url: Option<String>,
    /// Attachments travel beside the JSON body, not inside it
    #[cfg_attr(feature = "serde", serde(skip))]
    pub files: Vec<FileRef>,
}

impl EmbedPayload {
    /// Fold an embed subtree.
    ///
    /// Children are visited in order, later singular parts (title, footer ...)
    /// overwriting earlier ones. An embed applies its own color after its
    /// children, so an outer color overrides any nested one.
    pub fn from_embed(embed: &Embed) -> Self {
        let mut payload = Self::default();
        payload.fold_embed(embed);
        payload
    }

    fn fold_embed(&mut self, embed: &Embed) {
        for child in embed.children() {
            self.fold_child(child);
        }
        if embed.color.is_some() {
            self.color = embed.color;
        }
    }

    fn fold_child(&mut self, node: &Node) {
        match node {
            Node::Author(author) => {
                self.author = Some(EmbedAuthor {
                    name: author.text(),
                    icon_url: author.attrs.icon_url.clone(),
                    url: author.attrs.url.clone(),
                });
            }
            Node::Description(description) => self.description = Some(description.text()),
            Node::Embed(nested) => self.fold_embed(nested),
            Node::Field(field) => self.fields.push(EmbedField {
                name: field.name(),
                value: field.value(),
                inline: field.inline,
            }),
            Node::File(file) => self.files.push(file.file.clone()),
            Node::Footer(footer) => {
                self.footer = Some(EmbedFooter {
                    text: footer.text(),
                    icon_url: footer.attrs.icon_url.clone(),
                });
            }
            Node::Image(image) => self.image = Some(image.url.clone()),
            Node::Thumbnail(thumbnail) => self.thumbnail = Some(thumbnail.url.clone()),
            Node::Timestamp(timestamp) => self.timestamp = Some(timestamp.time),
            Node::Title(title) => {
                self.title = Some(title.text());
                self.url = title.attrs.url.clone().filter(|url| !url.is_empty());
            }
            other => unreachable!("'{}' is not a valid embed child", other.kind()),
        }
    }

    /// Whether the fold produced nothing at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Draft
// =============================================================================

/// Message as the synchronization layer sends it
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Draft {
    /// Message blocks joined by [`RenderConfig::content_separator`]
    pub content: String,
    pub embeds: Vec<EmbedPayload>,
    pub reactions: Vec<Emoji>,
}

impl Draft {
    /// Build a draft from the current state of `root`
    pub fn from_root(root: &Root, config: &RenderConfig) -> Self {
        let content = root.contents().join(&*config.content_separator);
        let embeds = if config.all_embeds {
            root.embed_payloads()
        } else {
            root.embeds().next().map(Embed::payload).into_iter().collect()
        };
        Self {
            content,
            embeds,
            reactions: root.reaction_list(),
        }
    }
}
