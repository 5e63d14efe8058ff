//! Leaf node types
//!
//! Leaves own no children: plain text, media links, files, reactions and
//! timestamps.

use chrono::{DateTime, Utc};

use crate::attr::{Emoji, FileRef};

use super::NodeId;

// =============================================================================
// Text
// =============================================================================

/// Plain text segment, the only child kind of text-bearing nodes
#[derive(Debug, Clone)]
pub struct Text {
    pub(crate) id: NodeId,
    /// Text content
    pub content: String,
}

impl Text {
    /// Create a new text node
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            content: content.into(),
        }
    }

    /// Check if text content is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get text length in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

// =============================================================================
// Media
// =============================================================================

/// Full-size embed image
#[derive(Debug, Clone)]
pub struct Image {
    pub(crate) id: NodeId,
    pub url: String,
}

impl Image {
    pub fn new(url: impl Into<String>) -> Self {
        Self { id: NodeId::next(), url: url.into() }
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

/// Small corner image of an embed
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub(crate) id: NodeId,
    pub url: String,
}

impl Thumbnail {
    pub fn new(url: impl Into<String>) -> Self {
        Self { id: NodeId::next(), url: url.into() }
    }
}

impl PartialEq for Thumbnail {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

/// File attached alongside an embed
#[derive(Debug, Clone)]
pub struct FileNode {
    pub(crate) id: NodeId,
    pub file: FileRef,
}

impl FileNode {
    pub fn new(file: FileRef) -> Self {
        Self { id: NodeId::next(), file }
    }
}

impl PartialEq for FileNode {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file
    }
}

// =============================================================================
// Reaction / Timestamp
// =============================================================================

/// Reaction the synchronization layer adds to the posted message
#[derive(Debug, Clone)]
pub struct Reaction {
    pub(crate) id: NodeId,
    pub emoji: Emoji,
}

impl Reaction {
    pub fn new(emoji: impl Into<Emoji>) -> Self {
        Self { id: NodeId::next(), emoji: emoji.into() }
    }
}

impl PartialEq for Reaction {
    fn eq(&self, other: &Self) -> bool {
        self.emoji == other.emoji
    }
}

/// Embed timestamp
#[derive(Debug, Clone)]
pub struct Timestamp {
    pub(crate) id: NodeId,
    pub time: DateTime<Utc>,
}

impl Timestamp {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { id: NodeId::next(), time }
    }

    /// Timestamp pinned to the current time
    pub fn now() -> Self {
        Self::new(Utc::now())
    }
}

/// Timestamps compare at millisecond precision, the precision platforms keep.
impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.time.timestamp_millis() == other.time.timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_node() {
        let text = Text::new("hello");
        assert!(!text.is_empty());
        assert_eq!(text.len(), 5);
        assert_eq!(text, Text::new("hello"));
        assert_ne!(text.id, Text::new("hello").id);
    }

    #[test]
    fn test_timestamp_millis_equality() {
        let base = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let sub_milli = base + chrono::Duration::microseconds(400);
        assert_eq!(Timestamp::new(base), Timestamp::new(sub_milli));
        assert_ne!(Timestamp::new(base), Timestamp::new(base + chrono::Duration::milliseconds(1)));
    }
}
