//! Attribute system for render nodes
//!
//! Descriptions carry attributes as a flat ordered list of `(AttrKey, AttrValue)`
//! pairs. Nodes store them as typed fields; conversion happens once, in
//! [`Node::set_attr`](crate::node::Node::set_attr).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use compact_str::CompactString;

use crate::error::{RenderError, RenderResult};

// =============================================================================
// AttrKey
// =============================================================================

/// Attribute name, spelled like the description layer spells its props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKey {
    IconUrl,
    Url,
    Color,
    Inline,
    File,
    Emoji,
    Time,
}

impl AttrKey {
    /// Returns all AttrKey variants
    pub const fn all() -> &'static [AttrKey] {
        &[
            Self::IconUrl,
            Self::Url,
            Self::Color,
            Self::Inline,
            Self::File,
            Self::Emoji,
            Self::Time,
        ]
    }

    /// Prop name as written in descriptions
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IconUrl => "iconURL",
            Self::Url => "url",
            Self::Color => "color",
            Self::Inline => "inline",
            Self::File => "file",
            Self::Emoji => "emoji",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttrKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all().iter().copied().find(|k| k.name() == s).ok_or(())
    }
}

// =============================================================================
// Value types
// =============================================================================

/// 24-bit RGB embed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Color(u32);

impl Color {
    /// Create a color from its packed `0xRRGGBB` value (upper byte ignored).
    pub const fn new(value: u32) -> Self {
        Self(value & 0x00ff_ffff)
    }

    /// Create a color from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self)
    }

    /// Packed `0xRRGGBB` value
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Reaction emoji identifier: a unicode emoji or a custom `name:id` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Emoji(CompactString);

impl Emoji {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(CompactString::new(id))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Emoji {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// In-memory attachment.
///
/// Two attachments are the same attachment only if they share the same
/// buffer; equal bytes in distinct buffers compare unequal.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: CompactString,
    pub data: Arc<[u8]>,
}

impl Attachment {
    pub fn new(name: impl AsRef<str>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: CompactString::new(name),
            data: data.into(),
        }
    }
}

impl PartialEq for Attachment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.data, &other.data)
    }
}

/// Reference to a file attached to an embed.
#[derive(Debug, Clone, PartialEq)]
pub enum FileRef {
    /// Remote file fetched by the platform
    Url(String),
    /// Local file read by the sending layer
    Path(PathBuf),
    /// Bytes held in memory
    Attachment(Attachment),
}

impl FileRef {
    /// File name as the platform would display it
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Url(url) => url.rsplit('/').next().filter(|s| !s.is_empty()),
            Self::Path(path) => path.file_name().and_then(|n| n.to_str()),
            Self::Attachment(a) => Some(&a.name),
        }
    }
}

// =============================================================================
// AttrValue
// =============================================================================

/// Attribute value.
///
/// Equality is value equality for scalars and identity for attachment
/// buffers, which is what change detection needs.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Bool(bool),
    Color(Color),
    File(FileRef),
    Emoji(Emoji),
    Time(DateTime<Utc>),
}

impl AttrValue {
    /// Type name used in error messages
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Color(_) => "color",
            Self::File(_) => "file",
            Self::Emoji(_) => "emoji",
            Self::Time(_) => "time",
        }
    }

    /// Emoji attribute value from an identifier
    pub fn emoji(id: impl AsRef<str>) -> Self {
        Self::Emoji(Emoji::new(id))
    }

    fn mismatch(&self, key: AttrKey, expected: &'static str) -> RenderError {
        RenderError::AttributeType {
            key,
            expected,
            found: self.type_name(),
        }
    }

    pub(crate) fn into_text(self, key: AttrKey) -> RenderResult<String> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(other.mismatch(key, "text")),
        }
    }

    pub(crate) fn into_bool(self, key: AttrKey) -> RenderResult<bool> {
        match self {
            Self::Bool(b) => Ok(b),
            other => Err(other.mismatch(key, "bool")),
        }
    }

    pub(crate) fn into_color(self, key: AttrKey) -> RenderResult<Color> {
        match self {
            Self::Color(c) => Ok(c),
            Self::Text(ref s) => Color::from_hex(s).ok_or_else(|| self.mismatch(key, "color")),
            other => Err(other.mismatch(key, "color")),
        }
    }

    pub(crate) fn into_file(self, key: AttrKey) -> RenderResult<FileRef> {
        match self {
            Self::File(f) => Ok(f),
            Self::Text(url) => Ok(FileRef::Url(url)),
            other => Err(other.mismatch(key, "file")),
        }
    }

    pub(crate) fn into_emoji(self, key: AttrKey) -> RenderResult<Emoji> {
        match self {
            Self::Emoji(e) => Ok(e),
            Self::Text(s) => Ok(Emoji::new(s)),
            other => Err(other.mismatch(key, "emoji")),
        }
    }

    pub(crate) fn into_time(self, key: AttrKey) -> RenderResult<DateTime<Utc>> {
        match self {
            Self::Time(t) => Ok(t),
            other => Err(other.mismatch(key, "time")),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Color> for AttrValue {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<FileRef> for AttrValue {
    fn from(f: FileRef) -> Self {
        Self::File(f)
    }
}

impl From<Emoji> for AttrValue {
    fn from(e: Emoji) -> Self {
        Self::Emoji(e)
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Time(t)
    }
}

// =============================================================================
// Attrs / AttrPatch
// =============================================================================

/// Node attributes as description-order key-value pairs
pub type Attrs = Vec<(AttrKey, AttrValue)>;

/// Attribute delta: `(key, Some(value))` sets, `(key, None)` unsets
pub type AttrPatch = Vec<(AttrKey, Option<AttrValue>)>;

/// Extension trait for attribute operations on Attrs
pub trait AttrsExt {
    /// Get an attribute value by key
    fn get_attr(&self, key: AttrKey) -> Option<&AttrValue>;

    /// Check if an attribute exists
    fn has_attr(&self, key: AttrKey) -> bool;

    /// Set an attribute value (insert or update)
    fn set_attr(&mut self, key: AttrKey, value: impl Into<AttrValue>);

    /// Remove an attribute by key, returning the old value if present
    fn remove_attr(&mut self, key: AttrKey) -> Option<AttrValue>;
}

impl AttrsExt for Attrs {
    fn get_attr(&self, key: AttrKey) -> Option<&AttrValue> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    fn has_attr(&self, key: AttrKey) -> bool {
        self.iter().any(|(k, _)| *k == key)
    }

    fn set_attr(&mut self, key: AttrKey, value: impl Into<AttrValue>) {
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| *k == key) {
            attr.1 = value;
        } else {
            self.push((key, value));
        }
    }

    fn remove_attr(&mut self, key: AttrKey) -> Option<AttrValue> {
        self.iter()
            .position(|(k, _)| *k == key)
            .map(|pos| self.remove(pos).1)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_operations() {
        let mut attrs: Attrs = Vec::new();

        attrs.set_attr(AttrKey::Url, "https://a.example");
        attrs.set_attr(AttrKey::Inline, true);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get_attr(AttrKey::Inline), Some(&AttrValue::Bool(true)));
        assert!(!attrs.has_attr(AttrKey::Color));

        // Update existing
        attrs.set_attr(AttrKey::Url, "https://b.example");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get_attr(AttrKey::Url), Some(&AttrValue::from("https://b.example")));

        let removed = attrs.remove_attr(AttrKey::Inline);
        assert_eq!(removed, Some(AttrValue::Bool(true)));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_attr_key_names_round_trip() {
        for key in AttrKey::all() {
            assert_eq!(key.name().parse::<AttrKey>(), Ok(*key));
        }
        assert!("onClick".parse::<AttrKey>().is_err());
    }

    #[test]
    fn test_color_hex() {
        let color = Color::from_hex("#ff8800").unwrap();
        assert_eq!(color, Color::rgb(0xff, 0x88, 0x00));
        assert_eq!(color.to_string(), "#ff8800");
        assert_eq!(Color::from_hex("00ff00"), Some(Color::new(0x00ff00)));
        assert!(Color::from_hex("#fff").is_none());
        assert!(Color::from_hex("#gggggg").is_none());
    }

    #[test]
    fn test_color_hex_rejects_signs() {
        assert!(Color::from_hex("+fffff").is_none());
        assert!(Color::from_hex("#+fffff").is_none());
        assert!(Color::from_hex("-00000").is_none());
        let err = AttrValue::from("+fffff").into_color(AttrKey::Color).unwrap_err();
        assert!(matches!(err, RenderError::AttributeType { key: AttrKey::Color, .. }));
    }

    #[test]
    fn test_attachment_identity() {
        let data: Arc<[u8]> = Arc::from(&b"png"[..]);
        let a = FileRef::Attachment(Attachment::new("a.png", Arc::clone(&data)));
        let same = FileRef::Attachment(Attachment::new("a.png", data));
        let copy = FileRef::Attachment(Attachment::new("a.png", &b"png"[..]));

        assert_eq!(a, same);
        assert_ne!(a, copy);
        assert_eq!(FileRef::Url("https://x.example/cat.png".into()).name(), Some("cat.png"));
    }

    #[test]
    fn test_value_coercion() {
        let err = AttrValue::Bool(true).into_text(AttrKey::Url).unwrap_err();
        assert_eq!(err.to_string(), "attribute 'url' expects text, found bool");

        let emoji = AttrValue::from("⬅️").into_emoji(AttrKey::Emoji).unwrap();
        assert_eq!(emoji.as_str(), "⬅️");

        let color = AttrValue::from("#000001").into_color(AttrKey::Color).unwrap();
        assert_eq!(color.value(), 1);
    }
}
