//! Session configuration

use std::borrow::Cow;

use crate::error::{RenderError, RenderResult};
use crate::node::NodeKind;

/// Configuration for a render session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Separator joining message blocks into one message body (default: `"\n"`).
    pub content_separator: Cow<'static, str>,
    /// Whether drafts carry every embed or only the first one.
    pub all_embeds: bool,
    /// Namespace host tags carry, stripped before kind resolution.
    ///
    /// With `Some("gungnir-")`, `"gungnir-embed"` resolves to
    /// [`NodeKind::Embed`] and a bare `"embed"` is unknown.
    pub tag_prefix: Option<Cow<'static, str>>,
}

impl RenderConfig {
    /// Newline-joined content, first embed only, bare tags.
    pub const DEFAULT: Self = Self {
        content_separator: Cow::Borrowed("\n"),
        all_embeds: false,
        tag_prefix: None,
    };

    /// Set the message block separator.
    pub fn with_content_separator(mut self, separator: impl Into<Cow<'static, str>>) -> Self {
        self.content_separator = separator.into();
        self
    }

    /// Send every embed instead of only the first.
    pub fn with_all_embeds(mut self, all_embeds: bool) -> Self {
        self.all_embeds = all_embeds;
        self
    }

    /// Require and strip a tag namespace.
    pub fn with_tag_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.tag_prefix = Some(prefix.into());
        self
    }

    /// Resolve a host tag to a node kind.
    pub fn resolve_tag(&self, tag: &str) -> RenderResult<NodeKind> {
        let bare = match &self.tag_prefix {
            Some(prefix) => tag
                .strip_prefix(&**prefix)
                .ok_or_else(|| RenderError::UnknownKind(tag.to_string()))?,
            None => tag,
        };
        bare.parse::<NodeKind>().map_err(|_| RenderError::UnknownKind(tag.to_string()))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bare_tags() {
        let config = RenderConfig::DEFAULT;
        assert_eq!(config.resolve_tag("field-value").unwrap(), NodeKind::FieldValue);
        assert!(matches!(config.resolve_tag("div"), Err(RenderError::UnknownKind(t)) if t == "div"));
    }

    #[test]
    fn test_resolve_prefixed_tags() {
        let config = RenderConfig::default().with_tag_prefix("gungnir-");
        assert_eq!(config.resolve_tag("gungnir-embed").unwrap(), NodeKind::Embed);
        // the error names the tag as given, prefix included
        let err = config.resolve_tag("gungnir-button").unwrap_err();
        assert_eq!(err.to_string(), "'gungnir-button' is not a valid element type");
        assert!(config.resolve_tag("embed").is_err());
    }

    #[test]
    fn test_builders() {
        let config = RenderConfig::DEFAULT
            .with_content_separator(String::from(" "))
            .with_all_embeds(true);
        assert_eq!(config.content_separator, " ");
        assert!(config.all_embeds);
        assert_eq!(RenderConfig::default(), RenderConfig::DEFAULT);
    }
}
