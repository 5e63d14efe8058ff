//! Prelude module for common imports.
//!
//! ```ignore
//! use herald_vdom::prelude::*;
//! ```

// Node types
pub use crate::node::{
    Author, BlockAttrs, Children, Description, Embed, Field, FieldName, FieldValue, FileNode,
    Footer, Image, Message, Node, NodeId, NodeKind, ParentNode, Reaction, Root, Text, TextBlock,
    Thumbnail, Timestamp, Title,
};

// Attributes
pub use crate::attr::{Attachment, AttrKey, AttrPatch, AttrValue, Attrs, AttrsExt, Color, Emoji, FileRef};

// Mutation protocol
pub use crate::mutation::{
    append_initial_child, apply_text_update, apply_update, create_instance, create_text_instance,
    prepare_update,
};

// Session
pub use crate::session::{ActiveGuard, Commit, ListenerId, RenderConfig, RenderSession, Surface};

// Payloads
pub use crate::payload::{Draft, EmbedAuthor, EmbedField, EmbedFooter, EmbedPayload};

// Handoff
pub use crate::handoff::{Handoff, ResourceFuture};

// Publication
pub use crate::publish::{Publication, Publish, publish};

// Error
pub use crate::error::{RenderError, RenderResult};
