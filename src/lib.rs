//! herald-vdom - Retained message tree for chat embeds and reactions
//!
//! ## Core Concepts
//!
//! **Render tree**: a message is described as a tree of typed nodes (message
//! blocks, embeds with their fields, reactions). The node kind set is closed;
//! every insertion is checked against the parent's child-kind rule.
//!
//! **Commit batches**: a diffing engine evolves the tree through the mutation
//! protocol inside a batch. Closing the batch compares the tree with a
//! snapshot taken when it opened and notifies listeners once if it changed.
//!
//! **Resource handoff**: the message the tree is synchronized into is created
//! once, asynchronously, by a platform client. The session holds a one-shot
//! slot the client provides it through, so authoring code can read or await it.
//!
//! ## Modules
//! - `node`: Node model (`Node`, `NodeKind`, `Root`, `ParentNode`)
//! - `attr`: Attribute system
//! - `mutation`: Node creation and attribute updates
//! - `session`: Render sessions and commit batches
//! - `payload`: Embed folding and outbound drafts
//! - `handoff`: One-shot resource handoff
//! - `publish`: Publication driver for platform clients
//!
//! ## Usage
//!
//! ```ignore
//! use herald_vdom::prelude::*;
//!
//! let session = RenderSession::new(channel);
//! session.commit(|batch| {
//!     batch.append_child_to_container(Node::message("count: 0"))?;
//!     batch.append_child_to_container(Node::reaction("👍"))
//! })?;
//!
//! let publication = publish(&session).await?;
//! tokio::spawn(publication.run());
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

#[macro_use]
mod macros;

// =============================================================================
// Core modules
// =============================================================================

/// Error types
pub mod error;

/// Attribute types
pub mod attr;

/// Node types: Node, NodeKind, Root, Embed, Field, TextBlock
pub mod node;

/// Mutation protocol for detached nodes
pub mod mutation;

/// Outbound payloads: EmbedPayload, Draft
pub mod payload;

/// One-shot resource handoff
pub mod handoff;

/// Render sessions, configuration and commit batches
pub mod session;

/// Publication driver
pub mod publish;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Node types
pub use node::{Children, Embed, Field, Node, NodeId, NodeKind, ParentNode, Root, Text};

// Attribute types
pub use attr::{AttrKey, AttrPatch, AttrValue, Attrs, Color, Emoji, FileRef};

// Session
pub use session::{Commit, ListenerId, RenderConfig, RenderSession, Surface};

// Payloads
pub use payload::{Draft, EmbedPayload};

// Handoff
pub use handoff::{Handoff, ResourceFuture};

// Publication
pub use publish::{Publication, Publish, publish};

// Error types
pub use error::{RenderError, RenderResult};

// =============================================================================
// Tests
// =============================================================================
