//! Node accessor and dispatch macros
//!
//! These macros eliminate repetitive match code over the `Node` sum type.
//! `paste` builds the method names from the variant names.

/// Generate is_xxx, as_xxx, as_xxx_mut for every `Node` variant
///
/// Uses paste's `:snake` modifier to derive the method name from the variant.
/// # Generated methods per variant:
/// - `is_xxx(&self) -> bool`
/// - `as_xxx(&self) -> Option<&Type>`
/// - `as_xxx_mut(&mut self) -> Option<&mut Type>`
///
/// # Example
/// ```ignore
/// impl Node {
///     // FieldName -> is_field_name, as_field_name, as_field_name_mut
///     impl_node_accessors!(Embed => Embed, FieldName => FieldName);
/// }
/// ```
macro_rules! impl_node_accessors {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = "Check if this is a " $variant " node"]
                #[inline]
                pub fn [<is_ $variant:snake>](&self) -> bool {
                    matches!(self, Self::$variant(_))
                }

                #[doc = "Try to get as " $variant " reference"]
                #[inline]
                pub fn [<as_ $variant:snake>](&self) -> Option<&$ty> {
                    match self { Self::$variant(v) => Some(v), _ => None }
                }

                #[doc = "Try to get as mutable " $variant " reference"]
                #[inline]
                pub fn [<as_ $variant:snake _mut>](&mut self) -> Option<&mut $ty> {
                    match self { Self::$variant(v) => Some(v), _ => None }
                }
            )*
        }
    };
}

/// Dispatch an expression over every parent variant of `Node`
///
/// Binds the boxed parent to `$p` and evaluates `$body`; leaves produce `$leaf`.
///
/// # Example
/// ```ignore
/// let parent: Option<&dyn ParentNode> = match_parent!(self, p => Some(&**p), None);
/// ```
macro_rules! match_parent {
    ($node:expr, $p:ident => $body:expr, $leaf:expr) => {
        match $node {
            Node::Author($p) => $body,
            Node::Description($p) => $body,
            Node::Embed($p) => $body,
            Node::Field($p) => $body,
            Node::FieldName($p) => $body,
            Node::FieldValue($p) => $body,
            Node::Footer($p) => $body,
            Node::Message($p) => $body,
            Node::Title($p) => $body,
            Node::File(_)
            | Node::Image(_)
            | Node::Reaction(_)
            | Node::Text(_)
            | Node::Thumbnail(_)
            | Node::Timestamp(_) => $leaf,
        }
    };
}
