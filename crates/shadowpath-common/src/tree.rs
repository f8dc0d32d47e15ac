//! Shadow Tree Abstraction
//!
//! The resolver only needs four things from a DOM: the document root, a
//! scoped `querySelectorAll`, access to an element's open shadow root, and a
//! printable description of an element. Everything else about the DOM (an
//! in-memory arena, a live page behind CDP) stays behind this trait.

use async_trait::async_trait;

use crate::error::ResolveError;
use crate::protocol::ElementRef;
use crate::selector::Selector;

/// A DOM that can be searched scope by scope.
///
/// Scopes and elements share the `Node` type: a scope is the document, a
/// shadow root, or an element used as a search root.
#[async_trait]
pub trait ShadowTree: Send + Sync {
    type Node: Clone + Send + Sync;

    /// Root of the whole document.
    async fn document(&self) -> Result<Self::Node, ResolveError>;

    /// Descendants of `scope` matching `selector`, in document order.
    ///
    /// Must not cross into shadow trees hosted below `scope`.
    async fn query_selector_all(
        &self,
        scope: &Self::Node,
        selector: &Selector,
    ) -> Result<Vec<Self::Node>, ResolveError>;

    /// The element's shadow root if it is attached in open mode.
    async fn shadow_root(&self, element: &Self::Node) -> Result<Option<Self::Node>, ResolveError>;

    /// Short human readable description used in error messages.
    async fn describe(&self, element: &Self::Node) -> String;
}

/// A tree whose nodes can be exchanged with callers as [`ElementRef`]s.
#[async_trait]
pub trait AddressableTree: ShadowTree {
    async fn element_ref(&self, node: &Self::Node) -> ElementRef;

    fn lookup(&self, element: &ElementRef) -> Result<Self::Node, ResolveError>;
}
