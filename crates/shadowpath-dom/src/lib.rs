//! In-memory DOM with shadow roots.
//!
//! An arena document that can be built node by node, searched with CSS
//! selectors and walked by the shadow-path resolver.

pub mod document;
pub mod selector;
mod tree;

pub use document::{Document, DomError, NodeId, ShadowRootMode};
pub use selector::{SelectorList, SelectorParseError};
