use thiserror::Error;

/// Errors raised while resolving a shadow path.
///
/// Only `InaccessibleShadowRoot` originates in the descent itself. The other
/// variants carry failures of the DOM being walked and are passed through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A shadow-host candidate has no open shadow root.
    #[error("The element is not a shadow host or has 'closed' shadow-dom mode: {element}")]
    InaccessibleShadowRoot { element: String },

    /// A locator asked for a single element and the result set was empty.
    #[error("Element not found {{{locator}}}")]
    NoSuchElement { locator: String },

    /// The selector engine rejected a selector.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// An element reference does not name a node of the tree.
    #[error("Unknown element reference: {0}")]
    UnknownElement(i64),

    /// Transport or protocol failure of the tree implementation.
    #[error("Backend error: {0}")]
    Backend(String),
}
