pub mod error;
pub mod locator;
pub mod protocol;
pub mod resolver;
pub mod selector;
pub mod tree;

pub use error::ResolveError;
pub use locator::ShadowLocator;
pub use resolver::find_in_shadows;
pub use selector::{Selector, ShadowPath};
pub use tree::{AddressableTree, ShadowTree};
