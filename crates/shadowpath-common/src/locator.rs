use std::fmt;

use crate::error::ResolveError;
use crate::resolver::find_in_shadows;
use crate::selector::{Selector, ShadowPath};
use crate::tree::ShadowTree;

/// A target selector paired with the shadow hosts leading to it.
///
/// ```
/// use shadowpath_common::ShadowLocator;
///
/// let locator = ShadowLocator::new("#submit", "app-shell").inner("login-form");
/// assert_eq!(locator.to_string(), "shadowCss(#submit, app-shell, login-form)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowLocator {
    target: Selector,
    path: ShadowPath,
}

impl ShadowLocator {
    pub fn new(target: impl Into<Selector>, host: impl Into<Selector>) -> Self {
        let mut path = ShadowPath::new();
        path.push(host);
        Self {
            target: target.into(),
            path,
        }
    }

    /// Append a host nested inside the previous one.
    pub fn inner(mut self, host: impl Into<Selector>) -> Self {
        self.path.push(host);
        self
    }

    pub async fn find_all<T>(
        &self,
        tree: &T,
        start: Option<&T::Node>,
    ) -> Result<Vec<T::Node>, ResolveError>
    where
        T: ShadowTree + ?Sized,
    {
        find_in_shadows(tree, &self.target, &self.path, start).await
    }

    pub async fn find_first<T>(
        &self,
        tree: &T,
        start: Option<&T::Node>,
    ) -> Result<T::Node, ResolveError>
    where
        T: ShadowTree + ?Sized,
    {
        self.find_all(tree, start)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoSuchElement {
                locator: self.to_string(),
            })
    }
}

impl fmt::Display for ShadowLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shadowCss({}", self.target)?;
        for host in self.path.iter() {
            write!(f, ", {}", host)?;
        }
        f.write_str(")")
    }
}
