use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A selector string understood by the tree's selector engine.
///
/// The resolver treats it as opaque; validation is left to whoever evaluates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Selector {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Selector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered shadow-host selectors, outermost first. Empty means no descent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShadowPath(Vec<Selector>);

impl ShadowPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, host: impl Into<Selector>) {
        self.0.push(host.into());
    }
}

impl Deref for ShadowPath {
    type Target = [Selector];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<Selector>> FromIterator<S> for ShadowPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
