use serde::{Deserialize, Serialize};
use std::fmt;

use crate::selector::{Selector, ShadowPath};

/// Reference to an element in the numbering of the tree that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub id: i64,
    #[serde(default)]
    pub description: String,
}

impl ElementRef {
    pub fn new(id: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.description)
    }
}

/// The three positional arguments of a shadow search.
///
/// On the wire it is a JSON array: `["#target", ["#host"], null]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PositionalArgs", into = "PositionalArgs")]
pub struct FindInShadowsRequest {
    pub target: Selector,
    pub shadow_path: ShadowPath,
    pub start: Option<ElementRef>,
}

impl FindInShadowsRequest {
    pub fn new(target: impl Into<Selector>, shadow_path: ShadowPath) -> Self {
        Self {
            target: target.into(),
            shadow_path,
            start: None,
        }
    }

    pub fn starting_at(mut self, element: ElementRef) -> Self {
        self.start = Some(element);
        self
    }
}

#[derive(Serialize, Deserialize)]
struct PositionalArgs(Selector, ShadowPath, Option<ElementRef>);

impl From<PositionalArgs> for FindInShadowsRequest {
    fn from(PositionalArgs(target, shadow_path, start): PositionalArgs) -> Self {
        Self {
            target,
            shadow_path,
            start,
        }
    }
}

impl From<FindInShadowsRequest> for PositionalArgs {
    fn from(request: FindInShadowsRequest) -> Self {
        PositionalArgs(request.target, request.shadow_path, request.start)
    }
}
