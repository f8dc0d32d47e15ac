use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::selector::{
    Combinator, ComplexSelector, Compound, SelectorList, SelectorParseError, SelectorPart,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    Open,
    Closed,
}

impl fmt::Display for ShadowRootMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowRootMode::Open => f.write_str("open"),
            ShadowRootMode::Closed => f.write_str("closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("Element {0} already hosts a shadow root")]
    ShadowRootAlreadyAttached(NodeId),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    shadow_root: Option<NodeId>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    ShadowRoot { host: NodeId, mode: ShadowRootMode },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Arena-backed document.
///
/// Shadow roots hang off their host rather than its child list, so ordinary
/// traversal never enters them.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Resolve a raw index into a node id, if it names a node.
    pub fn node(&self, index: usize) -> Option<NodeId> {
        (index < self.nodes.len()).then_some(NodeId(index))
    }

    fn get(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, DomError> {
        match self.get(parent)?.kind {
            NodeKind::Document | NodeKind::Element(_) | NodeKind::ShadowRoot { .. } => {}
            NodeKind::Text(_) => return Err(DomError::NotAContainer(parent)),
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Append an element under `parent`. Tag and attribute names are lowercased.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let data = ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
                .collect(),
            shadow_root: None,
        };
        self.push(parent, NodeKind::Element(data))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    /// Attach a shadow root to `host` and return the root.
    pub fn attach_shadow(
        &mut self,
        host: NodeId,
        mode: ShadowRootMode,
    ) -> Result<NodeId, DomError> {
        match self.element(host) {
            None => {
                self.get(host)?;
                return Err(DomError::NotAnElement(host));
            }
            Some(data) if data.shadow_root.is_some() => {
                return Err(DomError::ShadowRootAlreadyAttached(host));
            }
            Some(_) => {}
        }

        let root = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::ShadowRoot { host, mode },
        });
        if let NodeKind::Element(data) = &mut self.nodes[host.0].kind {
            data.shadow_root = Some(root);
        }
        Ok(root)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|data| data.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        let data = self.element(id)?;
        data.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of all descendant text nodes in this tree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        if let NodeKind::Text(text) = &node.kind {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// The shadow root attached to `host` regardless of its mode.
    pub fn shadow_root(&self, host: NodeId) -> Option<(NodeId, ShadowRootMode)> {
        let root = self.element(host)?.shadow_root?;
        match self.nodes[root.0].kind {
            NodeKind::ShadowRoot { mode, .. } => Some((root, mode)),
            _ => None,
        }
    }

    /// The shadow root attached to `host` if it is open.
    pub fn open_shadow_root(&self, host: NodeId) -> Option<NodeId> {
        match self.shadow_root(host)? {
            (root, ShadowRootMode::Open) => Some(root),
            (_, ShadowRootMode::Closed) => None,
        }
    }

    /// Elements below `scope` matching `selector`, in document order.
    ///
    /// `scope` itself is never part of the result and shadow trees below it
    /// are not searched.
    pub fn query_selector_all(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorParseError> {
        let list = SelectorList::parse(selector)?;
        let mut candidates = Vec::new();
        self.collect_descendant_elements(scope, &mut candidates);

        let mut misses = vec![HashSet::new(); list.selectors.len()];
        Ok(candidates
            .into_iter()
            .filter(|id| {
                list.selectors
                    .iter()
                    .zip(misses.iter_mut())
                    .any(|(selector, misses)| self.matches_complex(*id, selector, misses))
            })
            .collect())
    }

    pub fn query_selector(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, SelectorParseError> {
        Ok(self.query_selector_all(scope, selector)?.into_iter().next())
    }

    fn collect_descendant_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(id) {
            if self.is_element(*child) {
                out.push(*child);
            }
            self.collect_descendant_elements(*child, out);
        }
    }

    fn matches_complex(
        &self,
        id: NodeId,
        selector: &ComplexSelector,
        misses: &mut HashSet<(NodeId, usize)>,
    ) -> bool {
        self.matches_parts(id, &selector.parts, misses)
    }

    // Right to left with backtracking over ancestors and siblings. `parts` is
    // always a prefix of one selector, so its length identifies it in `misses`,
    // which records (node, prefix) pairs already known not to match.
    fn matches_parts(
        &self,
        id: NodeId,
        parts: &[SelectorPart],
        misses: &mut HashSet<(NodeId, usize)>,
    ) -> bool {
        if misses.contains(&(id, parts.len())) {
            return false;
        }
        let matched = self.matches_parts_uncached(id, parts, misses);
        if !matched {
            misses.insert((id, parts.len()));
        }
        matched
    }

    fn matches_parts_uncached(
        &self,
        id: NodeId,
        parts: &[SelectorPart],
        misses: &mut HashSet<(NodeId, usize)>,
    ) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_compound(id, &last.compound) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        match last.combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => self
                .parent_element(id)
                .is_some_and(|parent| self.matches_parts(parent, rest, misses)),
            Combinator::Descendant => {
                let mut cursor = self.parent_element(id);
                while let Some(ancestor) = cursor {
                    if self.matches_parts(ancestor, rest, misses) {
                        return true;
                    }
                    cursor = self.parent_element(ancestor);
                }
                false
            }
            Combinator::AdjacentSibling => self
                .previous_element_sibling(id)
                .is_some_and(|sibling| self.matches_parts(sibling, rest, misses)),
            Combinator::GeneralSibling => {
                let mut cursor = self.previous_element_sibling(id);
                while let Some(sibling) = cursor {
                    if self.matches_parts(sibling, rest, misses) {
                        return true;
                    }
                    cursor = self.previous_element_sibling(sibling);
                }
                false
            }
        }
    }

    fn matches_compound(&self, id: NodeId, compound: &Compound) -> bool {
        let Some(data) = self.element(id) else {
            return false;
        };
        if let Some(tag) = &compound.tag
            && *tag != data.tag
        {
            return false;
        }
        if let Some(expected) = &compound.id
            && self.attr(id, "id") != Some(expected.as_str())
        {
            return false;
        }
        if !compound.classes.is_empty() {
            let classes = self.attr(id, "class").unwrap_or_default();
            if !compound
                .classes
                .iter()
                .all(|class| classes.split_ascii_whitespace().any(|word| word == class))
            {
                return false;
            }
        }
        compound
            .attrs
            .iter()
            .all(|cond| cond.matches(self.attr(id, &cond.name)))
    }

    // Shadow roots and the document are not elements, so ancestor walks stop
    // at the tree boundary.
    fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.is_element(*parent))
    }

    fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|child| *child == id)?;
        siblings[..position]
            .iter()
            .rev()
            .copied()
            .find(|sibling| self.is_element(*sibling))
    }

    /// Start tag rendition of an element, `#document`, or `#shadow-root (mode)`.
    pub fn describe(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(id.0) else {
            return format!("<unknown node {}>", id);
        };
        match &node.kind {
            NodeKind::Document => "#document".to_string(),
            NodeKind::ShadowRoot { mode, .. } => format!("#shadow-root ({})", mode),
            NodeKind::Text(text) => format!("#text \"{}\"", text),
            NodeKind::Element(data) => {
                let mut out = format!("<{}", data.tag);
                for (name, value) in &data.attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, value));
                }
                out.push('>');
                out
            }
        }
    }
}
