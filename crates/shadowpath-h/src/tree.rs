//! Shadow tree over the CDP `DOM` domain.
//!
//! `DOM.getDocument` with `pierce` returns the whole document including
//! shadow roots of every kind. The snapshot indexes which elements host an
//! open root; selector queries themselves are answered by the browser through
//! `DOM.querySelectorAll`, which works on documents, shadow roots and
//! elements alike.

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::dom::{
    GetDocumentParams, Node, NodeId, QuerySelectorAllParams, ShadowRootType,
};
use shadowpath_common::protocol::ElementRef;
use shadowpath_common::{AddressableTree, ResolveError, Selector, ShadowTree};
use std::collections::HashMap;
use tracing::debug;

const ELEMENT_NODE: i64 = 1;

/// A node, addressed by its CDP node id within one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CdpNode(pub i64);

#[derive(Debug, Clone)]
struct NodeInfo {
    backend_node_id: i64,
    description: String,
    is_element: bool,
    open_shadow_root: Option<i64>,
}

pub struct CdpTree {
    page: Page,
    document: i64,
    nodes: HashMap<i64, NodeInfo>,
    by_backend_id: HashMap<i64, i64>,
}

impl CdpTree {
    /// Fetch the full document, shadow roots included, from `page`.
    ///
    /// Node ids are only valid until the next snapshot of the same page.
    pub async fn snapshot(page: &Page) -> Result<Self, ResolveError> {
        let params = GetDocumentParams::builder().depth(-1).pierce(true).build();
        let root = page
            .execute(params)
            .await
            .map_err(|e| ResolveError::Backend(format!("DOM.getDocument failed: {}", e)))?
            .result
            .root;

        let mut tree = Self {
            page: page.clone(),
            document: *root.node_id.inner(),
            nodes: HashMap::new(),
            by_backend_id: HashMap::new(),
        };
        tree.index(&root);
        debug!("DOM snapshot indexed {} node(s)", tree.nodes.len());
        Ok(tree)
    }

    fn index(&mut self, node: &Node) {
        let node_id = *node.node_id.inner();
        let backend_node_id = *node.backend_node_id.inner();

        let open_shadow_root = node
            .shadow_roots
            .iter()
            .flatten()
            .find(|root| matches!(root.shadow_root_type, Some(ShadowRootType::Open)))
            .map(|root| *root.node_id.inner());

        self.nodes.insert(
            node_id,
            NodeInfo {
                backend_node_id,
                description: describe_node(node),
                is_element: node.node_type == ELEMENT_NODE,
                open_shadow_root,
            },
        );
        self.by_backend_id.insert(backend_node_id, node_id);

        for child in node.children.iter().flatten() {
            self.index(child);
        }
        for root in node.shadow_roots.iter().flatten() {
            self.index(root);
        }
        if let Some(document) = &node.content_document {
            self.index(document);
        }
        if let Some(template) = &node.template_content {
            self.index(template);
        }
    }

    fn info(&self, node: &CdpNode) -> Result<&NodeInfo, ResolveError> {
        self.nodes.get(&node.0).ok_or_else(|| {
            ResolveError::Backend(format!("Node {} is not part of the DOM snapshot", node.0))
        })
    }
}

/// Start tag rendition from the node's flattened `[name, value, ...]` attributes.
fn describe_node(node: &Node) -> String {
    if node.node_type != ELEMENT_NODE {
        return node.node_name.clone();
    }
    let mut out = format!("<{}", node.local_name);
    for pair in node.attributes.iter().flatten().collect::<Vec<_>>().chunks(2) {
        match pair {
            [name, value] => out.push_str(&format!(" {}=\"{}\"", name, value)),
            [name] => out.push_str(&format!(" {}", name)),
            _ => {}
        }
    }
    out.push('>');
    out
}

fn map_query_error(selector: &Selector, message: String) -> ResolveError {
    if message.contains("DOM Error while querying") {
        ResolveError::InvalidSelector(selector.to_string())
    } else {
        ResolveError::Backend(format!("DOM.querySelectorAll failed: {}", message))
    }
}

#[async_trait]
impl ShadowTree for CdpTree {
    type Node = CdpNode;

    async fn document(&self) -> Result<CdpNode, ResolveError> {
        Ok(CdpNode(self.document))
    }

    async fn query_selector_all(
        &self,
        scope: &CdpNode,
        selector: &Selector,
    ) -> Result<Vec<CdpNode>, ResolveError> {
        let params = QuerySelectorAllParams::new(NodeId::new(scope.0), selector.as_str());
        let response = self
            .page
            .execute(params)
            .await
            .map_err(|e| map_query_error(selector, e.to_string()))?;
        Ok(response
            .result
            .node_ids
            .iter()
            .map(|id| CdpNode(*id.inner()))
            .collect())
    }

    async fn shadow_root(&self, element: &CdpNode) -> Result<Option<CdpNode>, ResolveError> {
        Ok(self.info(element)?.open_shadow_root.map(CdpNode))
    }

    async fn describe(&self, element: &CdpNode) -> String {
        self.info(element)
            .map(|info| info.description.clone())
            .unwrap_or_else(|_| format!("<node {}>", element.0))
    }
}

#[async_trait]
impl AddressableTree for CdpTree {
    /// References carry the backend node id, which survives new snapshots.
    async fn element_ref(&self, node: &CdpNode) -> ElementRef {
        match self.nodes.get(&node.0) {
            Some(info) => ElementRef::new(info.backend_node_id, info.description.clone()),
            None => ElementRef::new(node.0, format!("<node {}>", node.0)),
        }
    }

    fn lookup(&self, element: &ElementRef) -> Result<CdpNode, ResolveError> {
        self.by_backend_id
            .get(&element.id)
            .filter(|node_id| self.nodes.get(node_id).is_some_and(|info| info.is_element))
            .map(|node_id| CdpNode(*node_id))
            .ok_or(ResolveError::UnknownElement(element.id))
    }
}
