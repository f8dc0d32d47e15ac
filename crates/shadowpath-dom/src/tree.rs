use async_trait::async_trait;
use shadowpath_common::protocol::ElementRef;
use shadowpath_common::{AddressableTree, ResolveError, Selector, ShadowTree};
use tracing::trace;

use crate::document::{Document, NodeId};

#[async_trait]
impl ShadowTree for Document {
    type Node = NodeId;

    async fn document(&self) -> Result<NodeId, ResolveError> {
        Ok(self.root())
    }

    async fn query_selector_all(
        &self,
        scope: &NodeId,
        selector: &Selector,
    ) -> Result<Vec<NodeId>, ResolveError> {
        let found = self
            .query_selector_all(*scope, selector.as_str())
            .map_err(|e| ResolveError::InvalidSelector(e.to_string()))?;
        trace!("'{}' matched {} node(s) under {}", selector, found.len(), scope);
        Ok(found)
    }

    async fn shadow_root(&self, element: &NodeId) -> Result<Option<NodeId>, ResolveError> {
        Ok(self.open_shadow_root(*element))
    }

    async fn describe(&self, element: &NodeId) -> String {
        Document::describe(self, *element)
    }
}

#[async_trait]
impl AddressableTree for Document {
    async fn element_ref(&self, node: &NodeId) -> ElementRef {
        ElementRef::new(node.index() as i64, Document::describe(self, *node))
    }

    fn lookup(&self, element: &ElementRef) -> Result<NodeId, ResolveError> {
        usize::try_from(element.id)
            .ok()
            .and_then(|index| self.node(index))
            .filter(|id| self.is_element(*id))
            .ok_or(ResolveError::UnknownElement(element.id))
    }
}
