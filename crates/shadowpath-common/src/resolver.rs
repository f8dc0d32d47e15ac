//! Shadow-path resolution.
//!
//! Starting from a search context, each selector of the shadow path picks the
//! hosts to descend into; the target selector is applied once the path is
//! exhausted. Results are concatenated in the order the hosts were found.

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::ResolveError;
use crate::protocol::{ElementRef, FindInShadowsRequest};
use crate::selector::Selector;
use crate::tree::{AddressableTree, ShadowTree};

/// Find every element matching `target` at the bottom of `path`.
///
/// `start` picks the initial search context: the document when absent,
/// otherwise the element's open shadow root, or the element itself when it
/// has none. A host without an open shadow root aborts the whole call.
pub async fn find_in_shadows<T>(
    tree: &T,
    target: &Selector,
    path: &[Selector],
    start: Option<&T::Node>,
) -> Result<Vec<T::Node>, ResolveError>
where
    T: ShadowTree + ?Sized,
{
    let scope = search_context(tree, start).await?;
    descend(tree, target, path, scope).await
}

/// Initial scope for a search starting at `start`.
pub async fn search_context<T>(tree: &T, start: Option<&T::Node>) -> Result<T::Node, ResolveError>
where
    T: ShadowTree + ?Sized,
{
    match start {
        None => tree.document().await,
        Some(element) => Ok(tree
            .shadow_root(element)
            .await?
            .unwrap_or_else(|| element.clone())),
    }
}

fn descend<'a, T>(
    tree: &'a T,
    target: &'a Selector,
    path: &'a [Selector],
    scope: T::Node,
) -> BoxFuture<'a, Result<Vec<T::Node>, ResolveError>>
where
    T: ShadowTree + ?Sized,
    T::Node: 'a,
{
    Box::pin(async move {
        let Some((next, rest)) = path.split_first() else {
            return tree.query_selector_all(&scope, target).await;
        };

        let hosts = tree.query_selector_all(&scope, next).await?;
        debug!(
            "Descending into {} shadow host(s) matching '{}' ({} level(s) left)",
            hosts.len(),
            next,
            rest.len()
        );

        let mut found = Vec::new();
        for host in &hosts {
            let root = open_shadow_root(tree, host).await?;
            found.extend(descend(tree, target, rest, root).await?);
        }
        Ok(found)
    })
}

async fn open_shadow_root<T>(tree: &T, host: &T::Node) -> Result<T::Node, ResolveError>
where
    T: ShadowTree + ?Sized,
{
    match tree.shadow_root(host).await? {
        Some(root) => Ok(root),
        None => Err(ResolveError::InaccessibleShadowRoot {
            element: tree.describe(host).await,
        }),
    }
}

/// Evaluate a positional-argument request and hand back element references.
pub async fn execute_request<T>(
    tree: &T,
    request: &FindInShadowsRequest,
) -> Result<Vec<ElementRef>, ResolveError>
where
    T: AddressableTree + ?Sized,
{
    let start = request
        .start
        .as_ref()
        .map(|element| tree.lookup(element))
        .transpose()?;

    let nodes = find_in_shadows(tree, &request.target, &request.shadow_path, start.as_ref()).await?;

    let mut refs = Vec::with_capacity(nodes.len());
    for node in &nodes {
        refs.push(tree.element_ref(node).await);
    }
    Ok(refs)
}
