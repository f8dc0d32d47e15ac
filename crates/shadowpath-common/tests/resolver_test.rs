use async_trait::async_trait;
use shadowpath_common::protocol::{ElementRef, FindInShadowsRequest};
use shadowpath_common::resolver::execute_request;
use shadowpath_common::{
    AddressableTree, ResolveError, Selector, ShadowLocator, ShadowPath, ShadowTree,
    find_in_shadows,
};
use std::collections::HashMap;
use std::sync::Mutex;

const DOCUMENT: u32 = 0;

/// Canned answers per (scope, selector) plus a log of every query issued.
#[derive(Default)]
struct MockTree {
    answers: HashMap<(u32, String), Vec<u32>>,
    shadow_roots: HashMap<u32, u32>,
    queries: Mutex<Vec<(u32, String)>>,
}

impl MockTree {
    fn answer(mut self, scope: u32, selector: &str, nodes: &[u32]) -> Self {
        self.answers
            .insert((scope, selector.to_string()), nodes.to_vec());
        self
    }

    fn shadow(mut self, host: u32, root: u32) -> Self {
        self.shadow_roots.insert(host, root);
        self
    }

    fn queries(&self) -> Vec<(u32, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShadowTree for MockTree {
    type Node = u32;

    async fn document(&self) -> Result<u32, ResolveError> {
        Ok(DOCUMENT)
    }

    async fn query_selector_all(
        &self,
        scope: &u32,
        selector: &Selector,
    ) -> Result<Vec<u32>, ResolveError> {
        let key = (*scope, selector.as_str().to_string());
        self.queries.lock().unwrap().push(key.clone());
        Ok(self.answers.get(&key).cloned().unwrap_or_default())
    }

    async fn shadow_root(&self, element: &u32) -> Result<Option<u32>, ResolveError> {
        Ok(self.shadow_roots.get(element).copied())
    }

    async fn describe(&self, element: &u32) -> String {
        format!("node-{}", element)
    }
}

#[async_trait]
impl AddressableTree for MockTree {
    async fn element_ref(&self, node: &u32) -> ElementRef {
        ElementRef::new(*node as i64, self.describe(node).await)
    }

    fn lookup(&self, element: &ElementRef) -> Result<u32, ResolveError> {
        u32::try_from(element.id).map_err(|_| ResolveError::UnknownElement(element.id))
    }
}

fn sel(s: &str) -> Selector {
    Selector::from(s)
}

#[tokio::test]
async fn test_empty_path_queries_document_directly() {
    let tree = MockTree::default().answer(DOCUMENT, "div.x", &[3, 5]);
    let found = find_in_shadows(&tree, &sel("div.x"), &[], None).await.unwrap();
    assert_eq!(found, vec![3, 5]);
    assert_eq!(tree.queries(), vec![(DOCUMENT, "div.x".to_string())]);
}

#[tokio::test]
async fn test_single_level_descent() {
    let tree = MockTree::default()
        .answer(DOCUMENT, "#host", &[10])
        .shadow(10, 100)
        .answer(100, "#target", &[101]);

    let found = find_in_shadows(&tree, &sel("#target"), &[sel("#host")], None)
        .await
        .unwrap();
    assert_eq!(found, vec![101]);
}

#[tokio::test]
async fn test_results_follow_host_order_across_levels() {
    let tree = MockTree::default()
        .answer(DOCUMENT, ".outer", &[1, 2])
        .shadow(1, 10)
        .shadow(2, 20)
        .answer(10, ".inner", &[11, 12])
        .answer(20, ".inner", &[21])
        .shadow(11, 110)
        .shadow(12, 120)
        .shadow(21, 210)
        .answer(110, "p", &[111, 112])
        .answer(120, "p", &[121])
        .answer(210, "p", &[211]);

    let path = [sel(".outer"), sel(".inner")];
    let found = find_in_shadows(&tree, &sel("p"), &path, None).await.unwrap();
    assert_eq!(found, vec![111, 112, 121, 211]);
}

#[tokio::test]
async fn test_missing_shadow_root_aborts_whole_call() {
    // Host 2 has no shadow root; host 1 and 3 do.
    let tree = MockTree::default()
        .answer(DOCUMENT, ".host", &[1, 2, 3])
        .shadow(1, 10)
        .shadow(3, 30)
        .answer(10, "p", &[11])
        .answer(30, "p", &[31]);

    let err = find_in_shadows(&tree, &sel("p"), &[sel(".host")], None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::InaccessibleShadowRoot {
            element: "node-2".into()
        }
    );
    // Host 3 is never searched.
    assert!(!tree.queries().contains(&(30, "p".to_string())));
}

#[tokio::test]
async fn test_start_element_with_shadow_root_searches_inside_it() {
    let tree = MockTree::default()
        .shadow(7, 70)
        .answer(70, "p", &[71])
        .answer(7, "p", &[99]);

    let found = find_in_shadows(&tree, &sel("p"), &[], Some(&7)).await.unwrap();
    assert_eq!(found, vec![71]);
}

#[tokio::test]
async fn test_start_element_without_shadow_root_is_its_own_scope() {
    let tree = MockTree::default().answer(7, "p", &[8, 9]);

    let found = find_in_shadows(&tree, &sel("p"), &[], Some(&7)).await.unwrap();
    assert_eq!(found, vec![8, 9]);
}

#[tokio::test]
async fn test_duplicates_are_kept() {
    // Both hosts share one shadow root answer.
    let tree = MockTree::default()
        .answer(DOCUMENT, ".host", &[1, 2])
        .shadow(1, 10)
        .shadow(2, 10)
        .answer(10, "p", &[11]);

    let found = find_in_shadows(&tree, &sel("p"), &[sel(".host")], None)
        .await
        .unwrap();
    assert_eq!(found, vec![11, 11]);
}

#[tokio::test]
async fn test_no_hosts_yields_empty_result() {
    let tree = MockTree::default();
    let found = find_in_shadows(&tree, &sel("p"), &[sel("#missing")], None)
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_locator_find_first_reports_missing_element() {
    let tree = MockTree::default()
        .answer(DOCUMENT, "#host", &[1])
        .shadow(1, 10);

    let locator = ShadowLocator::new("#button", "#host");
    let err = locator.find_first(&tree, None).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Element not found {shadowCss(#button, #host)}"
    );
}

#[tokio::test]
async fn test_locator_find_first_returns_first_match() {
    let tree = MockTree::default()
        .answer(DOCUMENT, "#host", &[1])
        .shadow(1, 10)
        .answer(10, ".item", &[12, 13]);

    let locator = ShadowLocator::new(".item", "#host");
    assert_eq!(locator.find_first(&tree, None).await.unwrap(), 12);
}

#[tokio::test]
async fn test_execute_request_maps_start_and_results() {
    let tree = MockTree::default()
        .shadow(4, 40)
        .answer(40, "#inner", &[41])
        .shadow(41, 410)
        .answer(410, "button", &[411]);

    let path: ShadowPath = ["#inner"].into_iter().collect();
    let request = FindInShadowsRequest::new("button", path).starting_at(ElementRef::new(4, ""));

    let refs = execute_request(&tree, &request).await.unwrap();
    assert_eq!(refs, vec![ElementRef::new(411, "node-411")]);
}

#[tokio::test]
async fn test_execute_request_rejects_unknown_start() {
    let tree = MockTree::default();
    let request =
        FindInShadowsRequest::new("p", ShadowPath::new()).starting_at(ElementRef::new(-1, ""));

    let err = execute_request(&tree, &request).await.unwrap_err();
    assert_eq!(err, ResolveError::UnknownElement(-1));
}
