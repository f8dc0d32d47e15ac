use async_trait::async_trait;
use shadowpath_common::{ResolveError, ShadowPath};
use shadowpath_engine::backend::{Backend, BackendError, NavigationResult};
use shadowpath_engine::config::QueryConfig;
use shadowpath_engine::executor::QueryExecutor;
use shadowpath_engine::protocol::{ElementRef, FindInShadowsRequest};
use std::collections::VecDeque;

#[derive(Default)]
struct MockBackend {
    responses: VecDeque<Result<Vec<ElementRef>, BackendError>>,
    calls: usize,
    navigated: Vec<String>,
}

impl MockBackend {
    fn with(responses: Vec<Result<Vec<ElementRef>, BackendError>>) -> Self {
        Self {
            responses: responses.into(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
    async fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
    async fn is_ready(&self) -> bool {
        true
    }
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.navigated.push(url.to_string());
        Ok(NavigationResult {
            url: url.to_string(),
            title: "Mock".into(),
        })
    }

    async fn find_in_shadows(
        &mut self,
        _request: &FindInShadowsRequest,
    ) -> Result<Vec<ElementRef>, BackendError> {
        self.calls += 1;
        self.responses.pop_front().unwrap_or_else(|| Ok(vec![]))
    }
}

fn request() -> FindInShadowsRequest {
    let path: ShadowPath = ["#host"].into_iter().collect();
    FindInShadowsRequest::new("#target", path)
}

fn inaccessible() -> BackendError {
    BackendError::Resolve(ResolveError::InaccessibleShadowRoot {
        element: "<x-widget>".into(),
    })
}

fn config(timeout_ms: u64) -> QueryConfig {
    QueryConfig {
        timeout_ms,
        poll_interval_ms: 200,
        settle_ms: 0,
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_non_empty_result_is_returned() {
    let mut backend = MockBackend::with(vec![Ok(vec![ElementRef::new(4, "<p>")])]);
    let found = QueryExecutor::new(config(1000))
        .find(&mut backend, &request())
        .await
        .unwrap();
    assert_eq!(found, vec![ElementRef::new(4, "<p>")]);
    assert_eq!(backend.calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_retries_until_shadow_root_attaches() {
    let mut backend = MockBackend::with(vec![
        Err(inaccessible()),
        Ok(vec![]),
        Ok(vec![ElementRef::new(9, "<button>")]),
    ]);
    let found = QueryExecutor::new(config(1000))
        .find(&mut backend, &request())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(backend.calls, 3);
}

#[tokio::test(start_paused = true)]
async fn test_zero_timeout_makes_one_attempt() {
    let mut backend = MockBackend::default();
    let found = QueryExecutor::new(config(0))
        .find(&mut backend, &request())
        .await
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(backend.calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_failure_surfaces_after_timeout() {
    let mut backend = MockBackend::with((0..100).map(|_| Err(inaccessible())).collect());
    let err = QueryExecutor::new(config(1000))
        .find(&mut backend, &request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BackendError::Resolve(ResolveError::InaccessibleShadowRoot { .. })
    ));
    assert!(backend.calls > 1);
    assert!(backend.calls < 100);
}

#[tokio::test(start_paused = true)]
async fn test_other_errors_are_not_retried() {
    let mut backend = MockBackend::with(vec![Err(BackendError::Resolve(
        ResolveError::InvalidSelector("p:hover".into()),
    ))]);
    let err = QueryExecutor::new(config(1000))
        .find(&mut backend, &request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BackendError::Resolve(ResolveError::InvalidSelector(_))
    ));
    assert_eq!(backend.calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_open_navigates() {
    let mut backend = MockBackend::default();
    let executor = QueryExecutor::new(QueryConfig {
        settle_ms: 500,
        ..config(0)
    });
    let nav = executor.open(&mut backend, "https://example.com").await.unwrap();
    assert_eq!(nav.title, "Mock");
    assert_eq!(backend.navigated, vec!["https://example.com"]);
}
