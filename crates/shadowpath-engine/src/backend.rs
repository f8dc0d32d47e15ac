use async_trait::async_trait;
use shadowpath_common::ResolveError;
use shadowpath_common::protocol::{ElementRef, FindInShadowsRequest};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend not ready")]
    NotReady,

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Backend error: {0}")]
    Other(String),
}

/// Interface every browser backend implements.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to remote, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Resolve a shadow path against the current page.
    async fn find_in_shadows(
        &mut self,
        request: &FindInShadowsRequest,
    ) -> Result<Vec<ElementRef>, BackendError>;
}
