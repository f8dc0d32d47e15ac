use crate::cdp::CdpClient;
use crate::tree::CdpTree;
use async_trait::async_trait;
use shadowpath_common::protocol::{ElementRef, FindInShadowsRequest};
use shadowpath_common::resolver::execute_request;
use shadowpath_engine::backend::{Backend, BackendError, NavigationResult};
use shadowpath_engine::config::BrowserConfig;
use tracing::info;

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    settings: BrowserConfig,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::with_settings(BrowserConfig::default())
    }

    pub fn with_settings(settings: BrowserConfig) -> Self {
        Self {
            client: None,
            settings,
        }
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    async fn get_navigation_result(
        page: &chromiumoxide::Page,
    ) -> Result<NavigationResult, BackendError> {
        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching Headless Backend (Chromium)...");
        let client = CdpClient::launch(&self.settings)
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client.as_mut().ok_or(BackendError::NotReady)?;

        info!("Navigating to: {}", url);
        client
            .page
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        Self::get_navigation_result(&client.page).await
    }

    async fn find_in_shadows(
        &mut self,
        request: &FindInShadowsRequest,
    ) -> Result<Vec<ElementRef>, BackendError> {
        let client = self.client.as_ref().ok_or(BackendError::NotReady)?;

        // Fresh snapshot per call: node ids from an older one may be stale.
        let tree = CdpTree::snapshot(&client.page).await?;
        Ok(execute_request(&tree, request).await?)
    }
}
