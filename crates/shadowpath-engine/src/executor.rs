//! Runs shadow searches against a backend, polling until elements appear.
//!
//! Custom elements attach their shadow roots when they upgrade, which can be
//! well after navigation finishes. A single resolution stays fail-fast; the
//! executor simply repeats whole resolutions until one yields elements or the
//! timeout expires.

use std::time::Duration;

use shadowpath_common::ResolveError;
use shadowpath_common::protocol::{ElementRef, FindInShadowsRequest};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::backend::{Backend, BackendError, NavigationResult};
use crate::config::QueryConfig;

pub struct QueryExecutor {
    config: QueryConfig,
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl QueryExecutor {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Navigate and wait for the configured settle time.
    pub async fn open<B>(&self, backend: &mut B, url: &str) -> Result<NavigationResult, BackendError>
    where
        B: Backend + ?Sized,
    {
        let result = backend.navigate(url).await?;
        info!("Opened {} ({})", result.url, result.title);
        if self.config.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
        }
        Ok(result)
    }

    /// Resolve `request`, retrying while the result is empty or a host has
    /// no shadow root yet. Other errors are returned immediately.
    pub async fn find<B>(
        &self,
        backend: &mut B,
        request: &FindInShadowsRequest,
    ) -> Result<Vec<ElementRef>, BackendError>
    where
        B: Backend + ?Sized,
    {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let poll = Duration::from_millis(self.config.poll_interval_ms.max(1));
        let deadline = Instant::now() + timeout;
        let mut attempt = 1u32;

        loop {
            let outcome = match backend.find_in_shadows(request).await {
                Ok(found) if !found.is_empty() => return Ok(found),
                Ok(found) => Ok(found),
                Err(BackendError::Resolve(err @ ResolveError::InaccessibleShadowRoot { .. })) => {
                    Err(BackendError::Resolve(err))
                }
                Err(err) => return Err(err),
            };

            if Instant::now() + poll > deadline {
                return outcome;
            }
            debug!(
                "Attempt {} for '{}' found nothing, retrying in {:?}",
                attempt, request.target, poll
            );
            attempt += 1;
            tokio::time::sleep(poll).await;
        }
    }
}
