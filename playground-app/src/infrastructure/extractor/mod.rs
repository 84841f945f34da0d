#[cfg(feature = "headless")]
mod chrome;
mod page;
mod probes;
mod renderer;
mod static_page;
mod vocabulary;

#[cfg(feature = "headless")]
pub use chrome::{ChromePage, ChromeRenderer};
pub use page::{PageView, ProbeError};
pub use probes::harvest;
pub use renderer::{wait_for_idle, CancelFlag, HttpRenderer, IdleSnapshot, RenderError, Renderer};
pub use static_page::StaticPage;

use crate::config::{ExtractorBackend, ExtractorConfig};
use crate::domain::ExtractionResult;
use playground_errors::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Dropping the future returned by `extract` cancels the work and closes the page.
#[derive(Clone)]
pub struct ContentExtractor {
    renderer: Arc<dyn Renderer>,
    config: ExtractorConfig,
}

impl ContentExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let renderer: Arc<dyn Renderer> = match config.backend {
            #[cfg(feature = "headless")]
            ExtractorBackend::Chrome => Arc::new(ChromeRenderer),
            #[cfg(not(feature = "headless"))]
            ExtractorBackend::Chrome => {
                tracing::warn!("Built without headless support, falling back to HTTP extraction");
                Arc::new(HttpRenderer)
            }
            ExtractorBackend::Http => Arc::new(HttpRenderer),
        };
        Self { renderer, config }
    }

    pub fn with_renderer(renderer: Arc<dyn Renderer>, config: ExtractorConfig) -> Self {
        Self { renderer, config }
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractionResult, AppError> {
        let started = Instant::now();
        tracing::info!(url, "Starting content extraction");

        let cancel = CancelFlag::new();
        let _cancel_on_drop = cancel.guard();

        let renderer = Arc::clone(&self.renderer);
        let config = self.config.clone();
        let target = url.to_string();

        let outcome = tokio::task::spawn_blocking(move || {
            let page = renderer.open(&target, &config, &cancel)?;
            Ok::<_, RenderError>(harvest(page.as_ref(), &target, &config.limits, &cancel))
        })
        .await
        .unwrap_or_else(|e| Err(RenderError::Crashed(e.to_string())));

        match outcome {
            Ok(result) => {
                tracing::info!(
                    url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Content extraction finished"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(
                    url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Content extraction failed"
                );
                Err(AppError::ExtractionFailed(e.to_string()))
            }
        }
    }
}
