use crate::application::ProductThinking;
use crate::config::AppConfig;
use crate::infrastructure::extractor::{ContentExtractor, Renderer};
use crate::infrastructure::openai::OpenAiClient;
use crate::infrastructure::security::{CostTracker, RateLimiter};
use playground_errors::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub product_thinking: Arc<ProductThinking>,
    pub rate_limiter: RateLimiter,
    pub cost_tracker: Arc<CostTracker>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let extractor = ContentExtractor::new(config.extractor.clone());
        Self::assemble(config, extractor)
    }

    /// Same as [`AppContext::new`] but renders pages with `renderer`.
    pub fn with_renderer(config: AppConfig, renderer: Arc<dyn Renderer>) -> Result<Self, AppError> {
        let extractor = ContentExtractor::with_renderer(renderer, config.extractor.clone());
        Self::assemble(config, extractor)
    }

    fn assemble(config: AppConfig, extractor: ContentExtractor) -> Result<Self, AppError> {
        let llm = OpenAiClient::new(config.openai)?;
        Ok(Self {
            product_thinking: Arc::new(ProductThinking::new(
                extractor,
                llm,
                config.enable_web_scraping,
            )),
            rate_limiter: RateLimiter::new(),
            cost_tracker: Arc::new(CostTracker::new()),
        })
    }
}
