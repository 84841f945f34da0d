use super::insights::{extract_key_themes, validate_output_structure};
use crate::domain::{Analysis, AnalysisKind, DecisionRetrospective, ExtractionResult, KpiSnapshot};
use crate::infrastructure::extractor::ContentExtractor;
use crate::infrastructure::openai::{prompt, OpenAiClient};
use crate::infrastructure::security::InputSanitizer;
use playground_errors::AppError;

pub struct ProductThinking {
    extractor: ContentExtractor,
    llm: OpenAiClient,
    enable_web_scraping: bool,
}

impl ProductThinking {
    pub fn new(extractor: ContentExtractor, llm: OpenAiClient, enable_web_scraping: bool) -> Self {
        Self {
            extractor,
            llm,
            enable_web_scraping,
        }
    }

    pub async fn analyze_challenge(&self, context: &str) -> Result<Analysis, AppError> {
        InputSanitizer::validate_context(context)?;

        let text = self
            .llm
            .complete(prompt::CHALLENGE_SYSTEM_PROMPT, prompt::build_challenge_prompt(context))
            .await?;

        let sections = validate_output_structure(&text);
        let analysis = Analysis::new(AnalysisKind::Challenge, text)
            .with_themes(extract_key_themes(context))
            .with_sections(sections);

        let missing: Vec<&str> = analysis.missing_sections().collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "Challenge analysis is missing sections");
        }

        Ok(analysis)
    }

    pub async fn analyze_kpis(&self, snapshot: &KpiSnapshot) -> Result<Analysis, AppError> {
        if !snapshot.has_usage_data() {
            return Err(AppError::InvalidInput(
                "Please enter at least some KPI data".to_string(),
            ));
        }

        let text = self
            .llm
            .complete(prompt::KPI_SYSTEM_PROMPT, prompt::build_kpi_prompt(snapshot))
            .await?;

        Ok(Analysis::new(AnalysisKind::Kpi, text)
            .with_themes(extract_key_themes(&snapshot.recent_changes)))
    }

    // Extraction is best effort; without it the prompt uses the URL and context alone.
    pub async fn analyze_website(
        &self,
        raw_url: &str,
        context: Option<&str>,
    ) -> Result<Analysis, AppError> {
        let url = InputSanitizer::normalize_url(raw_url)?;

        let extraction = if self.enable_web_scraping {
            match self.extractor.extract(&url).await {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Proceeding without website context");
                    None
                }
            }
        } else {
            tracing::debug!(url = %url, "Web scraping disabled, skipping extraction");
            None
        };

        let text = self
            .llm
            .complete(
                prompt::WEBSITE_SYSTEM_PROMPT,
                prompt::build_website_prompt(&url, extraction.as_ref(), context),
            )
            .await?;

        let mut theme_source = context.unwrap_or_default().to_string();
        if let Some(result) = &extraction {
            theme_source.push('\n');
            theme_source.push_str(&result.main_content);
        }

        Ok(Analysis::new(AnalysisKind::Website, text)
            .with_themes(extract_key_themes(&theme_source))
            .with_website_context(extraction.is_some()))
    }

    pub async fn analyze_retrospective(
        &self,
        retro: &DecisionRetrospective,
    ) -> Result<Analysis, AppError> {
        for (field, value) in [
            ("decision", &retro.decision),
            ("expected outcome", &retro.expected),
            ("actual outcome", &retro.actual),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::InvalidInput(format!("Please describe the {}.", field)));
            }
        }

        let text = self
            .llm
            .complete(
                prompt::RETROSPECTIVE_SYSTEM_PROMPT,
                prompt::build_retrospective_prompt(retro),
            )
            .await?;

        let theme_source = format!("{}\n{}\n{}", retro.decision, retro.expected, retro.actual);
        Ok(Analysis::new(AnalysisKind::Retrospective, text)
            .with_themes(extract_key_themes(&theme_source)))
    }

    pub async fn extract(&self, raw_url: &str) -> Result<ExtractionResult, AppError> {
        let url = InputSanitizer::normalize_url(raw_url)?;
        self.extractor.extract(&url).await
    }
}
