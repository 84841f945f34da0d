use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::Json;
use playground_app::domain::{Analysis, DecisionRetrospective, ExtractionResult, KpiSnapshot};
use playground_app::AppContext;
use playground_errors::AppError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Deserialize)]
pub struct ChallengeRequest {
    pub context: String,
}

#[derive(Deserialize)]
pub struct WebsiteRequest {
    pub url: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    remaining_requests: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    success: bool,
    analysis: String,
    themes: Vec<String>,
    missing_sections: Vec<String>,
    website_context_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kpi_data: Option<KpiSnapshot>,
    timestamp: String,
}

impl AnalysisResponse {
    fn new(analysis: Analysis) -> Self {
        Self {
            success: true,
            missing_sections: analysis.missing_sections().map(str::to_string).collect(),
            themes: analysis.themes,
            website_context_used: analysis.website_context_used,
            analysis: analysis.text,
            kpi_data: None,
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    fn with_kpi_data(mut self, snapshot: KpiSnapshot) -> Self {
        self.kpi_data = Some(snapshot);
        self
    }
}

pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        remaining_requests: ctx.cost_tracker.remaining_requests(),
    })
}

pub async fn analyze_challenge(
    State(ctx): State<AppContext>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<ChallengeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request = body(payload)?;
    admit(&ctx, addr, true)?;

    let analysis = ctx
        .product_thinking
        .analyze_challenge(&request.context)
        .await?;
    Ok(Json(AnalysisResponse::new(analysis)))
}

pub async fn analyze_kpi(
    State(ctx): State<AppContext>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<KpiSnapshot>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let snapshot = body(payload)?;
    admit(&ctx, addr, true)?;

    let analysis = ctx.product_thinking.analyze_kpis(&snapshot).await?;
    Ok(Json(AnalysisResponse::new(analysis).with_kpi_data(snapshot)))
}

pub async fn analyze_website(
    State(ctx): State<AppContext>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<WebsiteRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request = body(payload)?;
    admit(&ctx, addr, true)?;

    let analysis = ctx
        .product_thinking
        .analyze_website(&request.url, request.context.as_deref())
        .await?;
    Ok(Json(AnalysisResponse::new(analysis)))
}

pub async fn analyze_retrospective(
    State(ctx): State<AppContext>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<DecisionRetrospective>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let retro = body(payload)?;
    admit(&ctx, addr, true)?;

    let analysis = ctx.product_thinking.analyze_retrospective(&retro).await?;
    Ok(Json(AnalysisResponse::new(analysis)))
}

/// Raw extractor access for operators and integrations. Unlike the analysis
/// routes, an extraction failure is reported to the caller as a 502.
pub async fn extract(
    State(ctx): State<AppContext>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>, AppError> {
    let request = body(payload)?;
    admit(&ctx, addr, false)?;

    let result = ctx.product_thinking.extract(&request.url).await?;
    Ok(Json(result))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// Applies the per-client rate limit and, for model-backed routes, the daily budget.
fn admit(ctx: &AppContext, addr: SocketAddr, uses_llm: bool) -> Result<(), AppError> {
    if let Err(e) = ctx.rate_limiter.check_rate_limit(addr.ip()) {
        tracing::warn!(client = %addr.ip(), "Rate limit hit");
        return Err(e.into());
    }

    if uses_llm {
        ctx.cost_tracker.check_and_increment()?;
    }

    Ok(())
}
