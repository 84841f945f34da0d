use playground_app::{AppConfig, AppContext};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let addr = config.bind_addr.clone();
    tracing::info!(
        model = %config.openai.model,
        backend = ?config.extractor.backend,
        scraping = config.enable_web_scraping,
        "Loaded configuration"
    );
    let app_context = AppContext::new(config)?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        "Security: Rate limit 5/min, 20/hour. Daily limit: {} requests",
        app_context.cost_tracker.remaining_requests()
    );

    let app = playground_api::router(app_context);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
