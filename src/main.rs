use std::sync::Arc;
use chrono::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use newsscript::{
    api::routes::create_router,
    cache::{SystemClock, TtlCache},
    config::Config,
    llm::GeminiClient,
    service::NewsService,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(%server_addr, model = %config.gemini_model, ttl_secs = config.cache_ttl_secs, "starting newsscript");

    let provider = Arc::new(GeminiClient::new(
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
    ));
    let cache = Arc::new(TtlCache::new(
        Duration::seconds(config.cache_ttl_secs),
        Arc::new(SystemClock),
    ));
    let news = NewsService::new(
        provider,
        cache,
        config.api_key.clone(),
        config.source_attribution,
    );

    // Create application state
    let app_state = AppState {
        config: Arc::new(config),
        news: Arc::new(news),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!(%server_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
