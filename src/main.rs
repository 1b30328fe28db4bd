use reply_assistant::{config, gemini::GeminiClient, service::ReplyService};
use tracing_subscriber::EnvFilter;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load config
    let cfg = config::load_config().expect("failed to locate or load config");
    tracing::info!("Successfully loaded reply assistant config");

    tracing::info!(
        "Configured Gemini endpoint: {} (model '{}')",
        cfg.gemini.api_base,
        cfg.gemini.model
    );
    if cfg.gemini.api_key().is_none() {
        tracing::warn!("GEMINI_API_KEY is not set, reply requests will fail until it is provided");
    }

    // Setup service
    let client = GeminiClient::new(cfg.gemini.clone());
    let service = Arc::new(ReplyService::new(Arc::new(client)));

    // Setup router
    let router = reply_assistant::router(service);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .expect("Failed to bind to address");
    let addr = listener
        .local_addr()
        .expect("Failed to read listener address");

    tracing::info!("Reply assistant starting, listening on {}", addr);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
