use std::sync::Arc;

use anyhow::Result;
use classifier::OpenAiClient;
use common::Config;
use hacker_news::HackerNewsAPI;
use server::{create_app, AppState, SERVICE_TITLE};
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    let _ = dotenv::dotenv();

    // Configure tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    info!("{} starting up", SERVICE_TITLE);

    if config.require_openai_api_key().is_err() {
        warn!("OPENAI_API_KEY not set; classification requests will fail");
    }

    let source = Arc::new(HackerNewsAPI::new(&config.hacker_news)?);
    let client = Arc::new(OpenAiClient::new(&config.openai));
    let app = create_app(AppState::new(source, client, config.openai.temperature));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received interrupt signal, shutting down...");
}
