use anyhow::Context;
use capgains::{api, config::Config};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let addr = SocketAddr::new(config.bind_addr, config.port);

    let app = api::create_router(api::AppState::new(config.clone()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(
        result_ttl_secs = config.result_ttl.as_secs(),
        max_upload_bytes = config.max_upload_bytes,
        "Server listening on {}",
        addr
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
