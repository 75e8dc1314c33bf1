use std::env;

use anyhow::Result;
use voyage_agents::ExtractorConfig;
use voyage_api::build_app;
use voyage_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("voyage_api");

    let bind = env::var("VOYAGE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let config = ExtractorConfig::from_env();

    let app = build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(
        bind = %bind,
        demo_mode = config.demo_mode,
        model = %config.model,
        "voyage extraction api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
