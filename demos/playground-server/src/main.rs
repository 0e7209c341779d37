use std::env;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use playground_kit::PlaygroundConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = PlaygroundConfig::from_env().context("invalid playground configuration")?;
    let app = playground_server::app(config.clone())
        .await
        .context("failed to assemble the playground")?
        .layer(TraceLayer::new_for_http());

    let port = env::var("PORT").unwrap_or_else(|_| "3030".to_string());
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let address = format!("{host}:{port}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!("server running at http://{address}");
    info!("service discovery at http://{address}{}", config.mount_path);
    info!("playground UI at http://{address}{}", config.ui_path);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
