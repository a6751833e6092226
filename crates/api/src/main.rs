use std::sync::Arc;

use anyhow::Context;

use fixit_api::app::{build_app, services::build_services};
use fixit_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fixit_observability::init();

    let config = AppConfig::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "invalid configuration"))
        .context("loading configuration")?;

    let services = build_services(&config)
        .await
        .context("initializing stores")?;

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
