use anyhow::Context;

use tradenet_infra::{AppConfig, Backends};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tradenet_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let backends = Backends::connect(&config)
        .await
        .context("failed to initialize storage")?;

    let app = tradenet_api::app::build_app(config.jwt_secret.clone(), backends);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
