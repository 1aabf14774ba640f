use anyhow::Context;

use gift_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    gift_observability::init(config.log_format);

    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL not set; products are kept in memory and lost on restart");
    }

    let app = gift_api::app::build_app_from_config(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
