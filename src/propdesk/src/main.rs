use anyhow::Context;
use clap::Parser;
use propdesk::{Config, Service, api, patterns};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("propdesk=info,entity_core=info,tower_http=info")),
        )
        .init();

    let config = Config::parse();

    patterns::audit().context("access pattern table does not match entity keys")?;

    let store = config.build_store().await?;
    let mut service = Service::new(store);
    if let Some(page_size) = config.page_size {
        service = service.with_page_size(page_size);
    }

    let app = api::router(service);
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    info!(listen = %config.listen, store = ?config.store, "propdesk listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
