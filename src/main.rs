//! Entry point for the Pajak Engine binary.
//!
//! Running this binary starts an HTTP server that exposes the tax
//! engine.  Settings come from an optional `config/pajak.toml` and from
//! `PAJAK_*` environment variables; a `.env` file is loaded first.

use pajak_engine::{api, config::ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    api::serve(&config).await
}
