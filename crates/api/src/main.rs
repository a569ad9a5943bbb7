use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use stockroom_api::settings::Settings;

/// Multi-warehouse inventory HTTP API.
#[derive(Debug, Parser)]
#[command(name = "stockroom-api", version)]
struct Cli {
    /// Directory holding default.toml and the optional overrides.
    #[arg(long, default_value = "config")]
    config: PathBuf,

    /// Listen address; overrides `server.bind`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)
        .with_context(|| format!("failed to load settings from {}", cli.config.display()))?;
    if let Some(bind) = cli.bind {
        settings.server.bind = bind;
    }

    stockroom_observability::init(&settings.log);

    if settings.auth.jwt_secret == "dev-secret" {
        tracing::warn!("auth.jwt_secret is the insecure dev default");
    }

    let app = stockroom_api::app::build_app(&settings)
        .await
        .context("failed to build application")?;

    let listener = tokio::net::TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
