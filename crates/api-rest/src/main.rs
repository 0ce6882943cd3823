//! Expert Roster API server

use anyhow::{Context, Result};
use clap::Parser;
use expert_roster_api_rest::{create_app, ApiConfig};
use expert_roster_common::{init_tracing, AppConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "expert-roster-api")]
#[command(author, version, about = "Expert Roster REST API server")]
struct Cli {
    /// Address to bind (overrides config)
    #[arg(long, env = "API_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "API_PORT")]
    port: Option<u16>,

    /// PostgreSQL URL; the in-memory store is used when absent
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Skip pending migrations at startup
    #[arg(long)]
    skip_migrations: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Do not serve the Swagger UI
    #[arg(long)]
    no_swagger: bool,
}

impl Cli {
    fn apply(self, settings: &mut AppConfig, api: &mut ApiConfig) {
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if self.database_url.is_some() {
            settings.database.url = self.database_url;
        }
        if self.skip_migrations {
            settings.database.run_migrations = false;
        }
        if let Some(level) = self.log_level {
            settings.telemetry.log_level = level;
        }
        if self.json_logs {
            settings.telemetry.json_logging = true;
        }
        if self.no_swagger {
            api.enable_swagger = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = AppConfig::load()?;
    let mut api = ApiConfig::from_env()?;
    cli.apply(&mut settings, &mut api);
    settings.validate()?;
    let api = api.with_server(&settings);

    init_tracing(&settings.telemetry)?;

    let app = create_app(&settings, &api).await?;

    let address = api.server_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, swagger = api.enable_swagger, "Expert Roster API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
