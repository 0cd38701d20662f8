use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobly_api::{config, state::AppState};

#[derive(Parser, Debug)]
#[command(name = "jobly-api")]
#[command(about = "Jobly job board API server")]
#[command(version)]
struct Args {
    /// Interface to bind
    #[arg(long, env = "JOBLY_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config::config();
    tracing::info!("Starting Jobly API in {:?} mode", config.environment);

    let state = AppState::from_config(config)?;
    let app = jobly_api::app(state);

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
