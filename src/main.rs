use tracing_subscriber::EnvFilter;

use clinica_api::api::server::start_server;
use clinica_api::api::ApiContext;
use clinica_api::config::Config;
use clinica_api::db::sqlite::open_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let conn = open_database(&config.database_path)?;
    let bind_addr = config.bind_addr;
    let ctx = ApiContext::new(conn, config);

    let handle = start_server(ctx, bind_addr).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    handle.shutdown().await;

    Ok(())
}
