mod config;
mod constants;
mod handlers;
mod state;

use actix_web::{web, App, HttpServer};
use config::ServerConfig;
use state::AppState;
use tracing::{error, info};

fn init_error(what: &str, e: anyhow::Error) -> std::io::Error {
    error!("Failed to initialize {}: {:#}", what, e);
    std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Failed to initialize {}: {:#}", what, e),
    )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Filter out actix-server worker shutdown messages
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info")
                    .add_directive("actix_server::worker=warn".parse().unwrap())
                    .add_directive("actix_server::accept=warn".parse().unwrap())
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting media store server (PID: {})", std::process::id());

    let config = ServerConfig::load()?;
    std::fs::create_dir_all(&config.data_dir)?;
    std::fs::create_dir_all(&config.scratch_dir)?;
    info!(
        data_dir = ?config.data_dir,
        scratch_dir = ?config.scratch_dir,
        blob_store = ?config.blob_store,
        catalog = ?config.catalog,
        "Configuration loaded"
    );

    let blobs = config
        .blob_backend()
        .initialize()
        .await
        .map_err(|e| init_error("blob store", e))?;
    let catalog = config
        .catalog_backend()
        .initialize()
        .await
        .map_err(|e| init_error("catalog", e))?;
    info!("Storage backends initialized successfully");

    let state = web::Data::new(AppState::new(blobs, catalog, config.scratch_dir.clone()));

    let bind_address = config.bind_address();
    info!("Starting server on http://{}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .map_err(|e| {
        error!("Failed to bind to {}: {}", bind_address, e);
        e
    })?;

    info!("Server bound successfully to http://{}", bind_address);
    server.run().await
}
