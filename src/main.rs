use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};

use globetrotter_api::config::{AppConfig, StoreBackend};
use globetrotter_api::db::{self, DocumentStore, MemoryStore, MongoStore};
use globetrotter_api::routes;
use globetrotter_api::services::model_client::GroqClient;
use globetrotter_api::state::AppContext;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn open_store(backend: &StoreBackend) -> io::Result<Arc<dyn DocumentStore>> {
    match backend {
        StoreBackend::Mongo { uri, database } => {
            let client = db::mongo::create_mongo_client(uri)
                .await
                .map_err(|e| startup_error("Failed to configure MongoDB client", e))?;
            let store = MongoStore::new(client, database.clone());
            // Like the ping, an unreachable server at boot is not fatal.
            if let Err(e) = store.ensure_indexes().await {
                warn!("Failed to ensure MongoDB indexes: {}", e);
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;
    if config.model.api_key.is_none() {
        warn!("GROQ_API_KEY is not set; AI planning and chat will fail until it is configured");
    }

    let store = open_store(&config.store).await?;
    let client = GroqClient::new(&config.model)
        .map_err(|e| startup_error("Failed to build model client", e))?;

    let (host, port) = config.bind_address();
    info!(
        "Starting HTTP server on {}:{} (store: {}, model: {})",
        host,
        port,
        store.backend_name(),
        config.model.sampling.model
    );

    let context = web::Data::new(AppContext::new(config, store, Arc::new(client)));

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(context.clone())
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
