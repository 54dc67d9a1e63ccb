mod config;
mod error;
mod media;
mod routes;
mod scoring;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use config::{ScoringConfig, ServerConfig};
use routes::configure_routes;
use scoring::{Scorer, TorchClassifier};
use std::env;
use std::path::Path;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let server_config = ServerConfig::from_env().map_err(|e| {
        log::error!("Invalid server configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let scoring_config = ScoringConfig::load().map_err(|e| {
        log::error!("Invalid scoring configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    match scoring_config.entropy_normalizer {
        Some(normalizer) => log::info!("Normalising entropy by fixed constant {}", normalizer),
        None => log::info!("Normalising entropy by ln(class count)"),
    }

    let classifier =
        TorchClassifier::load(&scoring_config.model_path, scoring_config.input_size).map_err(
            |e| {
                log::error!("Failed to load model at startup: {}", e);
                std::io::Error::other(format!("Model loading failed: {}", e))
            },
        )?;
    let scorer = Scorer::new(Arc::new(classifier), scoring_config);

    let frontend_dir = if Path::new(&server_config.frontend_dir).is_dir() {
        log::info!("Serving frontend from {}", server_config.frontend_dir);
        Some(server_config.frontend_dir.clone())
    } else {
        log::warn!(
            "Frontend directory {} not found, serving API only",
            server_config.frontend_dir
        );
        None
    };

    let bind_address = server_config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(scorer.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
