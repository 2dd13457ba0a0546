#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for route risk analysis.
//!
//! Serves the REST API that fetches route alternatives between two
//! addresses, enriches them with recent crime data, and scores each one.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use safe_routes_analyzer::AnalysisContext;

/// Shared application state.
pub struct AppState {
    /// The analysis pipeline and its collaborators.
    pub ctx: AnalysisContext,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Configuring analysis pipeline...");
    let ctx = AnalysisContext::from_env().expect("Failed to configure analysis pipeline");

    let state = web::Data::new(AppState { ctx });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/analyze", web::get().to(handlers::analyze)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
