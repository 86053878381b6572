#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the shelter dashboard.
//!
//! Serves the assembled dashboard views as JSON for a browser front end.
//! Every request reads through the shared [`Dashboard`], so concurrent
//! requests for a cold snapshot trigger a single fetch.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use shelter_stats_dashboard::Dashboard;

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/dashboard", web::get().to(handlers::dashboard_view))
            .route("/refresh", web::post().to(handlers::refresh)),
    );
}

/// Starts the API server for `dashboard`.
///
/// Binds to `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`).
/// The snapshot is fetched once before binding; a failure there is logged
/// and retried on the first request. The caller provides the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(dashboard: Dashboard) -> std::io::Result<()> {
    log::info!("Loading initial snapshot...");
    match dashboard.snapshot().await {
        Ok(snapshot) => log::info!("Serving {} records", snapshot.len()),
        Err(e) => log::warn!("Initial snapshot load failed: {e}"),
    }

    let state = web::Data::new(dashboard);

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
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
