//! HTTP handler functions for the shelter stats API.

use actix_web::{HttpResponse, web};
use shelter_stats_dashboard::Dashboard;
use shelter_stats_server_models::{ApiError, ApiHealth, ApiSnapshotInfo, DashboardQueryParams};
use shelter_stats_snapshot::SnapshotError;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/categories`
///
/// Returns the distinct animal types in order of first appearance.
pub async fn categories(dashboard: web::Data<Dashboard>) -> HttpResponse {
    match dashboard.category_options().await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => fetch_failed(&e),
    }
}

/// `GET /api/dashboard`
///
/// Returns every view for the selection in `types`.
pub async fn dashboard_view(
    dashboard: web::Data<Dashboard>,
    params: web::Query<DashboardQueryParams>,
) -> HttpResponse {
    match dashboard.assemble(&params.selection()).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => fetch_failed(&e),
    }
}

/// `POST /api/refresh`
///
/// Re-fetches the snapshot and returns its metadata.
pub async fn refresh(dashboard: web::Data<Dashboard>) -> HttpResponse {
    match dashboard.refresh().await {
        Ok(snapshot) => HttpResponse::Ok().json(ApiSnapshotInfo::from(snapshot.as_ref())),
        Err(e) => fetch_failed(&e),
    }
}

fn fetch_failed(e: &SnapshotError) -> HttpResponse {
    log::error!("Failed to load snapshot: {e}");
    HttpResponse::BadGateway().json(ApiError {
        error: e.to_string(),
    })
}
