//! Health check endpoint.

use actix_web::{HttpResponse, web};

use quill_shared::dto::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - reports server and store status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store = state.store_name();

    match state.ping_store().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ok".to_string(),
            service: "quill-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: store.to_string(),
        }),
        Err(e) => {
            tracing::error!(store, "Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "unavailable".to_string(),
                service: "quill-api".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                store: store.to_string(),
            })
        }
    }
}
