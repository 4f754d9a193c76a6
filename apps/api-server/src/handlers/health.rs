//! Liveness endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// Push-channel sessions currently connected.
    pub sessions: usize,
}

/// GET /api/health
///
/// Reports liveness plus how many browser sessions are listening on the
/// push channel.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        sessions: state.updates.receiver_count(),
    })
}
