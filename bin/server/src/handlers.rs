//! HTTP request handlers

pub mod catalog;
pub mod delete;
pub mod download;
pub mod error;
pub mod reconcile;
pub mod upload;

use actix_web::{get, web, HttpResponse, Result as ActixResult};
use common::HealthResponse;

/// Register every route on an app or test service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload::upload)
        .service(download::download)
        .service(delete::delete_file)
        .service(catalog::list_files)
        .service(catalog::list_hashes)
        .service(reconcile::reconcile)
        .service(health);
}

/// Liveness probe polled by the e2e harness before it starts
#[get("/health")]
async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    }))
}
