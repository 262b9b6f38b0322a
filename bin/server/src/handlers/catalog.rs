use crate::handlers::error::pipeline_error;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Result as ActixResult};
use common::{CatalogFilesResponse, CatalogHashesResponse};

/// Active records with a playable media extension
#[get("/catalog/files")]
pub async fn list_files(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let files = state
        .vault
        .enumerate
        .list_files()
        .await
        .map_err(|e| pipeline_error("GET /catalog/files", e))?;
    Ok(HttpResponse::Ok().json(CatalogFilesResponse { files }))
}

/// Every active hash, unfiltered
#[get("/catalog/hashes")]
pub async fn list_hashes(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let hashes = state
        .vault
        .enumerate
        .list_hashes()
        .await
        .map_err(|e| pipeline_error("GET /catalog/hashes", e))?;
    Ok(HttpResponse::Ok().json(CatalogHashesResponse { hashes }))
}
