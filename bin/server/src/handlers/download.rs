use crate::handlers::error::pipeline_error;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Result as ActixResult};
use storage::BLOB_CONTENT_TYPE;
use tracing::info;

/// Stream a blob in fixed-size chunks. A missing blob is a 404 before any body bytes.
#[get("/download/{hash}")]
pub async fn download(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let hash = path.into_inner();
    info!(hash = ?hash, "GET /download - Request received");

    let chunks = state
        .vault
        .retrieve
        .open(&hash)
        .await
        .map_err(|e| pipeline_error("GET /download", e))?;

    Ok(HttpResponse::Ok()
        .content_type(BLOB_CONTENT_TYPE)
        .streaming(chunks))
}
