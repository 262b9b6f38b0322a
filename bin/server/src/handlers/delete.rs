use crate::handlers::error::pipeline_error;
use crate::state::AppState;
use actix_web::{delete, web, HttpResponse, Result as ActixResult};
use common::DeleteResponse;
use tracing::info;

/// Remove a blob and tombstone its record. Unknown hashes succeed.
#[delete("/files/{hash}")]
pub async fn delete_file(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let hash = path.into_inner();

    state
        .vault
        .delete
        .delete(&hash)
        .await
        .map_err(|e| pipeline_error("DELETE /files", e))?;

    info!(hash = ?hash, "DELETE /files - Deleted");
    Ok(HttpResponse::Ok().json(DeleteResponse { success: true }))
}
