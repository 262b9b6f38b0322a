use crate::handlers::error::pipeline_error;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Result as ActixResult};
use async_stream::try_stream;
use common::{TrackMetadata, UploadResponse, CHUNK_PART, METADATA_PART};
use futures_util::{Stream, TryStreamExt};
use pipeline::{PipelineError, UploadFrame};
use tracing::{info, warn};

/// Streaming upload (multipart/form-data).
///
/// Parts named `metadata` carry JSON track metadata; parts named `chunk` carry
/// payload bytes. Parts may come in any order and chunk bodies are appended in
/// arrival order; other parts are skipped. Nothing is stored unless the whole
/// request body is read.
#[post("/upload")]
pub async fn upload(payload: Multipart, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let hash = state
        .vault
        .ingest
        .ingest(upload_frames(payload))
        .await
        .map_err(|e| pipeline_error("POST /upload", e))?;

    info!(hash = %hash, "POST /upload - File stored");
    Ok(HttpResponse::Ok().json(UploadResponse { hash }))
}

/// Turn multipart fields into upload frames, one frame per metadata part and
/// one per body piece of each chunk part
fn upload_frames(mut payload: Multipart) -> impl Stream<Item = pipeline::Result<UploadFrame>> {
    try_stream! {
        while let Some(mut field) = payload.try_next().await.map_err(PipelineError::transport)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                METADATA_PART => {
                    let mut raw = Vec::new();
                    while let Some(bytes) = field.try_next().await.map_err(PipelineError::transport)? {
                        raw.extend_from_slice(&bytes);
                    }
                    let metadata: TrackMetadata = serde_json::from_slice(&raw).map_err(|e| {
                        PipelineError::InvalidArgument(format!("Invalid metadata part: {}", e))
                    })?;
                    info!(
                        filename = ?metadata.filename,
                        title = ?metadata.title,
                        "POST /upload - Metadata received"
                    );
                    yield UploadFrame::Metadata(metadata);
                }
                CHUNK_PART => {
                    while let Some(bytes) = field.try_next().await.map_err(PipelineError::transport)? {
                        yield UploadFrame::Chunk(bytes);
                    }
                }
                other => {
                    warn!(part = ?other, "POST /upload - Ignoring unknown multipart part");
                    while field.try_next().await.map_err(PipelineError::transport)?.is_some() {}
                }
            }
        }
    }
}
