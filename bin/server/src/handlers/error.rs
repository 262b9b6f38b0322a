use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use common::ErrorResponse;
use pipeline::PipelineError;
use tracing::{error, warn};

fn json_error<E>(status: StatusCode, e: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = ErrorResponse {
        error: e.to_string(),
    };
    InternalError::from_response(e, HttpResponse::build(status).json(body)).into()
}

/// Map a pipeline failure onto an HTTP status with a JSON error body
pub fn pipeline_error(route: &str, e: PipelineError) -> actix_web::Error {
    let status = match &e {
        PipelineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
        PipelineError::Transport(_) => StatusCode::BAD_REQUEST,
        PipelineError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("{} - {}", route, e);
    } else {
        warn!("{} - {}", route, e);
    }
    json_error(status, e)
}
