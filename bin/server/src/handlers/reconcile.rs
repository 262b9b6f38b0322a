use crate::handlers::error::pipeline_error;
use crate::state::AppState;
use actix_web::{post, web, HttpResponse, Result as ActixResult};
use common::ReconcileRequest;
use pipeline::ReconcileMode;
use tracing::info;

/// Operator-triggered consistency check, report-only unless `repair` is set
#[post("/admin/reconcile")]
pub async fn reconcile(
    req: web::Json<ReconcileRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let ReconcileRequest { repair, pass } = req.into_inner();
    info!(repair, pass = ?pass, "POST /admin/reconcile - Request received");

    let response = state
        .vault
        .reconcile
        .run(ReconcileMode::from_repair_flag(repair), pass)
        .await
        .map_err(|e| pipeline_error("POST /admin/reconcile", e))?;

    Ok(HttpResponse::Ok().json(response))
}
