//! Audit log handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use tally_core::AuditEntry;

/// Query parameters for audit log
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    50
}

/// GET /api/audit - Most recent predictions (SQLite sink only)
pub async fn list_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let store = state
        .predictor
        .audit_store()
        .ok_or_else(|| AppError::not_found("Audit log is not queryable with this sink"))?;

    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let entries = store.list_recent(limit)?;

    Ok(Json(entries))
}
