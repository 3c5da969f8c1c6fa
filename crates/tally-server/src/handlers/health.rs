//! Health and model metadata handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use tally_core::{ExtractionMethod, TextClassifier};

/// One loaded classifier
#[derive(Serialize)]
pub struct ClassifierInfo {
    pub role: String,
    pub model: String,
    pub labels: usize,
}

/// Response for GET /api/health
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub classifiers: Vec<ClassifierInfo>,
    pub extraction: Vec<ExtractionMethod>,
    pub audit_queryable: bool,
}

/// GET /api/health - Liveness and loaded models
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let predictor = &state.predictor;
    let classifiers = predictor
        .classifiers()
        .iter()
        .map(|c| ClassifierInfo {
            role: c.role.clone(),
            model: c.classifier.name().to_string(),
            labels: c.classifier.labels().len(),
        })
        .collect();

    Json(HealthResponse {
        status: "ok",
        classifiers,
        extraction: predictor.extraction_methods(),
        audit_queryable: predictor.audit_store().is_some(),
    })
}

/// GET /api/labels - Label set per classifier role
pub async fn list_labels(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, Vec<String>>> {
    let labels = state
        .predictor
        .classifiers()
        .iter()
        .map(|c| (c.role.clone(), c.classifier.labels().to_vec()))
        .collect();
    Json(labels)
}
