use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::scoring::AnswerValue;
use super::service::{DiagnosisError, DiagnosisService};
use crate::workflows::clients::ClientId;
use crate::workflows::health::HealthSnapshot;

/// Router builder exposing the survey flow and the health dashboard.
pub fn diagnosis_router(service: Arc<DiagnosisService>) -> Router {
    Router::new()
        .route("/api/v1/diagnosis/start", post(start_handler))
        .route("/api/v1/diagnosis/questions", get(questions_handler))
        .route("/api/v1/diagnosis/answer", post(answer_handler))
        .route("/api/v1/diagnosis/complete", post(complete_handler))
        .route("/api/v1/clients/:client_id/health", get(dashboard_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartRequest {
    pub(crate) client_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerRequest {
    pub(crate) diagnosis_id: String,
    pub(crate) question_id: String,
    pub(crate) answer: AnswerValue,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteRequest {
    pub(crate) diagnosis_id: String,
}

/// Flatten a snapshot into the dashboard shape: one field per axis plus the
/// overall score.
pub(crate) fn snapshot_payload(snapshot: &HealthSnapshot) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (axis, score) in &snapshot.axes {
        map.insert(axis.field_name().to_string(), json!(score));
    }
    map.insert("overall_score".to_string(), json!(snapshot.overall));
    serde_json::Value::Object(map)
}

fn error_response(error: DiagnosisError) -> Response {
    let status = match &error {
        DiagnosisError::ClientNotFound(_) => StatusCode::NOT_FOUND,
        DiagnosisError::Directory(_) | DiagnosisError::Health(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}

pub(crate) async fn start_handler(
    State(service): State<Arc<DiagnosisService>>,
    axum::Json(request): axum::Json<StartRequest>,
) -> Response {
    let client = ClientId(request.client_id);
    match service.start(&client) {
        Ok(diagnosis_id) => (
            StatusCode::OK,
            axum::Json(json!({ "diagnosis_id": diagnosis_id })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn questions_handler(
    State(service): State<Arc<DiagnosisService>>,
) -> Response {
    (
        StatusCode::OK,
        axum::Json(json!({ "questions": service.battery().questions() })),
    )
        .into_response()
}

pub(crate) async fn answer_handler(
    State(service): State<Arc<DiagnosisService>>,
    axum::Json(request): axum::Json<AnswerRequest>,
) -> Response {
    let client = ClientId(request.diagnosis_id);
    service.record_answer(&client, request.question_id.clone(), request.answer);
    (
        StatusCode::OK,
        axum::Json(json!({ "saved": true, "question_id": request.question_id })),
    )
        .into_response()
}

pub(crate) async fn complete_handler(
    State(service): State<Arc<DiagnosisService>>,
    axum::Json(request): axum::Json<CompleteRequest>,
) -> Response {
    let client = ClientId(request.diagnosis_id);
    match service.complete(&client) {
        Ok(snapshot) => {
            let payload = json!({
                "diagnosis_id": client,
                "scores": snapshot_payload(&snapshot),
                "message": "Diagnosis complete.",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dashboard_handler(
    State(service): State<Arc<DiagnosisService>>,
    Path(client_id): Path<String>,
) -> Response {
    let client = ClientId(client_id);
    match service.dashboard(&client) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot_payload(&snapshot))).into_response(),
        Err(error) => error_response(error),
    }
}
