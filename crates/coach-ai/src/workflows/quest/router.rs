use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::QuestId;
use super::service::{QuestService, QuestServiceError, SequenceOutcome, StatusFilter};
use crate::workflows::clients::ClientId;

/// Router builder exposing the quest progression endpoints.
pub fn quest_router(service: Arc<QuestService>) -> Router {
    Router::new()
        .route("/api/v1/clients/:client_id/quests", get(list_handler))
        .route("/api/v1/clients/:client_id/quests/init", post(init_handler))
        .route(
            "/api/v1/clients/:client_id/quests/current",
            get(current_handler),
        )
        .route(
            "/api/v1/quests/:quest_id/checklist",
            post(generate_handler),
        )
        .route("/api/v1/quests/:quest_id/evaluate", post(evaluate_handler))
        .route("/api/v1/quests/:quest_id/complete", post(complete_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    pub(crate) checked_indices: Vec<usize>,
}

fn error_response(error: QuestServiceError) -> Response {
    let status = match &error {
        QuestServiceError::ClientNotFound(_) | QuestServiceError::QuestNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        QuestServiceError::Locked(_) => StatusCode::FORBIDDEN,
        QuestServiceError::NotReady(_) => StatusCode::BAD_REQUEST,
        QuestServiceError::Oracle(_) => StatusCode::SERVICE_UNAVAILABLE,
        QuestServiceError::Repository(super::repository::RepositoryError::Conflict) => {
            StatusCode::CONFLICT
        }
        QuestServiceError::Repository(_)
        | QuestServiceError::Directory(_)
        | QuestServiceError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}

fn join_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({ "error": "background task failed" })),
    )
        .into_response()
}

pub(crate) async fn init_handler(
    State(service): State<Arc<QuestService>>,
    Path(client_id): Path<String>,
) -> Response {
    let client = ClientId(client_id);
    match service.initialize(&client) {
        Ok(SequenceOutcome::Created(count)) => (
            StatusCode::CREATED,
            axum::Json(json!({ "message": "Initialization success", "count": count })),
        )
            .into_response(),
        Ok(SequenceOutcome::AlreadyInitialized) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "Quests already initialized" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler(
    State(service): State<Arc<QuestService>>,
    Path(client_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let client = ClientId(client_id);
    let filter = query.status.as_deref().and_then(StatusFilter::from_query);
    match service.list(&client, filter) {
        Ok(quests) => {
            let views: Vec<_> = quests.iter().map(|quest| quest.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn current_handler(
    State(service): State<Arc<QuestService>>,
    Path(client_id): Path<String>,
) -> Response {
    let client = ClientId(client_id);
    match service.current(&client) {
        Ok(Some(quest)) => (StatusCode::OK, axum::Json(quest.view())).into_response(),
        Ok(None) => (
            StatusCode::OK,
            axum::Json(json!({ "quest": serde_json::Value::Null })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

// Oracle round-trips run on the blocking pool so one slow generation never
// stalls other clients' requests.

pub(crate) async fn generate_handler(
    State(service): State<Arc<QuestService>>,
    Path(quest_id): Path<String>,
) -> Response {
    let id = QuestId(quest_id);
    let result =
        tokio::task::spawn_blocking(move || service.generate_checklist(&id)).await;
    match result {
        Ok(Ok(checklist)) => (StatusCode::OK, axum::Json(checklist)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(_) => join_error_response(),
    }
}

pub(crate) async fn evaluate_handler(
    State(service): State<Arc<QuestService>>,
    Path(quest_id): Path<String>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response {
    let id = QuestId(quest_id);
    let result =
        tokio::task::spawn_blocking(move || service.evaluate(&id, request.checked_indices)).await;
    match result {
        Ok(Ok(evaluation)) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(_) => join_error_response(),
    }
}

pub(crate) async fn complete_handler(
    State(service): State<Arc<QuestService>>,
    Path(quest_id): Path<String>,
) -> Response {
    let id = QuestId(quest_id);
    match service.complete_manual(&id) {
        Ok(quest) => (StatusCode::OK, axum::Json(quest.view())).into_response(),
        Err(error) => error_response(error),
    }
}
