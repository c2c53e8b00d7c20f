use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Activity, ActivityId, CpmError, Project, ProjectMetadata, ScheduleResult, ScheduleSummary,
    ValidationError, compute_schedule,
};

#[derive(Clone)]
pub struct AppState {
    project: Arc<RwLock<Project>>,
}

impl AppState {
    pub fn new(project: Project) -> Self {
        Self {
            project: Arc::new(RwLock::new(project)),
        }
    }

    fn project(&self) -> Arc<RwLock<Project>> {
        self.project.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unresolved: Option<Vec<ActivityId>>,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Cycle(Vec<ActivityId>, String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<CpmError> for ApiError {
    fn from(value: CpmError) -> Self {
        match value {
            CpmError::Validation(err) => err.into(),
            CpmError::Cycle(err) => {
                let message = err.to_string();
                ApiError::Cycle(err.unresolved, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, unresolved) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message, None),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message, None),
            ApiError::Invalid(message) => {
                (StatusCode::BAD_REQUEST, "invalid_request", message, None)
            }
            ApiError::Cycle(unresolved, message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "dependency_cycle",
                message,
                Some(unresolved),
            ),
        };
        let body = Json(ErrorBody {
            error,
            message,
            unresolved,
        });
        (status, body).into_response()
    }
}

/// Body of a schedule response: the full result plus the consumer views a
/// table or chart needs. Only one critical chain is reported (in `summary`);
/// listing all of them is exponential in the number of parallel branches.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub schedule: ScheduleResult,
    pub summary: ScheduleSummary,
    pub critical_path: Vec<String>,
}

impl From<ScheduleResult> for ScheduleReport {
    fn from(schedule: ScheduleResult) -> Self {
        Self {
            summary: schedule.summary(),
            critical_path: schedule.critical_activity_names(),
            schedule,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComputePayload {
    activities: Vec<Activity>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata", get(get_metadata).put(update_metadata))
        .route("/activities", get(list_activities).post(create_activity))
        .route(
            "/activities/:id",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .route("/schedule", get(project_schedule))
        .route("/compute", post(compute_snapshot))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, project: Project) -> std::io::Result<()> {
    let state = AppState::new(project);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_metadata(State(state): State<AppState>) -> Json<ProjectMetadata> {
    let project = state.project();
    let metadata = project.read().metadata().clone();
    Json(metadata)
}

async fn update_metadata(
    State(state): State<AppState>,
    Json(metadata): Json<ProjectMetadata>,
) -> Json<ProjectMetadata> {
    let project = state.project();
    project.write().set_metadata(metadata.clone());
    Json(metadata)
}

async fn list_activities(State(state): State<AppState>) -> Json<Vec<Activity>> {
    let project = state.project();
    let activities = project.read().snapshot();
    Json(activities)
}

async fn get_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<ActivityId>,
) -> Result<Json<Activity>, ApiError> {
    let project = state.project();
    let found = project.read().find_activity(activity_id).cloned();
    match found {
        Some(activity) => Ok(Json(activity)),
        None => Err(ApiError::not_found(format!(
            "activity {activity_id} not found"
        ))),
    }
}

async fn create_activity(
    State(state): State<AppState>,
    Json(activity): Json<Activity>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    let project = state.project();
    {
        let mut guard = project.write();
        if guard.find_activity(activity.id).is_some() {
            return Err(ApiError::Conflict(format!(
                "activity {} already exists",
                activity.id
            )));
        }
        guard.upsert_activity(activity.clone())?;
    }
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn update_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<ActivityId>,
    Json(activity): Json<Activity>,
) -> Result<Json<Activity>, ApiError> {
    if activity.id != activity_id {
        return Err(ApiError::invalid(
            "activity id in payload does not match path parameter",
        ));
    }
    let project = state.project();
    {
        let mut guard = project.write();
        if guard.find_activity(activity_id).is_none() {
            return Err(ApiError::not_found(format!(
                "activity {activity_id} not found"
            )));
        }
        guard.upsert_activity(activity.clone())?;
    }
    Ok(Json(activity))
}

async fn delete_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<ActivityId>,
) -> Result<StatusCode, ApiError> {
    let project = state.project();
    let removed = project.write().delete_activity(activity_id);
    if !removed {
        return Err(ApiError::not_found(format!(
            "activity {activity_id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn project_schedule(State(state): State<AppState>) -> Result<Json<ScheduleReport>, ApiError> {
    // Take the snapshot under the lock, compute outside it.
    let snapshot = state.project().read().snapshot();
    let result = compute_schedule(snapshot)?;
    Ok(Json(result.into()))
}

async fn compute_snapshot(
    Json(payload): Json<ComputePayload>,
) -> Result<Json<ScheduleReport>, ApiError> {
    let result = compute_schedule(payload.activities)?;
    Ok(Json(result.into()))
}
