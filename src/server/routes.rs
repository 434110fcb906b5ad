use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    Json,
    http::{request::Parts, StatusCode},
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::storage::{DeleteOutcome, StudentGateway, UpdateOutcome};
use crate::student::{Student, StudentId};
use crate::validate::{self, FieldIssue};
use crate::Error;
use std::sync::Arc;

pub const DELETED_MESSAGE: &str = "Student deleted successfully";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldIssue>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = std::result::Result<T, ApiError>;

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into(), details: Vec::new() }))
}

/// The one place crate errors become HTTP statuses
fn error_response(err: Error) -> ApiError {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Validation(_) | Error::IdMismatch { .. } => StatusCode::BAD_REQUEST,
        e if e.is_retryable() => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    match err {
        Error::Validation(invalid) => (
            status,
            Json(ErrorResponse { error: "Invalid student".to_string(), details: invalid.issues }),
        ),
        other => api_error(status, other.to_string()),
    }
}

/// Writes that fail in storage are reported as a bad request
fn write_failed(action: &str, err: Error) -> ApiError {
    match err {
        Error::Storage(_) | Error::Internal(_) => {
            tracing::error!("Failed to {} student: {}", action, err);
            api_error(StatusCode::BAD_REQUEST, format!("Failed to {} student: {}", action, err))
        }
        other => error_response(other),
    }
}

/// `{id}` path segment; a non-integer id is a JSON 400 like every other error
#[derive(Debug, Clone, Copy)]
pub struct StudentIdParam(pub StudentId);

impl<S: Send + Sync> FromRequestParts<S> for StudentIdParam {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<StudentId>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid student id: {}", rejection.body_text()),
            )),
        }
    }
}

/// Run a storage call on the blocking pool; the outer error is a failed task
async fn with_gateway<T, F>(state: &AppState, f: F) -> ApiResult<crate::Result<T>>
where
    F: FnOnce(&dyn StudentGateway) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let gateway = state.gateway.clone();
    tokio::task::spawn_blocking(move || f(gateway.as_ref()))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Storage task failed: {}", e)))
}

pub async fn list_students(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Student>>> {
    match with_gateway(&state, |gw| gw.list_all()).await? {
        Ok(students) => Ok(Json(students)),
        Err(e) => {
            tracing::error!("Failed to list students: {}", e);
            Err(error_response(e))
        }
    }
}

pub async fn get_student(
    State(state): State<Arc<AppState>>,
    StudentIdParam(id): StudentIdParam,
) -> ApiResult<Json<Student>> {
    match with_gateway(&state, move |gw| gw.get_by_id(id)).await? {
        Ok(Some(student)) => Ok(Json(student)),
        Ok(None) => Err(error_response(Error::NotFound(id))),
        Err(e) => {
            tracing::error!("Failed to load student {}: {}", id, e);
            Err(error_response(e))
        }
    }
}

pub async fn create_student(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<Student>> {
    let draft = validate::new_student(&body).map_err(|e| error_response(e.into()))?;

    match with_gateway(&state, move |gw| gw.insert(&draft)).await? {
        Ok(student) => {
            tracing::info!("Created student {}", student.id);
            Ok(Json(student))
        }
        Err(e) => Err(write_failed("create", e)),
    }
}

pub async fn update_student(
    State(state): State<Arc<AppState>>,
    StudentIdParam(id): StudentIdParam,
    body: Bytes,
) -> ApiResult<Json<Student>> {
    let student = validate::student(&body).map_err(|e| error_response(e.into()))?;
    if student.id != id {
        return Err(error_response(Error::IdMismatch { path: id, body: student.id }));
    }

    match with_gateway(&state, move |gw| gw.update(id, &student)).await? {
        Ok(UpdateOutcome::Updated(stored)) => {
            tracing::info!("Updated student {}", id);
            Ok(Json(stored))
        }
        Ok(UpdateOutcome::NotFound) => Err(error_response(Error::NotFound(id))),
        Ok(UpdateOutcome::Conflict) => Err(resolve_conflict(&state, id).await),
        Err(e) => Err(write_failed("update", e)),
    }
}

/// A stale write either raced a delete (404) or another update (409, retry)
async fn resolve_conflict(state: &AppState, id: StudentId) -> ApiError {
    let exists = match with_gateway(state, move |gw| gw.exists(id)).await {
        Ok(result) => result,
        Err(task_failed) => return task_failed,
    };

    match exists {
        Ok(false) => error_response(Error::NotFound(id)),
        Ok(true) => {
            tracing::warn!("Concurrent modification of student {}", id);
            error_response(Error::Conflict(id))
        }
        Err(e) => {
            tracing::error!("Failed to re-check student {} after conflict: {}", id, e);
            error_response(e)
        }
    }
}

pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    StudentIdParam(id): StudentIdParam,
) -> ApiResult<&'static str> {
    match with_gateway(&state, move |gw| gw.delete_by_id(id)).await? {
        Ok(DeleteOutcome::Deleted) => {
            tracing::info!("Deleted student {}", id);
            Ok(DELETED_MESSAGE)
        }
        Ok(DeleteOutcome::NotFound) => Err(error_response(Error::NotFound(id))),
        Err(e) => Err(write_failed("delete", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::NewStudent;
    use crate::validate::ValidationError;
    use crate::Result;

    /// Gateway whose writes always lose the race or fail outright
    struct RacingGateway {
        present: bool,
        fail_writes: bool,
    }

    impl RacingGateway {
        fn state(present: bool, fail_writes: bool) -> Arc<AppState> {
            Arc::new(AppState::new(Arc::new(Self { present, fail_writes })))
        }

        fn write_result<T>(&self, value: T) -> Result<T> {
            if self.fail_writes {
                Err(Error::Internal("disk I/O error".to_string()))
            } else {
                Ok(value)
            }
        }
    }

    impl StudentGateway for RacingGateway {
        fn list_all(&self) -> Result<Vec<Student>> {
            Ok(Vec::new())
        }

        fn get_by_id(&self, id: StudentId) -> Result<Option<Student>> {
            Ok(self.present.then(|| NewStudent::new("Ana").into_student(id)))
        }

        fn insert(&self, student: &NewStudent) -> Result<Student> {
            self.write_result(student.clone().into_student(1))
        }

        fn update(&self, _id: StudentId, _student: &Student) -> Result<UpdateOutcome> {
            self.write_result(UpdateOutcome::Conflict)
        }

        fn delete_by_id(&self, _id: StudentId) -> Result<DeleteOutcome> {
            self.write_result(DeleteOutcome::Deleted)
        }
    }

    fn body(json: &str) -> Bytes {
        Bytes::from(json.to_string())
    }

    #[tokio::test]
    async fn test_conflict_on_present_record_is_409() {
        let state = RacingGateway::state(true, false);
        let (status, Json(err)) = update_student(State(state), StudentIdParam(1), body(r#"{"id":1,"name":"Ana B"}"#))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(err.error.contains("retry"));
    }

    #[tokio::test]
    async fn test_conflict_on_vanished_record_is_404() {
        let state = RacingGateway::state(false, false);
        let (status, _) = update_student(State(state), StudentIdParam(1), body(r#"{"id":1,"name":"Ana B"}"#))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_writes_are_400() {
        let state = RacingGateway::state(true, true);

        let (status, Json(err)) = create_student(State(state.clone()), body(r#"{"name":"Ana"}"#))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err.error.starts_with("Failed to create student"));

        let (status, _) = delete_student(State(state.clone()), StudentIdParam(1)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = update_student(State(state), StudentIdParam(1), body(r#"{"id":1,"name":"Ana"}"#))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        // a failing gateway would turn any storage call into a different message
        let state = RacingGateway::state(true, true);
        let (status, Json(err)) = create_student(State(state), body(r#"{"id":3}"#))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "Invalid student");
        assert_eq!(err.details.len(), 2);
    }

    #[tokio::test]
    async fn test_mismatched_ids_are_400() {
        let state = RacingGateway::state(true, false);
        let (status, Json(err)) = update_student(State(state), StudentIdParam(1), body(r#"{"id":2,"name":"Ana"}"#))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err.error.contains("mismatch"));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(error_response(Error::NotFound(1)).0, StatusCode::NOT_FOUND);
        assert_eq!(error_response(Error::Conflict(1)).0, StatusCode::CONFLICT);
        assert_eq!(
            error_response(Error::IdMismatch { path: 1, body: 2 }).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(Error::Internal("boom".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let (status, Json(err)) = error_response(ValidationError::single("name", "is required").into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err.details[0].field, "name");
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse { error: "nope".into(), details: Vec::new() }).unwrap();
        assert_eq!(json, serde_json::json!({"error": "nope"}));
    }
}
