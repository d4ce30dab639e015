use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::error;

use crate::users::{password::CredentialError, repo::RepoError, validation::InvariantViolation};

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";
pub const INTERNAL_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Every failure a handler can answer with. Rendered as `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("failed validation")]
    Validation(Map<String, Value>),
    #[error("not found")]
    NotFound,
    #[error("edit conflict")]
    EditConflict,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn field(field: &str, message: &str) -> Self {
        let mut map = Map::new();
        map.insert(field.to_owned(), Value::String(message.to_owned()));
        Self::Validation(map)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateEmail => Self::field("email", "email address already in use"),
            RepoError::NotFound => Self::NotFound,
            RepoError::EditConflict => Self::EditConflict,
            other => Self::Internal(other.into()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.into())
    }
}

impl From<InvariantViolation> for AppError {
    fn from(err: InvariantViolation) -> Self {
        Self::Internal(anyhow::Error::new(err).context("internal invariant violated"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, Value::String(msg)),
            Self::Validation(fields) => (StatusCode::UNPROCESSABLE_ENTITY, Value::Object(fields)),
            Self::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.into()),
            Self::EditConflict => (StatusCode::CONFLICT, EDIT_CONFLICT_MESSAGE.into()),
            Self::Internal(e) => {
                // Runs inside the request span, which carries method and uri.
                error!(error = ?e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.into())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let res = err.into_response();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn status_mapping() {
        let (status, body) = render(AppError::BadRequest("body contains badly-formed JSON".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "body contains badly-formed JSON");

        let (status, body) = render(RepoError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], NOT_FOUND_MESSAGE);

        let (status, body) = render(RepoError::EditConflict.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], EDIT_CONFLICT_MESSAGE);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_field_error() {
        let (status, body) = render(RepoError::DuplicateEmail.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]["email"].as_str().unwrap().contains("already in use"));
    }

    #[tokio::test]
    async fn internal_details_never_reach_the_client() {
        let err = RepoError::Database("get user", sqlx::Error::PoolTimedOut);
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_MESSAGE);
        assert!(!body.to_string().contains("get user"));

        let (status, _) = render(InvariantViolation.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invariant_violation_keeps_its_cause_for_the_single_log_line() {
        let AppError::Internal(e) = AppError::from(InvariantViolation) else {
            panic!("expected an internal error");
        };
        let chain = format!("{e:?}");
        assert!(chain.contains("internal invariant violated"));
        assert!(chain.contains("missing password hash for user"));
    }
}
