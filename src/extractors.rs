use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

/// JSON body whose rejections use the error envelope. Unknown fields are
/// refused by the target type (`deny_unknown_fields`), and oversized bodies by
/// the router's body limit.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!(kind = rejection_kind(&rejection), "rejected request body");
                Err(AppError::BadRequest(describe(&rejection)))
            }
        }
    }
}

/// Short label for logs. The decoder's own message can quote rejected
/// values, passwords included, so it only goes back to the client.
fn rejection_kind(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => "json_data",
        JsonRejection::JsonSyntaxError(_) => "json_syntax",
        JsonRejection::MissingJsonContentType(_) => "missing_content_type",
        JsonRejection::BytesRejection(_) => "body_read",
        _ => "other",
    }
}

fn describe(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "body must be sent with Content-Type: application/json".into()
        }
        JsonRejection::BytesRejection(_) => "body must not be larger than the allowed size".into(),
        other => other.body_text(),
    }
}

/// Integer `:id` path segment. Range is left to the repository.
pub struct IdParam(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i64>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|_: PathRejection| AppError::BadRequest("invalid id parameter".into()))
    }
}
