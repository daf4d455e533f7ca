use crate::domain::requests::cart::UserIdQuery;
use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderMap, request::Parts},
};
use shared::errors::HttpError;

pub const USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user_id) = from_header(&parts.headers)? {
            return Ok(UserId(user_id));
        }

        let Query(query) = Query::<UserIdQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| HttpError::BadRequest(e.body_text()))?;

        query
            .user_id
            .map(UserId)
            .ok_or_else(|| HttpError::BadRequest("User ID is required".into()))
    }
}

fn from_header(headers: &HeaderMap) -> Result<Option<i64>, HttpError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(Some)
        .ok_or_else(|| HttpError::BadRequest(format!("{USER_ID_HEADER} must be a number")))
}
