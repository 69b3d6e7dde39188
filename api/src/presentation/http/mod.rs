use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::presentation::pipeline::{BodyError, ParsedBody};

pub mod admin;
pub mod auth;
pub mod books;
pub mod error;
pub mod gate;
pub mod health;
pub mod orders;
pub mod reviews;

use error::ApiError;

/// Typed view of the JSON body already parsed by the pipeline. Parse
/// failures recorded by the pipeline surface here as 400 or 413.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(err) = parts.extensions.get::<BodyError>() {
            return Err((*err).into());
        }
        let Some(ParsedBody(value)) = parts.extensions.get::<ParsedBody>() else {
            return Err(ApiError::BadRequest("expected an application/json body".into()));
        };
        serde_json::from_value(value.clone())
            .map(JsonBody)
            .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))
    }
}
