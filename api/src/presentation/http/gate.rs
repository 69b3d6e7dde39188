use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::ports::session_store::SessionData;
use crate::domain::users::Role;
use crate::presentation::http::error::ApiError;
use crate::presentation::pipeline::SessionHandle;

/// The logged-in user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

pub fn is_authenticated(session: &SessionData) -> Result<Principal, ApiError> {
    let user_id = session.user_id.ok_or(ApiError::Unauthorized)?;
    Ok(Principal {
        user_id,
        role: session.role.unwrap_or_default(),
    })
}

/// Anything short of an admin principal is forbidden, anonymous included.
pub fn is_admin(session: &SessionData) -> Result<Principal, ApiError> {
    match is_authenticated(session) {
        Ok(principal) if principal.role == Role::Admin => Ok(principal),
        _ => Err(ApiError::Forbidden),
    }
}

fn session_of(extensions: &axum::http::Extensions) -> SessionData {
    extensions
        .get::<SessionHandle>()
        .map(SessionHandle::data)
        .unwrap_or_default()
}

async fn gate(
    check: fn(&SessionData) -> Result<Principal, ApiError>,
    mut req: Request,
    next: Next,
) -> Response {
    match check(&session_of(req.extensions())) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(path = %req.uri().path(), error = %e, "gate_denied");
            e.into_response()
        }
    }
}

pub async fn require_authenticated(req: Request, next: Next) -> Response {
    gate(is_authenticated, req, next).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    gate(is_admin, req, next).await
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(p) = parts.extensions.get::<Principal>() {
            return Ok(*p);
        }
        is_authenticated(&session_of(&parts.extensions))
    }
}
