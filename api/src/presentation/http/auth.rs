use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ports::user_repository::UserRow;
use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterError, RegisterRequest as RegisterDto,
};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::JsonBody;
use crate::presentation::http::error::ApiError;
use crate::presentation::http::gate::Principal;
use crate::presentation::pipeline::SessionHandle;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<UserRow> for UserResponse {
    fn from(u: UserRow) -> Self {
        UserResponse {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/auth/register", tag = "Auth", request_body = RegisterRequest, responses(
    (status = 201, body = UserResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody),
    (status = 409, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
        admin_email: ctx.cfg.admin_email.as_deref(),
    };
    let dto = RegisterDto {
        email: req.email,
        name: req.name,
        password: req.password,
    };
    let user = uc.execute(&dto).await.map_err(|e| match e {
        RegisterError::DuplicateEmail => ApiError::Conflict(e.to_string()),
        RegisterError::InvalidEmail | RegisterError::WeakPassword => {
            ApiError::BadRequest(e.to_string())
        }
        RegisterError::Store(err) => ApiError::Internal(err),
    })?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(post, path = "/auth/login", tag = "Auth", request_body = LoginRequest, responses(
    (status = 200, body = UserResponse),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    session: Option<axum::Extension<SessionHandle>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let axum::Extension(session) = session.ok_or_else(|| {
        ApiError::Internal(anyhow::anyhow!("session layer not installed"))
    })?;
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
    };
    let dto = LoginDto {
        email: req.email,
        password: req.password,
    };
    let user = uc.execute(&dto).await?.ok_or(ApiError::Unauthorized)?;
    session.login(user.id, user.role);
    tracing::info!(user_id = %user.id, "user_logged_in");
    Ok(Json(user.into()))
}

#[utoipa::path(post, path = "/auth/logout", tag = "Auth", responses((status = 204, description = "Session destroyed")))]
pub async fn logout(session: Option<axum::Extension<SessionHandle>>) -> StatusCode {
    if let Some(axum::Extension(session)) = session {
        session.destroy();
    }
    StatusCode::NO_CONTENT
}

#[utoipa::path(get, path = "/auth/me", tag = "Auth", responses(
    (status = 200, body = UserResponse),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn me(
    State(ctx): State<AppContext>,
    principal: Principal,
) -> Result<Json<UserResponse>, ApiError> {
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let row = uc
        .execute(principal.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(row.into()))
}
