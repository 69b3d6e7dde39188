//! Back-office endpoints. Mounted behind the admin gate.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::application::use_cases::auth::list_users::ListUsers;
use crate::application::use_cases::books::create_book::{
    CreateBook, CreateBookError, CreateBookRequest as CreateBookDto,
};
use crate::application::use_cases::orders::list_orders::{ListOrders, OrderScope};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::JsonBody;
use crate::presentation::http::auth::UserResponse;
use crate::presentation::http::books::BookResponse;
use crate::presentation::http::error::ApiError;
use crate::presentation::http::orders::OrderResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub price_cents: i64,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/users", get(list_users))
        .route("/books", post(create_book))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/admin/orders", tag = "Admin", responses(
    (status = 200, body = [OrderResponse]),
    (status = 401, body = crate::presentation::http::error::ErrorBody),
    (status = 403, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn list_all_orders(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let repo = ctx.order_repo();
    let uc = ListOrders {
        repo: repo.as_ref(),
    };
    let orders = uc.execute(OrderScope::All).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/admin/users", tag = "Admin", responses(
    (status = 200, body = [UserResponse]),
    (status = 401, body = crate::presentation::http::error::ErrorBody),
    (status = 403, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn list_users(State(ctx): State<AppContext>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let repo = ctx.user_repo();
    let uc = ListUsers {
        repo: repo.as_ref(),
    };
    let users = uc.execute().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/admin/books", tag = "Admin", request_body = CreateBookRequest, responses(
    (status = 201, body = BookResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody),
    (status = 403, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn create_book(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let repo = ctx.book_repo();
    let uc = CreateBook {
        repo: repo.as_ref(),
    };
    let dto = CreateBookDto {
        title: req.title,
        author: req.author,
        price_cents: req.price_cents,
    };
    let book = uc.execute(&dto).await.map_err(|e| match e {
        CreateBookError::Invalid(msg) => ApiError::BadRequest(msg.to_string()),
        CreateBookError::Store(err) => ApiError::Internal(err),
    })?;
    Ok((StatusCode::CREATED, Json(book.into())))
}
