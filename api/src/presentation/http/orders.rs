use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::orders::list_orders::{ListOrders, OrderScope};
use crate::application::use_cases::orders::place_order::{PlaceOrder, PlaceOrderError};
use crate::bootstrap::app_context::AppContext;
use crate::domain::orders::{Order, OrderItem};
use crate::presentation::http::JsonBody;
use crate::presentation::http::error::ApiError;
use crate::presentation::http::gate::Principal;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemBody {
    pub book_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemBody>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemBody>,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            user_id: o.user_id,
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemBody {
                    book_id: i.book_id,
                    quantity: i.quantity,
                })
                .collect(),
            status: o.status.as_str().to_string(),
            created_at: o.created_at,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_my_orders).post(place_order))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/orders", tag = "Orders", request_body = PlaceOrderRequest, responses(
    (status = 201, body = OrderResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn place_order(
    State(ctx): State<AppContext>,
    principal: Principal,
    JsonBody(req): JsonBody<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let repo = ctx.order_repo();
    let books = ctx.book_repo();
    let events = ctx.events();
    let uc = PlaceOrder {
        repo: repo.as_ref(),
        books: books.as_ref(),
        events: events.as_ref(),
    };
    let items: Vec<OrderItem> = req
        .items
        .into_iter()
        .map(|i| OrderItem {
            book_id: i.book_id,
            quantity: i.quantity,
        })
        .collect();
    let order = uc
        .execute(principal.user_id, &items)
        .await
        .map_err(|e| match e {
            PlaceOrderError::Store(err) => ApiError::Internal(err),
            other => ApiError::BadRequest(other.to_string()),
        })?;
    tracing::info!(order_id = %order.id, user_id = %principal.user_id, "order_placed");
    Ok((StatusCode::CREATED, Json(order.into())))
}

#[utoipa::path(get, path = "/orders", tag = "Orders", responses(
    (status = 200, body = [OrderResponse]),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn list_my_orders(
    State(ctx): State<AppContext>,
    principal: Principal,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let repo = ctx.order_repo();
    let uc = ListOrders {
        repo: repo.as_ref(),
    };
    let orders = uc.execute(OrderScope::Owner(principal.user_id)).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}
