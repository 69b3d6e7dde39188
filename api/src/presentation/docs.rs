use utoipa::OpenApi;

use crate::presentation::http::{admin, auth, books, error, health, orders, reviews};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::home,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        books::list_books,
        books::get_book,
        reviews::list_reviews,
        reviews::create_review,
        orders::place_order,
        orders::list_my_orders,
        admin::list_all_orders,
        admin::list_users,
        admin::create_book,
        crate::presentation::ws::socket_entry,
    ),
    components(schemas(
        error::ErrorBody,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::UserResponse,
        books::BookResponse,
        reviews::ReviewResponse,
        reviews::CreateReviewRequest,
        orders::OrderItemBody,
        orders::PlaceOrderRequest,
        orders::OrderResponse,
        admin::CreateBookRequest,
    )),
    tags(
        (name = "Health", description = "Home route"),
        (name = "Auth", description = "Registration and sessions"),
        (name = "Books", description = "Catalog"),
        (name = "Reviews", description = "Book reviews"),
        (name = "Orders", description = "Customer orders"),
        (name = "Admin", description = "Back-office"),
        (name = "Realtime", description = "Server-pushed notifications")
    )
)]
pub struct ApiDoc;
