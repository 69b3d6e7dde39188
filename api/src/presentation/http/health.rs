use axum::{Router, routing::get};

pub const HOME_GREETING: &str = "this is my home route";

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Plain-text greeting", body = String, content_type = "text/plain"))
)]
pub async fn home() -> &'static str {
    HOME_GREETING
}

pub fn routes() -> Router {
    Router::new().route("/", get(home))
}
