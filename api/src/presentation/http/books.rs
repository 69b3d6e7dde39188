use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::books::get_book::GetBook;
use crate::application::use_cases::books::list_books::ListBooks;
use crate::bootstrap::app_context::AppContext;
use crate::domain::catalog::Book;
use crate::presentation::http::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub price_cents: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Book> for BookResponse {
    fn from(b: Book) -> Self {
        BookResponse {
            id: b.id,
            title: b.title,
            author: b.author,
            price_cents: b.price_cents,
            created_at: b.created_at,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_books))
        .route("/:id", get(get_book))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/books", tag = "Books", responses((status = 200, body = [BookResponse])))]
pub async fn list_books(State(ctx): State<AppContext>) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let repo = ctx.book_repo();
    let uc = ListBooks {
        repo: repo.as_ref(),
    };
    let books = uc.execute().await?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/books/{id}", tag = "Books",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses((status = 200, body = BookResponse), (status = 404, body = crate::presentation::http::error::ErrorBody)))]
pub async fn get_book(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let repo = ctx.book_repo();
    let uc = GetBook {
        repo: repo.as_ref(),
    };
    let book = uc.execute(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(book.into()))
}
