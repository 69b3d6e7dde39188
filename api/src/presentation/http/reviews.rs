use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::reviews::create_review::{
    CreateReview, CreateReviewError, CreateReviewRequest as CreateReviewDto,
};
use crate::application::use_cases::reviews::list_reviews::ListReviews;
use crate::bootstrap::app_context::AppContext;
use crate::domain::catalog::Review;
use crate::presentation::http::JsonBody;
use crate::presentation::http::error::ApiError;
use crate::presentation::http::gate::Principal;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        ReviewResponse {
            id: r.id,
            book_id: r.book_id,
            user_id: r.user_id,
            rating: r.rating,
            body: r.body,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub book_id: Uuid,
    pub rating: i16,
    #[serde(default)]
    pub body: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", post(create_review))
        .route("/book/:book_id", get(list_reviews))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/reviews/book/{book_id}", tag = "Reviews",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    responses((status = 200, body = [ReviewResponse])))]
pub async fn list_reviews(
    State(ctx): State<AppContext>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let repo = ctx.review_repo();
    let uc = ListReviews {
        repo: repo.as_ref(),
    };
    let reviews = uc.execute(book_id).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/reviews", tag = "Reviews", request_body = CreateReviewRequest, responses(
    (status = 201, body = ReviewResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody),
    (status = 401, body = crate::presentation::http::error::ErrorBody),
    (status = 404, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn create_review(
    State(ctx): State<AppContext>,
    principal: Principal,
    JsonBody(req): JsonBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let repo = ctx.review_repo();
    let books = ctx.book_repo();
    let uc = CreateReview {
        repo: repo.as_ref(),
        books: books.as_ref(),
    };
    let dto = CreateReviewDto {
        book_id: req.book_id,
        rating: req.rating,
        body: req.body,
    };
    let review = uc
        .execute(principal.user_id, &dto)
        .await
        .map_err(|e| match e {
            CreateReviewError::InvalidRating => ApiError::BadRequest(e.to_string()),
            CreateReviewError::UnknownBook => ApiError::NotFound,
            CreateReviewError::Store(err) => ApiError::Internal(err),
        })?;
    Ok((StatusCode::CREATED, Json(review.into())))
}
