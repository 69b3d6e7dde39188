pub mod create_review;
pub mod list_reviews;
