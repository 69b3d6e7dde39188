// In-memory adapters for tests that exercise the HTTP surface without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::application::ports::event_bus::{DomainEvent, EventHandler};
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::review_repository::ReviewRepository;
use crate::application::ports::session_store::{SessionRecord, SessionStore};
use crate::application::ports::user_repository::{CreateUserError, UserRepository, UserRow};
use crate::domain::catalog::{Book, Review};
use crate::domain::orders::{Order, OrderItem, OrderStatus};
use crate::domain::users::Role;

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<UserRow>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: Role,
        password_hash: &str,
    ) -> Result<UserRow, CreateUserError> {
        let mut users = self.users.lock();
        if users.iter().any(|u| u.email == email) {
            return Err(CreateUserError::DuplicateEmail);
        }
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            password_hash: Some(password_hash.to_string()),
        };
        users.push(row.clone());
        Ok(UserRow {
            password_hash: None,
            ..row
        })
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        Ok(self.users.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        Ok(self.users.lock().iter().find(|u| u.id == id).map(|u| UserRow {
            password_hash: None,
            ..u.clone()
        }))
    }

    async fn list_users(&self) -> anyhow::Result<Vec<UserRow>> {
        Ok(self.users.lock().clone())
    }
}

#[derive(Default)]
pub struct MemoryBookRepository {
    books: Mutex<Vec<Book>>,
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        Ok(self.books.lock().clone())
    }

    async fn get_book(&self, id: Uuid) -> anyhow::Result<Option<Book>> {
        Ok(self.books.lock().iter().find(|b| b.id == id).cloned())
    }

    async fn create_book(
        &self,
        title: &str,
        author: &str,
        price_cents: i64,
    ) -> anyhow::Result<Book> {
        let book = Book {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author: author.to_string(),
            price_cents,
            created_at: Utc::now(),
        };
        self.books.lock().push(book.clone());
        Ok(book)
    }
}

#[derive(Default)]
pub struct MemoryReviewRepository {
    reviews: Mutex<Vec<Review>>,
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn list_for_book(&self, book_id: Uuid) -> anyhow::Result<Vec<Review>> {
        Ok(self
            .reviews
            .lock()
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn create_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: i16,
        body: &str,
    ) -> anyhow::Result<Review> {
        let review = Review {
            id: Uuid::new_v4(),
            book_id,
            user_id,
            rating,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.reviews.lock().push(review.clone());
        Ok(review)
    }
}

#[derive(Default)]
pub struct MemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn insert_order(&self, user_id: Uuid, items: &[OrderItem]) -> anyhow::Result<Order> {
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            items: items.to_vec(),
            status: OrderStatus::Placed,
            created_at: Utc::now(),
        };
        self.orders.lock().push(order.clone());
        Ok(order)
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Order>> {
        Ok(self
            .orders
            .lock()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Order>> {
        Ok(self.orders.lock().clone())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    records: Mutex<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<SessionRecord>> {
        let now = Utc::now();
        Ok(self
            .records
            .lock()
            .get(id)
            .filter(|r| !r.is_expired(now))
            .cloned())
    }

    async fn set(&self, record: &SessionRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> anyhow::Result<()> {
        if let Some(r) = self.records.lock().get_mut(id) {
            r.expires_at = expires_at;
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.records.lock().remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let now = Utc::now();
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, r| !r.is_expired(now));
        Ok((before - records.len()) as u64)
    }
}

/// Event handler that remembers what it was given.
pub struct Recorder {
    label: &'static str,
    seen: Mutex<Vec<DomainEvent>>,
}

impl Recorder {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.seen.lock().clone()
    }
}

impl EventHandler for Recorder {
    fn name(&self) -> &str {
        self.label
    }

    fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        self.seen.lock().push(event.clone());
        Ok(())
    }
}
