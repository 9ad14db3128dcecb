//! Store adapters consumed by the services.
//!
//! Every service takes its adapters at construction time as `Arc<dyn …>`, so the
//! PostgreSQL-backed [`OrmStore`] and the in-process [`MemoryStore`] are interchangeable.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{CartLine, ProductSnapshot, Session, User},
    token::Token,
};

pub mod memory;
pub mod orm;

pub use memory::MemoryStore;
pub use orm::OrmStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupted record: {0}")]
    Corrupted(String),

    #[error("line quantity would exceed {}", i32::MAX)]
    QuantityOverflow,
}

impl StoreError {
    /// Corruption means stored data can no longer be trusted, unlike a transient outage.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::Corrupted(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Returns `None` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_session_by_token(&self, token_id: Uuid) -> StoreResult<Option<Session>>;

    async fn create_session(&self, user_id: Uuid, token: &Token) -> StoreResult<Session>;

    /// Returns whether a session was removed.
    async fn delete_session(&self, token_id: Uuid) -> StoreResult<bool>;

    /// Deletes `old_token_id` and creates a session for `next` in one transaction.
    /// Returns `None`, creating nothing, when the old session is already gone.
    async fn rotate_session(
        &self,
        old_token_id: Uuid,
        user_id: Uuid,
        next: &Token,
    ) -> StoreResult<Option<Session>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_product(&self, product_id: Uuid) -> StoreResult<Option<ProductSnapshot>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get_lines_by_user(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>>;

    async fn get_line(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<Option<CartLine>>;

    /// Inserts the line or adds `quantity` to the stored one, atomically per
    /// `(user_id, product_id)`. Two concurrent merges must both land.
    /// Fails with [`StoreError::QuantityOverflow`], leaving the line unchanged, when the
    /// sum does not fit in an `i32`.
    async fn merge_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> StoreResult<CartLine>;

    /// Overwrites the quantity of an existing line; `None` when there is no line.
    async fn update_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> StoreResult<Option<CartLine>>;

    /// Returns whether a line was removed.
    async fn delete_line(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<bool>;
}

