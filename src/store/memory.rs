use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    models::{CartLine, ProductSnapshot, Session, User},
    money::Money,
    store::{CartStore, NewUser, ProductStore, SessionStore, StoreError, StoreResult, UserStore},
    token::Token,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
    products: HashMap<Uuid, ProductSnapshot>,
    lines: HashMap<(Uuid, Uuid), StoredLine>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct StoredLine {
    line: CartLine,
    seq: u64,
}

/// In-process store. Every call holds one lock for its whole duration, so each
/// operation is atomic, merges included.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn insert_product(&self, product: ProductSnapshot) {
        self.tables
            .lock()
            .await
            .products
            .insert(product.id, product);
    }

    pub async fn set_product_price(&self, product_id: Uuid, price: Money) -> bool {
        match self.tables.lock().await.products.get_mut(&product_id) {
            Some(product) => {
                product.price = price;
                true
            }
            None => false,
        }
    }

    pub async fn delete_product(&self, product_id: Uuid) -> bool {
        self.tables
            .lock()
            .await
            .products
            .remove(&product_id)
            .is_some()
    }

    pub async fn insert_session(&self, session: Session) {
        self.tables
            .lock()
            .await
            .sessions
            .insert(session.id, session);
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.ensure_online()?;
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<Option<User>> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(Some(user))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_session_by_token(&self, token_id: Uuid) -> StoreResult<Option<Session>> {
        self.ensure_online()?;
        Ok(self.tables.lock().await.sessions.get(&token_id).cloned())
    }

    async fn create_session(&self, user_id: Uuid, token: &Token) -> StoreResult<Session> {
        self.ensure_online()?;
        let session = Session {
            id: token.id,
            user_id,
            created_at: Utc::now(),
            expired_at: token.expired_at,
        };
        self.tables
            .lock()
            .await
            .sessions
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn delete_session(&self, token_id: Uuid) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self
            .tables
            .lock()
            .await
            .sessions
            .remove(&token_id)
            .is_some())
    }

    async fn rotate_session(
        &self,
        old_token_id: Uuid,
        user_id: Uuid,
        next: &Token,
    ) -> StoreResult<Option<Session>> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        if tables.sessions.remove(&old_token_id).is_none() {
            return Ok(None);
        }
        let session = Session {
            id: next.id,
            user_id,
            created_at: Utc::now(),
            expired_at: next.expired_at,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(Some(session))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get_product(&self, product_id: Uuid) -> StoreResult<Option<ProductSnapshot>> {
        self.ensure_online()?;
        Ok(self.tables.lock().await.products.get(&product_id).cloned())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get_lines_by_user(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        let mut lines: Vec<&StoredLine> = tables
            .lines
            .values()
            .filter(|stored| stored.line.user_id == user_id)
            .collect();
        lines.sort_by_key(|stored| stored.seq);
        Ok(lines.into_iter().map(|stored| stored.line.clone()).collect())
    }

    async fn get_line(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<Option<CartLine>> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .lines
            .get(&(user_id, product_id))
            .map(|stored| stored.line.clone()))
    }

    async fn merge_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> StoreResult<CartLine> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        if let Some(stored) = tables.lines.get_mut(&(user_id, product_id)) {
            stored.line.quantity = stored
                .line
                .quantity
                .checked_add(quantity)
                .ok_or(StoreError::QuantityOverflow)?;
            return Ok(stored.line.clone());
        }

        let seq = tables.next_seq;
        tables.next_seq += 1;
        let line = CartLine {
            user_id,
            product_id,
            quantity,
            created_at: Utc::now(),
        };
        tables.lines.insert(
            (user_id, product_id),
            StoredLine {
                line: line.clone(),
                seq,
            },
        );
        Ok(line)
    }

    async fn update_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> StoreResult<Option<CartLine>> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        Ok(tables.lines.get_mut(&(user_id, product_id)).map(|stored| {
            stored.line.quantity = quantity;
            stored.line.clone()
        }))
    }

    async fn delete_line(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self
            .tables
            .lock()
            .await
            .lines
            .remove(&(user_id, product_id))
            .is_some())
    }
}
