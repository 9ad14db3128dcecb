use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbBackend, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, Statement, TransactionTrait,
    ActiveValue::NotSet,
    prelude::DateTimeWithTimeZone,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::{
        cart_items::{self, Column as CartCol, Entity as CartItems},
        products::{self, Entity as Products},
        sessions::{self, ActiveModel as SessionActive, Entity as Sessions},
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    models::{CartLine, ProductSnapshot, Session, User},
    money::Money,
    store::{CartStore, NewUser, ProductStore, SessionStore, StoreError, StoreResult, UserStore},
    token::Token,
};

/// PostgreSQL store on top of the SeaORM entities.
#[derive(Debug, Clone)]
pub struct OrmStore {
    conn: OrmConn,
}

impl OrmStore {
    pub fn new(conn: OrmConn) -> Self {
        Self { conn }
    }
}

fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn session_from_entity(model: sessions::Model) -> Session {
    Session {
        id: model.id,
        user_id: model.user_id,
        created_at: model.created_at.with_timezone(&Utc),
        expired_at: model.expired_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: products::Model) -> ProductSnapshot {
    ProductSnapshot {
        id: model.id,
        name: model.name,
        description: model.description,
        price: Money::from_decimal(model.price),
        image_url: model.image_url,
    }
}

fn line_from_entity(model: cart_items::Model) -> CartLine {
    CartLine {
        user_id: model.user_id,
        product_id: model.product_id,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn line_key(user_id: Uuid, product_id: Uuid) -> Condition {
    Condition::all()
        .add(CartCol::UserId.eq(user_id))
        .add(CartCol::ProductId.eq(product_id))
}

#[async_trait]
impl UserStore for OrmStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = Users::find()
            .filter(UserCol::Email.eq(email))
            .one(&self.conn)
            .await?;
        Ok(user.map(user_from_entity))
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = Users::find_by_id(id).one(&self.conn).await?;
        Ok(user.map(user_from_entity))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<Option<User>> {
        let inserted = UserActive {
            id: Set(Uuid::new_v4()),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            created_at: NotSet,
        }
        .insert(&self.conn)
        .await;

        match inserted {
            Ok(model) => Ok(Some(user_from_entity(model))),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl SessionStore for OrmStore {
    async fn get_session_by_token(&self, token_id: Uuid) -> StoreResult<Option<Session>> {
        let session = Sessions::find_by_id(token_id).one(&self.conn).await?;
        Ok(session.map(session_from_entity))
    }

    async fn create_session(&self, user_id: Uuid, token: &Token) -> StoreResult<Session> {
        let model = SessionActive {
            id: Set(token.id),
            user_id: Set(user_id),
            expired_at: Set(token.expired_at.into()),
            created_at: NotSet,
        }
        .insert(&self.conn)
        .await?;
        Ok(session_from_entity(model))
    }

    async fn delete_session(&self, token_id: Uuid) -> StoreResult<bool> {
        let result = Sessions::delete_by_id(token_id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn rotate_session(
        &self,
        old_token_id: Uuid,
        user_id: Uuid,
        next: &Token,
    ) -> StoreResult<Option<Session>> {
        let txn = self.conn.begin().await?;

        let removed = Sessions::delete_by_id(old_token_id).exec(&txn).await?;
        if removed.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let model = SessionActive {
            id: Set(next.id),
            user_id: Set(user_id),
            expired_at: Set(next.expired_at.into()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(session_from_entity(model)))
    }
}

#[async_trait]
impl ProductStore for OrmStore {
    async fn get_product(&self, product_id: Uuid) -> StoreResult<Option<ProductSnapshot>> {
        let product = Products::find_by_id(product_id).one(&self.conn).await?;
        Ok(product.map(product_from_entity))
    }
}

#[async_trait]
impl CartStore for OrmStore {
    async fn get_lines_by_user(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>> {
        let lines = CartItems::find()
            .filter(CartCol::UserId.eq(user_id))
            .order_by_asc(CartCol::CreatedAt)
            .order_by_asc(CartCol::Id)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(line_from_entity)
            .collect();
        Ok(lines)
    }

    async fn get_line(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<Option<CartLine>> {
        let line = CartItems::find()
            .filter(line_key(user_id, product_id))
            .one(&self.conn)
            .await?;
        Ok(line.map(line_from_entity))
    }

    async fn merge_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> StoreResult<CartLine> {
        // Single statement so concurrent merges on the same key serialize on the unique index.
        // The WHERE guard skips the update, returning no row, when the sum would leave int4.
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = now()
            WHERE cart_items.quantity <= 2147483647 - EXCLUDED.quantity
            RETURNING *
            "#,
            [
                Uuid::new_v4().into(),
                user_id.into(),
                product_id.into(),
                quantity.into(),
            ],
        );

        let model = CartItems::find()
            .from_raw_sql(stmt)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::QuantityOverflow)?;
        Ok(line_from_entity(model))
    }

    async fn update_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> StoreResult<Option<CartLine>> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let updated = CartItems::update_many()
            .col_expr(CartCol::Quantity, Expr::value(quantity))
            .col_expr(CartCol::UpdatedAt, Expr::value(now))
            .filter(line_key(user_id, product_id))
            .exec_with_returning(&self.conn)
            .await?;
        Ok(updated.into_iter().next().map(line_from_entity))
    }

    async fn delete_line(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<bool> {
        let result = CartItems::delete_many()
            .filter(line_key(user_id, product_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
