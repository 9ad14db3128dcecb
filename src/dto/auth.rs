use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::token::Token;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub expired_at: DateTime<Utc>,
}

impl From<Token> for SessionResponse {
    fn from(token: Token) -> Self {
        Self {
            token: token.id.to_string(),
            expired_at: token.expired_at,
        }
    }
}
