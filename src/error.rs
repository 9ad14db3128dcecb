use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    response::{ApiResponse, Meta},
    store::StoreError,
};

/// Why a request could not be tied to a live session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token not found")]
    MissingToken,

    #[error("session token is malformed")]
    MalformedToken,

    #[error("session does not exist")]
    UnknownToken,

    #[error("session has expired")]
    ExpiredToken,

    #[error("session store unavailable")]
    StoreUnavailable(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("quantity must be between 1 and {}", i32::MAX)]
    InvalidQuantity,

    #[error("product {0} not found")]
    ProductNotFound(Uuid),

    #[error("product {0} is not in the cart")]
    LineNotFound(Uuid),

    #[error("cart store unavailable")]
    StoreUnavailable(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("email is already taken")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    #[error("user store unavailable")]
    StoreUnavailable(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

fn store_status(err: &StoreError) -> StatusCode {
    if err.is_corruption() {
        tracing::error!(error = %err, "stored data is corrupted");
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        tracing::warn!(error = %err, "store unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Session(SessionError::StoreUnavailable(err))
            | AppError::Cart(CartError::StoreUnavailable(err))
            | AppError::User(UserError::StoreUnavailable(err)) => store_status(err),
            AppError::Session(_) => StatusCode::UNAUTHORIZED,
            AppError::Cart(CartError::InvalidQuantity) => StatusCode::BAD_REQUEST,
            AppError::Cart(_) => StatusCode::NOT_FOUND,
            AppError::User(UserError::EmailTaken) => StatusCode::BAD_REQUEST,
            AppError::User(UserError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::User(UserError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            self.to_string()
        };

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData { error: message }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
