use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone, Default)]
pub struct Meta {
    /// Number of records in `data` when it is a collection.
    pub count: Option<i64>,
}

impl Meta {
    pub fn count(count: usize) -> Self {
        Self {
            count: i64::try_from(count).ok(),
        }
    }

    pub fn empty() -> Self {
        Self { count: None }
    }
}

/// Envelope shared by every JSON response, errors included.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}
