use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use uuid::Uuid;

use crate::{error::AppError, services::session_service::Identity, state::AppState};

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub token_id: Uuid,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            token_id: identity.token_id,
        }
    }
}

impl From<AuthUser> for Identity {
    fn from(user: AuthUser) -> Self {
        Self {
            user_id: user.user_id,
            token_id: user.token_id,
        }
    }
}

/// A non-empty session cookie wins; `Authorization: Bearer` is the fallback carrier.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(value) = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim())
        .filter(|value| !value.is_empty())
    {
        return Some(value.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = token_from_headers(&parts.headers);
        match state.sessions.authenticate(raw.as_deref()).await {
            Ok(identity) => Ok(identity.into()),
            Err(err) => {
                tracing::debug!(error = %err, "authentication rejected");
                Err(err.into())
            }
        }
    }
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}
