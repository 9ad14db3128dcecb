use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    error::SessionError,
    store::SessionStore,
    token::{self, Token},
};

/// Who an authenticated request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub token_id: Uuid,
}

/// Issues, validates, rotates and revokes sessions.
///
/// Nothing is cached: each call re-reads the store and re-checks expiry against the clock.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    duration: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, duration: Duration) -> Self {
        Self { store, duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Resolves raw token text to an [`Identity`].
    ///
    /// The checks run in order: presence, format, lookup, expiry.
    pub async fn authenticate(&self, raw_token: Option<&str>) -> Result<Identity, SessionError> {
        let raw_token = raw_token
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(SessionError::MissingToken)?;

        let token_id = token::parse_token_id(raw_token).ok_or(SessionError::MalformedToken)?;

        let session = self
            .store
            .get_session_by_token(token_id)
            .await?
            .ok_or(SessionError::UnknownToken)?;

        if token::is_expired_at(session.expired_at, Utc::now()) {
            return Err(SessionError::ExpiredToken);
        }

        Ok(Identity {
            user_id: session.user_id,
            token_id: session.id,
        })
    }

    pub async fn create_session(
        &self,
        user_id: Uuid,
        duration: Duration,
    ) -> Result<Token, SessionError> {
        let token = Token::issue(duration);
        self.store.create_session(user_id, &token).await?;
        tracing::info!(%user_id, expired_at = %token.expired_at, "session created");
        Ok(token)
    }

    /// Starts a session lasting the configured duration.
    pub async fn login(&self, user_id: Uuid) -> Result<Token, SessionError> {
        self.create_session(user_id, self.duration).await
    }

    pub async fn delete_session(&self, token_id: Uuid) -> Result<(), SessionError> {
        if !self.store.delete_session(token_id).await? {
            return Err(SessionError::UnknownToken);
        }
        tracing::info!(%token_id, "session deleted");
        Ok(())
    }

    /// Replaces a live session with a fresh one for the same user.
    ///
    /// The store deletes the old session and creates the new one in one transaction.
    pub async fn rotate_session(&self, identity: Identity) -> Result<Token, SessionError> {
        let next = Token::issue(self.duration);
        let rotated = self
            .store
            .rotate_session(identity.token_id, identity.user_id, &next)
            .await?;
        if rotated.is_none() {
            return Err(SessionError::UnknownToken);
        }
        tracing::info!(user_id = %identity.user_id, "session rotated");
        Ok(next)
    }
}
