mod common;

use std::sync::Arc;

use bazaar_api::{
    error::SessionError,
    models::Session,
    store::{MemoryStore, SessionStore},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use common::session_service;

#[tokio::test]
async fn authenticates_a_fresh_session() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);
    let user_id = Uuid::new_v4();

    let token = sessions.create_session(user_id, Duration::minutes(5)).await?;
    let identity = sessions
        .authenticate(Some(&token.id.to_string()))
        .await?;

    assert_eq!(identity.user_id, user_id);
    assert_eq!(identity.token_id, token.id);
    Ok(())
}

#[tokio::test]
async fn login_uses_configured_duration() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);

    let before = Utc::now();
    let token = sessions.login(Uuid::new_v4()).await?;

    assert_eq!(sessions.duration(), Duration::hours(1));
    assert!(token.expired_at >= before + Duration::hours(1));
    assert!(store.get_session_by_token(token.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn missing_and_blank_tokens_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);

    assert!(matches!(
        sessions.authenticate(None).await,
        Err(SessionError::MissingToken)
    ));
    assert!(matches!(
        sessions.authenticate(Some("  ")).await,
        Err(SessionError::MissingToken)
    ));
}

#[tokio::test]
async fn malformed_token_is_rejected_before_lookup() {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);
    store.set_offline(true);

    assert!(matches!(
        sessions.authenticate(Some("definitely-not-a-uuid")).await,
        Err(SessionError::MalformedToken)
    ));
}

#[tokio::test]
async fn alternate_uuid_spellings_do_not_authenticate() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);
    let token = sessions.login(Uuid::new_v4()).await?;

    for spelling in [
        token.id.simple().to_string(),
        token.id.braced().to_string(),
        token.id.urn().to_string(),
    ] {
        assert!(
            matches!(
                sessions.authenticate(Some(&spelling)).await,
                Err(SessionError::MalformedToken)
            ),
            "{spelling} should be malformed"
        );
    }
    assert!(sessions.authenticate(Some(&token.id.to_string())).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn expired_and_unknown_tokens_are_distinct() {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);

    let expired = Session {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        created_at: Utc::now() - Duration::hours(2),
        expired_at: Utc::now() - Duration::seconds(1),
    };
    store.insert_session(expired.clone()).await;

    assert!(matches!(
        sessions.authenticate(Some(&expired.id.to_string())).await,
        Err(SessionError::ExpiredToken)
    ));
    assert!(matches!(
        sessions
            .authenticate(Some(&Uuid::new_v4().to_string()))
            .await,
        Err(SessionError::UnknownToken)
    ));
}

#[tokio::test]
async fn session_stops_authenticating_once_it_lapses() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);

    let token = sessions
        .create_session(Uuid::new_v4(), Duration::milliseconds(50))
        .await?;
    let raw = token.id.to_string();
    assert!(sessions.authenticate(Some(&raw)).await.is_ok());

    tokio::time::sleep(std::time::Duration::from_millis(80)).await;
    assert!(matches!(
        sessions.authenticate(Some(&raw)).await,
        Err(SessionError::ExpiredToken)
    ));
    Ok(())
}

#[tokio::test]
async fn store_outage_is_surfaced_not_masked() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);
    let token = sessions.login(Uuid::new_v4()).await?;

    store.set_offline(true);
    assert!(matches!(
        sessions.authenticate(Some(&token.id.to_string())).await,
        Err(SessionError::StoreUnavailable(_))
    ));
    assert!(matches!(
        sessions.delete_session(token.id).await,
        Err(SessionError::StoreUnavailable(_))
    ));
    Ok(())
}

#[tokio::test]
async fn many_sessions_per_user_are_independent() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);
    let user_id = Uuid::new_v4();

    let laptop = sessions.login(user_id).await?;
    let phone = sessions.login(user_id).await?;
    assert_ne!(laptop.id, phone.id);

    sessions.delete_session(laptop.id).await?;

    assert!(matches!(
        sessions.authenticate(Some(&laptop.id.to_string())).await,
        Err(SessionError::UnknownToken)
    ));
    assert_eq!(
        sessions
            .authenticate(Some(&phone.id.to_string()))
            .await?
            .user_id,
        user_id
    );
    Ok(())
}

#[tokio::test]
async fn deleting_an_unknown_session_fails() {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);

    assert!(matches!(
        sessions.delete_session(Uuid::new_v4()).await,
        Err(SessionError::UnknownToken)
    ));
}

#[tokio::test]
async fn rotation_replaces_the_session() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let sessions = session_service(&store);
    let user_id = Uuid::new_v4();

    let old = sessions.login(user_id).await?;
    let identity = sessions.authenticate(Some(&old.id.to_string())).await?;
    let new = sessions.rotate_session(identity).await?;

    assert_ne!(old.id, new.id);
    assert!(matches!(
        sessions.authenticate(Some(&old.id.to_string())).await,
        Err(SessionError::UnknownToken)
    ));
    assert_eq!(
        sessions
            .authenticate(Some(&new.id.to_string()))
            .await?
            .user_id,
        user_id
    );

    // The old identity can no longer rotate.
    assert!(matches!(
        sessions.rotate_session(identity).await,
        Err(SessionError::UnknownToken)
    ));
    Ok(())
}
