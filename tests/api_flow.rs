mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use bazaar_api::{build_app, store::MemoryStore};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use common::{app_state, seed_product};

struct TestResponse {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = auth {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok(TestResponse {
        status,
        set_cookie,
        body,
    })
}

/// `session_token=<id>` from a `Set-Cookie` header.
fn session_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

async fn register_and_login(app: &Router, email: &str) -> anyhow::Result<String> {
    let registered = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": email, "password": "hunter22" })),
    )
    .await?;
    assert_eq!(registered.status, StatusCode::OK);
    assert!(registered.body["data"].get("password_hash").is_none());

    let logged_in = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "hunter22" })),
    )
    .await?;
    assert_eq!(logged_in.status, StatusCode::OK);

    let set_cookie = logged_in.set_cookie.expect("login sets a cookie");
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = session_pair(&set_cookie);
    assert_eq!(
        cookie,
        format!("session_token={}", logged_in.body["data"]["token"].as_str().unwrap_or_default())
    );
    Ok(cookie)
}

#[tokio::test]
async fn shopping_session_end_to_end() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mug = seed_product(&store, "Mug", "12.50").await;
    let tote = seed_product(&store, "Tote", "19.99").await;
    let app = build_app(app_state(&store));

    let cookie = register_and_login(&app, "ada@example.com").await?;
    let auth = Some(cookie.as_str());

    let me = send(&app, Method::GET, "/api/auth/me", auth, None).await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], "ada@example.com");

    for quantity in [2, 3] {
        let added = send(
            &app,
            Method::POST,
            "/api/cart",
            auth,
            Some(json!({ "product_id": mug, "quantity": quantity })),
        )
        .await?;
        assert_eq!(added.status, StatusCode::OK);
    }
    let added = send(
        &app,
        Method::POST,
        "/api/cart",
        auth,
        Some(json!({ "product_id": tote, "quantity": 1 })),
    )
    .await?;
    assert_eq!(added.body["data"]["quantity"], 1);

    let cart = send(&app, Method::GET, "/api/cart", auth, None).await?;
    assert_eq!(cart.status, StatusCode::OK);
    let data = &cart.body["data"];
    assert_eq!(data["products"][0]["quantity"], 5);
    assert_eq!(data["products"][0]["price"], "12.50");
    assert_eq!(data["products"][0]["subtotal"], "62.50");
    assert_eq!(data["subtotal"], "82.49");
    assert_eq!(data["shipping"], "5.00");
    assert_eq!(data["tax"], "8.249");
    assert_eq!(data["total"], "95.739");
    assert_eq!(cart.body["meta"]["count"], 2);

    let count = send(&app, Method::GET, "/api/cart/count", auth, None).await?;
    assert_eq!(count.body["data"]["count"], 6);

    let updated = send(
        &app,
        Method::PUT,
        &format!("/api/cart/{mug}"),
        auth,
        Some(json!({ "quantity": 1 })),
    )
    .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["quantity"], 1);

    let line = send(&app, Method::GET, &format!("/api/cart/{mug}"), auth, None).await?;
    assert_eq!(line.body["data"]["subtotal"], "12.50");

    for _ in 0..2 {
        let removed = send(&app, Method::DELETE, &format!("/api/cart/{tote}"), auth, None).await?;
        assert_eq!(removed.status, StatusCode::OK);
    }

    let cart = send(&app, Method::GET, "/api/cart", auth, None).await?;
    assert_eq!(cart.body["data"]["subtotal"], "12.50");
    assert_eq!(cart.body["data"]["tax"], "1.25");
    assert_eq!(cart.body["data"]["total"], "18.75");

    let logout = send(&app, Method::POST, "/api/auth/logout", auth, None).await?;
    assert_eq!(logout.status, StatusCode::OK);
    assert!(logout.set_cookie.is_some_and(|c| c.starts_with("session_token=;")));

    let after = send(&app, Method::GET, "/api/cart", auth, None).await?;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn bearer_header_is_accepted() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(app_state(&store));
    let cookie = register_and_login(&app, "bearer@example.com").await?;
    let token = cookie.trim_start_matches("session_token=");

    let request = Request::builder()
        .uri("/api/cart/count")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn empty_cookie_falls_back_to_bearer_header() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(app_state(&store));
    let cookie = register_and_login(&app, "cleared@example.com").await?;
    let token = cookie.trim_start_matches("session_token=");

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, "session_token=")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, "session_token=")
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_the_session_cookie() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(app_state(&store));
    let old = register_and_login(&app, "rotate@example.com").await?;

    let refreshed = send(&app, Method::POST, "/api/auth/refresh", Some(&old), None).await?;
    assert_eq!(refreshed.status, StatusCode::OK);
    let new = session_pair(&refreshed.set_cookie.expect("refresh sets a cookie"));
    assert_ne!(new, old);

    let stale = send(&app, Method::GET, "/api/auth/me", Some(&old), None).await?;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let fresh = send(&app, Method::GET, "/api/auth/me", Some(&new), None).await?;
    assert_eq!(fresh.status, StatusCode::OK);
    assert_eq!(fresh.body["data"]["email"], "rotate@example.com");
    Ok(())
}

#[tokio::test]
async fn cart_requires_a_session() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(app_state(&store));

    let missing = send(&app, Method::GET, "/api/cart", None, None).await?;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let malformed = send(&app, Method::GET, "/api/cart", Some("session_token=nope"), None).await?;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);

    let unknown = format!("session_token={}", Uuid::new_v4());
    let unknown = send(&app, Method::GET, "/api/cart", Some(&unknown), None).await?;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["message"], "session does not exist");
    Ok(())
}

#[tokio::test]
async fn cart_errors_map_to_client_statuses() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mug = seed_product(&store, "Mug", "12.50").await;
    let app = build_app(app_state(&store));
    let cookie = register_and_login(&app, "errors@example.com").await?;
    let auth = Some(cookie.as_str());

    let zero = send(
        &app,
        Method::POST,
        "/api/cart",
        auth,
        Some(json!({ "product_id": mug, "quantity": 0 })),
    )
    .await?;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    for (quantity, status) in [(i32::MAX, StatusCode::OK), (1, StatusCode::BAD_REQUEST)] {
        let added = send(
            &app,
            Method::POST,
            "/api/cart",
            auth,
            Some(json!({ "product_id": mug, "quantity": quantity })),
        )
        .await?;
        assert_eq!(added.status, status);
    }
    let line = send(&app, Method::GET, &format!("/api/cart/{mug}"), auth, None).await?;
    assert_eq!(line.body["data"]["quantity"], i32::MAX);
    send(&app, Method::DELETE, &format!("/api/cart/{mug}"), auth, None).await?;

    let unknown_product = send(
        &app,
        Method::POST,
        "/api/cart",
        auth,
        Some(json!({ "product_id": Uuid::new_v4(), "quantity": 1 })),
    )
    .await?;
    assert_eq!(unknown_product.status, StatusCode::NOT_FOUND);

    let absent_line = send(
        &app,
        Method::PUT,
        &format!("/api/cart/{mug}"),
        auth,
        Some(json!({ "quantity": 4 })),
    )
    .await?;
    assert_eq!(absent_line.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn store_outage_returns_service_unavailable() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(app_state(&store));
    let cookie = register_and_login(&app, "outage@example.com").await?;

    store.set_offline(true);
    let response = send(&app, Method::GET, "/api/cart", Some(&cookie), None).await?;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["message"], "Service Unavailable");
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_and_bad_password_are_rejected() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(app_state(&store));
    register_and_login(&app, "dup@example.com").await?;

    let again = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "DUP@example.com", "password": "x" })),
    )
    .await?;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let wrong = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "dup@example.com", "password": "wrong" })),
    )
    .await?;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert!(wrong.set_cookie.is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_routes_fall_through_to_not_found() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(app_state(&store));

    let response = send(&app, Method::GET, "/nope", None, None).await?;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["data"]["path"], "/nope");
    Ok(())
}
