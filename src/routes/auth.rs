use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dto::auth::{LoginRequest, RegisterRequest, SessionResponse},
    error::AppResult,
    middleware::auth::{AuthUser, clear_session_cookie, session_cookie},
    models::User,
    response::{ApiResponse, Meta},
    services::auth_service::{current_user, register_user, verify_login},
    state::AppState,
    token::Token,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
}

fn with_session_cookie(state: &AppState, jar: CookieJar, token: &Token) -> CookieJar {
    let max_age = state.sessions.duration().num_seconds();
    jar.add(session_cookie(
        &token.id.to_string(),
        max_age,
        state.cookie_secure,
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Invalid input or email already taken")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = register_user(state.users.as_ref(), payload).await?;
    Ok(Json(ApiResponse::success("User created", user, None)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user and set the session cookie", body = ApiResponse<SessionResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<SessionResponse>>)> {
    let user = verify_login(state.users.as_ref(), payload).await?;
    let token = state.sessions.login(user.id).await?;
    let jar = with_session_cookie(&state, jar, &token);

    Ok((
        jar,
        Json(ApiResponse::success(
            "Logged in",
            SessionResponse::from(token),
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Delete the current session", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse<serde_json::Value>>)> {
    state.sessions.delete_session(user.token_id).await?;
    let jar = jar.add(clear_session_cookie(state.cookie_secure));

    Ok((
        jar,
        Json(ApiResponse::success(
            "Logged out",
            serde_json::json!({}),
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Replace the current session with a new one", body = ApiResponse<SessionResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse<SessionResponse>>)> {
    let token = state.sessions.rotate_session(user.into()).await?;
    let jar = with_session_cookie(&state, jar, &token);

    Ok((
        jar,
        Json(ApiResponse::success(
            "Session refreshed",
            SessionResponse::from(token),
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = current_user(state.users.as_ref(), user.user_id).await?;
    Ok(Json(ApiResponse::success("OK", user, Some(Meta::empty()))))
}
