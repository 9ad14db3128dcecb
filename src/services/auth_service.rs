use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, RegisterRequest},
    error::{AppError, AppResult, UserError},
    models::User,
    store::{NewUser, UserStore},
};

pub async fn register_user(users: &dyn UserStore, payload: RegisterRequest) -> AppResult<User> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;
    let email = email.trim().to_lowercase();
    if name.trim().is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "name, email and password are required".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user = users
        .create_user(NewUser {
            name: name.trim().to_string(),
            email,
            password_hash,
        })
        .await
        .map_err(UserError::from)?
        .ok_or(UserError::EmailTaken)?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Checks credentials and returns the matching user.
pub async fn verify_login(users: &dyn UserStore, payload: LoginRequest) -> AppResult<User> {
    let LoginRequest { email, password } = payload;
    let user = users
        .find_user_by_email(&email.trim().to_lowercase())
        .await
        .map_err(UserError::from)?
        .ok_or(UserError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(UserError::InvalidCredentials.into());
    }

    Ok(user)
}

pub async fn current_user(users: &dyn UserStore, user_id: Uuid) -> AppResult<User> {
    let user = users
        .find_user_by_id(user_id)
        .await
        .map_err(UserError::from)?
        .ok_or(UserError::NotFound)?;
    Ok(user)
}
