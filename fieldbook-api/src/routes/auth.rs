/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new client account
/// - `POST /api/auth/login` - Login and get an access token
/// - `POST /api/auth/logout` - Acknowledge logout (tokens are stateless)
///
/// Password reset lives in [`super::password`].

use axum::{extract::State, http::StatusCode, Json};
use fieldbook_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, UserRole},
    repository::StoreError,
    services::audit,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,

    /// Access token (30d)
    pub token: String,
}

/// Creates a user account, rejecting emails already in use
///
/// Shared by public registration and admin registration. The audit entry is
/// attributed to the new user.
pub(crate) async fn create_account(
    state: &AppState,
    name: String,
    email: String,
    plain_password: &str,
    role: UserRole,
) -> ApiResult<fieldbook_shared::models::user::User> {
    let already_exists = || ApiError::BadRequest("User already exists".to_string());

    if state.repos.users.find_by_email(&email).await?.is_some() {
        return Err(already_exists());
    }

    let password_hash = password::hash_password(plain_password)?;

    let user = state
        .repos
        .users
        .create(CreateUser {
            name,
            email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => already_exists(),
            other => other.into(),
        })?;

    audit::record(
        state.repos.logs.as_ref(),
        user.id,
        format!("Registered new user: {}", user.email),
    )
    .await;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");
    Ok(user)
}

/// Register a new user
///
/// Public registration always creates a client; admins are created through
/// `POST /api/admin/register`.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Alice",
///   "email": "alice@example.com",
///   "password": "maize-2025"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"message": "User registered successfully"}`
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or the email is taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate()?;

    create_account(&state, req.name, req.email, &req.password, UserRole::Client).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "maize-2025"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "name": "Alice",
///   "email": "alice@example.com",
///   "role": "client",
///   "token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown email or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let invalid = || ApiError::BadRequest("Invalid email or password".to_string());

    let user = state
        .repos
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let token = jwt::create_token(&jwt::Claims::access(user.id), state.jwt_secret())?;

    audit::record(
        state.repos.logs.as_ref(),
        user.id,
        format!("User logged in: {}", user.email),
    )
    .await;

    Ok(Json(LoginResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        token,
    }))
}

/// Logout endpoint
///
/// Tokens are not tracked server-side; the client discards its token.
pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logout successful" }))
}
