/// Admin user management and admin profile
///
/// # Endpoints
///
/// - `GET /api/admin` - Every user
/// - `POST /api/admin/register` - Create a user with any role
/// - `PUT /api/admin/:id` - Update any user
/// - `DELETE /api/admin/:id` - Delete a user
/// - `GET /api/admin/profile` - Caller's own admin profile
/// - `PUT /api/admin/profile` - Update the caller's own admin profile
///
/// The profile routes sit outside the admin route group and check the role
/// themselves, answering `403 "Access denied. Admins only."`.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use fieldbook_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{UpdateUser, User, UserRole},
    repository::{FindOptions, StoreError},
    services::audit,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::{auth::create_account, clients::ProfileRequest};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// Any user field an admin may change
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New plaintext password; stored hashed
    pub password: Option<String>,

    pub role: Option<UserRole>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
}

fn admins_only(auth: &AuthContext) -> ApiResult<()> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden("Access denied. Admins only.".to_string()));
    }
    Ok(())
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state.repos.users.find(FindOptions::oldest_first()).await?;
    Ok(Json(users))
}

/// Creates a user; `role` defaults to client
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<RegisteredUser>)> {
    req.validate()?;

    let user = create_account(
        &state,
        req.name,
        req.email,
        &req.password,
        req.role.unwrap_or_default(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }),
    ))
}

/// Updates the provided fields of any user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let password_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
        Some(plain) => Some(password::hash_password(plain)?),
        None => None,
    };

    let update = UpdateUser {
        name: req.name,
        email: req.email,
        password_hash,
        role: req.role,
        mobile_number: req.mobile_number,
        address: req.address,
        country: req.country,
        state: req.state,
    };

    let user = state
        .repos
        .users
        .update_by_id(id, update)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => ApiError::BadRequest("User already exists".to_string()),
            other => other.into(),
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    audit::record(
        state.repos.logs.as_ref(),
        auth.user_id,
        format!("Updated user: {}", user.email),
    )
    .await;

    Ok(Json(user))
}

/// Deletes a user; their farms and other records are kept
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let user = state
        .repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !state.repos.users.delete_by_id(user.id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    audit::record(
        state.repos.logs.as_ref(),
        auth.user_id,
        format!("Deleted user: {}", user.email),
    )
    .await;

    tracing::info!(user_id = %user.id, admin_id = %auth.user_id, "User deleted");
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// Returns the calling admin
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    admins_only(&auth)?;

    let admin = state
        .repos
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))?;

    Ok(Json(admin))
}

/// Updates the calling admin's profile fields
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> ApiResult<Json<User>> {
    admins_only(&auth)?;

    let admin = state
        .repos
        .users
        .update_by_id(auth.user_id, req.into_update())
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))?;

    audit::record(
        state.repos.logs.as_ref(),
        auth.user_id,
        format!("Updated profile: {}", admin.email),
    )
    .await;

    Ok(Json(admin))
}
