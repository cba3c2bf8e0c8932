/// Password reset endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/forgot-password` - Email a one-hour reset link
/// - `POST /api/auth/reset-password` - Set a new password with that link's token
///
/// Both answer errors as `{"error": ...}` rather than `{"message": ...}`.

use axum::{extract::State, Json};
use fieldbook_shared::{
    auth::{jwt, password},
    mail::password_reset_email,
    models::user::UpdateUser,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{app::AppState, error::PasswordFlowError, extract::PasswordJson};

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub new_password: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Sends a password reset link to the account's email
///
/// # Errors
///
/// - `400`: `{"error": "Email is required"}`
/// - `404`: `{"error": "User not found"}`
pub async fn forgot_password(
    State(state): State<AppState>,
    PasswordJson(req): PasswordJson<ForgotPasswordRequest>,
) -> Result<Json<Value>, PasswordFlowError> {
    let email =
        non_empty(req.email).ok_or_else(|| PasswordFlowError::bad_request("Email is required"))?;

    let user = state
        .repos
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| PasswordFlowError::not_found("User not found"))?;

    let token = jwt::create_token(
        &jwt::Claims::password_reset(user.id, user.email.clone()),
        state.jwt_secret(),
    )?;
    let reset_link = state.config.reset_link(&token);
    let html = password_reset_email(&user.name, &reset_link);

    // Delivery problems are logged only; the response stays the same
    if let Err(e) = state
        .mailer
        .send(&user.email, "Password Reset Request", &html)
        .await
    {
        tracing::error!(user_id = %user.id, error = %e, "Failed to send password reset email");
    }

    tracing::info!(user_id = %user.id, "Password reset link issued");
    Ok(Json(json!({ "message": "Password reset link sent successfully" })))
}

/// Replaces the password of the user named by a reset token
///
/// # Errors
///
/// - `400`: `{"error": "Token and new password are required"}`
/// - `400`: `{"error": "Invalid or expired token"}` (also for access tokens)
/// - `404`: `{"error": "User not found"}`
pub async fn reset_password(
    State(state): State<AppState>,
    PasswordJson(req): PasswordJson<ResetPasswordRequest>,
) -> Result<Json<Value>, PasswordFlowError> {
    let (Some(token), Some(new_password)) = (non_empty(req.token), non_empty(req.new_password))
    else {
        return Err(PasswordFlowError::bad_request(
            "Token and new password are required",
        ));
    };

    let claims = jwt::validate_reset_token(&token, state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected password reset token");
        PasswordFlowError::bad_request("Invalid or expired token")
    })?;

    let password_hash = password::hash_password(&new_password)?;

    state
        .repos
        .users
        .update_by_id(
            claims.sub,
            UpdateUser {
                password_hash: Some(password_hash),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| PasswordFlowError::not_found("User not found"))?;

    tracing::info!(user_id = %claims.sub, "Password reset");
    Ok(Json(json!({ "message": "Password reset successfully" })))
}
