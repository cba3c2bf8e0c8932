/// Own-profile endpoints for any signed-in user
///
/// # Endpoints
///
/// - `GET /api/clients` - Current user
/// - `PUT /api/clients` - Update own profile fields

use axum::{extract::State, Extension, Json};
use fieldbook_shared::{
    auth::middleware::AuthContext,
    models::user::{UpdateUser, User},
    services::audit,
};
use serde::Deserialize;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};

/// Editable profile fields
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
}

impl ProfileRequest {
    /// Every provided field, empty strings included
    pub fn into_update(self) -> UpdateUser {
        UpdateUser {
            name: self.name,
            mobile_number: self.mobile_number,
            address: self.address,
            country: self.country,
            state: self.state,
            ..Default::default()
        }
    }

    /// Provided fields with empty strings dropped
    pub fn into_non_empty_update(self) -> UpdateUser {
        let keep = |value: Option<String>| value.filter(|v| !v.is_empty());

        UpdateUser {
            name: keep(self.name),
            mobile_number: keep(self.mobile_number),
            address: keep(self.address),
            country: keep(self.country),
            state: keep(self.state),
            ..Default::default()
        }
    }
}

/// Returns the signed-in user
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = state
        .repos
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Updates the signed-in user's profile
///
/// Empty strings are ignored, so a field can't be cleared here.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .repos
        .users
        .update_by_id(auth.user_id, req.into_non_empty_update())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    audit::record(
        state.repos.logs.as_ref(),
        auth.user_id,
        format!("Updated profile: {}", user.email),
    )
    .await;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_update_drops_blank_fields() {
        let req = ProfileRequest {
            name: Some("Wanjiru".to_string()),
            address: Some(String::new()),
            ..Default::default()
        };

        let update = req.into_non_empty_update();
        assert_eq!(update.name.as_deref(), Some("Wanjiru"));
        assert!(update.address.is_none());
        assert!(update.email.is_none());
        assert!(update.role.is_none());
    }

    #[test]
    fn test_full_update_keeps_blank_fields() {
        let req: ProfileRequest =
            serde_json::from_str(r#"{"mobileNumber": "", "country": "Kenya"}"#).unwrap();

        let update = req.into_update();
        assert_eq!(update.mobile_number.as_deref(), Some(""));
        assert_eq!(update.country.as_deref(), Some("Kenya"));
        assert!(update.name.is_none());
    }
}
