/// Bearer-token authentication
///
/// Resolves the `Authorization: Bearer <token>` header of a request to the
/// calling user. The API crate wraps [`authenticate`] in an axum middleware
/// that inserts the resulting [`AuthContext`] into the request extensions.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use fieldbook_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User {} ({})", auth.user_id, auth.role.as_str())
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::UserRole;
use crate::repository::{StoreError, UserRepository};

/// Identity of the authenticated caller
///
/// Role is read from the stored user on every request, so a role change
/// takes effect without reissuing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on the request
    #[error("Not authorized, no token")]
    MissingCredentials,

    /// Malformed, tampered, expired or wrong-kind token
    #[error("Not authorized, invalid token")]
    InvalidToken(#[source] JwtError),

    /// Token is valid but its user no longer exists
    #[error("User not found")]
    UnknownUser,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies the request's bearer token and loads its user
///
/// # Errors
///
/// - `MissingCredentials` when there is no usable bearer header
/// - `InvalidToken` when the signature, issuer, expiry or kind is wrong
/// - `UnknownUser` when the subject has been deleted
pub async fn authenticate(
    users: &dyn UserRepository,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingCredentials)?;

    let claims = validate_access_token(token, secret).map_err(AuthError::InvalidToken)?;

    let user = users
        .find_by_id(claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    tracing::debug!(user_id = %user.id, role = user.role.as_str(), "Authenticated request");
    Ok(AuthContext::new(user.id, user.role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};
    use crate::models::user::CreateUser;
    use crate::repository::memory::MemoryStore;
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "middleware-test-secret-at-least-32-bytes";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn stored_admin(store: &MemoryStore) -> Uuid {
        UserRepository::create(
            store,
            CreateUser {
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Admin,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_valid_token_resolves_stored_role() {
        let store = MemoryStore::new();
        let id = stored_admin(&store).await;
        let token = create_token(&Claims::access(id), SECRET).unwrap();

        let ctx = authenticate(&store, SECRET, &headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap();

        assert_eq!(ctx, AuthContext::new(id, UserRole::Admin));
        assert!(ctx.is_admin());
    }

    #[tokio::test]
    async fn test_missing_and_expired_tokens() {
        let store = MemoryStore::new();
        let id = stored_admin(&store).await;

        let err = authenticate(&store, SECRET, &HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        let expired = Claims::with_expiration(id, TokenType::Access, Duration::seconds(-60));
        let token = create_token(&expired, SECRET).unwrap();
        let err = authenticate(&store, SECRET, &headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(JwtError::Expired)));
    }

    #[tokio::test]
    async fn test_deleted_user_is_rejected() {
        let store = MemoryStore::new();
        let token = create_token(&Claims::access(Uuid::new_v4()), SECRET).unwrap();

        let err = authenticate(&store, SECRET, &headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownUser));
    }
}
