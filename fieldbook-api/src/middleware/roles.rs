/// Role gates
///
/// Route-group middleware that runs after authentication and before any
/// handler. Each gate requires an exact role; admins do not pass the client
/// gate.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use fieldbook_api::middleware::roles::require_admin;
///
/// async fn list_logs() -> &'static str { "[]" }
///
/// let admin_routes: Router = Router::new()
///     .route("/logs", get(list_logs))
///     .route_layer(middleware::from_fn(require_admin));
/// ```

use axum::{extract::Request, middleware::Next, response::Response, Extension};
use fieldbook_shared::{
    auth::{authorization::require_role, middleware::AuthContext},
    models::user::UserRole,
};

use crate::error::ApiError;

/// Lets only admins through
pub async fn require_admin(
    Extension(auth): Extension<AuthContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&auth, UserRole::Admin).map_err(|_| {
        tracing::warn!(user_id = %auth.user_id, role = auth.role.as_str(), "Admin route denied");
        ApiError::Forbidden("Not authorized".to_string())
    })?;

    Ok(next.run(req).await)
}

/// Lets only clients through
pub async fn require_client(
    Extension(auth): Extension<AuthContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&auth, UserRole::Client)
        .map_err(|_| ApiError::Forbidden("Access denied. Clients only.".to_string()))?;

    Ok(next.run(req).await)
}
