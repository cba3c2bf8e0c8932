/// Error handling for the API server
///
/// All handlers return `Result<T, ApiError>`, which converts to a status
/// code and a `{"message": ...}` body. Errors from the shared crate convert
/// into `ApiError` through `From`, so handlers can use `?` throughout.
///
/// The password reset routes answer with `{"error": ...}` instead; they
/// return [`PasswordFlowError`].
///
/// # Example
///
/// ```
/// use fieldbook_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(found: bool) -> ApiResult<Json<serde_json::Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Farm not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fieldbook_shared::{
    auth::{authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError},
    repository::StoreError,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Request body failed validation (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Storage backend failure (500)
    Storage(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients; server-side details are logged here
    fn public_message(self) -> (String, Option<Vec<ValidationErrorDetail>>) {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => (msg, None),
            ApiError::ValidationError(errors) => {
                ("Request validation failed".to_string(), Some(errors))
            }
            ApiError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                ("Server error".to_string(), None)
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Storage(msg) => write!(f, "Storage error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details) = self.public_message();

        (status, Json(ErrorResponse { message, details })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::Duplicate(_) => ApiError::BadRequest("Duplicate value".to_string()),
            StoreError::Storage(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    }
}

/// Convert authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(err) => err.into(),
            AuthError::InvalidToken(ref source) => {
                tracing::debug!(error = %source, "Rejected bearer token");
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::MissingCredentials | AuthError::UnknownUser => {
                ApiError::Unauthorized(err.to_string())
            }
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::InsufficientRole { .. } | AuthzError::NotOwner => {
                ApiError::Forbidden("Not authorized".to_string())
            }
            AuthzError::FarmNotFound => ApiError::NotFound("Farm not found".to_string()),
            AuthzError::Store(err) => err.into(),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            _ => ApiError::Unauthorized("Not authorized, invalid token".to_string()),
        }
    }
}

/// Unreadable JSON bodies answer 400 instead of axum's plain-text 415/422
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameter");
        ApiError::BadRequest("Invalid id".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

/// Error of the forgot/reset password routes, rendered as `{"error": ...}`
#[derive(Debug)]
pub struct PasswordFlowError(pub ApiError);

impl PasswordFlowError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(ApiError::BadRequest(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self(ApiError::NotFound(message.into()))
    }
}

impl IntoResponse for PasswordFlowError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let (message, _) = self.0.public_message();

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ApiError> for PasswordFlowError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for PasswordFlowError {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.into())
    }
}

impl From<StoreError> for PasswordFlowError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

impl From<PasswordError> for PasswordFlowError {
    fn from(err: PasswordError) -> Self {
        Self(err.into())
    }
}

impl From<JwtError> for PasswordFlowError {
    fn from(err: JwtError) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[tokio::test]
    async fn test_path_rejection_is_json_bad_request() {
        use axum::{body::Body, extract::Path, http::Request, routing::get, Router};
        use tower::Service as _;
        use uuid::Uuid;

        async fn handler(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<String> {
            let Path(id) = path?;
            Ok(id.to_string())
        }

        let mut app: Router = Router::new().route("/farms/:id", get(handler));
        let response = app
            .call(Request::get("/farms/not-a-uuid").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid id");
    }

    #[test]
    fn test_store_error_mapping() {
        assert_eq!(
            ApiError::from(StoreError::NotFound("Farm")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Validation("size".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Duplicate("email".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Storage("down".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_policy_errors() {
        let err = ApiError::from(AuthzError::NotOwner);
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == "Not authorized"));

        let err = ApiError::from(AuthzError::FarmNotFound);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Farm not found"));

        let err = ApiError::from(AuthError::MissingCredentials);
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Not authorized, no token"));

        let err = ApiError::from(AuthError::InvalidToken(JwtError::Expired));
        assert!(
            matches!(err, ApiError::Unauthorized(ref m) if m == "Not authorized, invalid token")
        );
    }

    #[tokio::test]
    async fn test_storage_details_are_hidden() {
        let response = ApiError::Storage("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Server error");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_body_has_details() {
        let response = ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        }])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_password_flow_uses_error_key() {
        let response = PasswordFlowError::not_found("User not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "User not found" }));
    }
}
