/// Request extractors whose rejections render as [`ApiError`]
///
/// Axum's own `Json`, `Path` and `Query` reject with plain-text bodies.
/// These wrappers keep every error in the `{"message": ...}` shape and turn
/// unreadable input into `400`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::{ApiError, PasswordFlowError};

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// JSON body of the password reset routes, rejected as `{"error": ...}`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(PasswordFlowError))]
pub struct PasswordJson<T>(pub T);
