/// Middleware modules for the API server
///
/// - `roles`: Role gates for the client-only and admin-only route groups
///
/// Bearer authentication itself lives in [`crate::app`], next to the router
/// it protects.

pub mod roles;
