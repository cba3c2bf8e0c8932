/// API route handlers
///
/// Handlers are grouped by resource and by who may call them:
///
/// - `health`, `auth`, `password`: public
/// - `clients`, `dashboard`, `farm_health`, `events`: any signed-in user
/// - `client_farms`, `client_crops`: clients
/// - `admin_farms`, `admin_users`, `admin_dashboard`, `admin_farm_health`, `logs`: admins

pub mod admin_dashboard;
pub mod admin_farm_health;
pub mod admin_farms;
pub mod admin_users;
pub mod auth;
pub mod client_crops;
pub mod client_farms;
pub mod clients;
pub mod dashboard;
pub mod events;
pub mod farm_health;
pub mod health;
pub mod logs;
pub mod password;
