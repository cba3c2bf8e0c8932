/// Access policy checks
///
/// Two gates guard every mutation:
///
/// 1. **Role gate**: the caller's role must equal the required role
/// 2. **Ownership gate**: the caller must own the resource or be an admin
///
/// Both run before any write and short-circuit on failure.
///
/// # Example
///
/// ```no_run
/// use fieldbook_shared::auth::authorization::{authorize_farm_edit, AuthzError};
/// use fieldbook_shared::auth::middleware::AuthContext;
/// use fieldbook_shared::repository::Repositories;
/// use uuid::Uuid;
///
/// async fn rename(repos: &Repositories, ctx: &AuthContext, farm_id: Uuid) -> Result<(), AuthzError> {
///     let farm = authorize_farm_edit(repos.farms.as_ref(), ctx, farm_id).await?;
///     println!("{} may edit {}", ctx.user_id, farm.name);
///     Ok(())
/// }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::farm::Farm;
use crate::models::user::UserRole;
use crate::repository::{FarmRepository, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role differs from the required one
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole { required: UserRole, actual: UserRole },

    /// Caller neither owns the resource nor is an admin
    #[error("Not authorized")]
    NotOwner,

    #[error("Farm not found")]
    FarmNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Passes when the caller has exactly `required`
pub fn require_role(ctx: &AuthContext, required: UserRole) -> Result<(), AuthzError> {
    if ctx.role != required {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: ctx.role,
        });
    }

    Ok(())
}

/// Passes when the caller is `owner_id` or an admin
pub fn require_owner_or_admin(ctx: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    if ctx.user_id == owner_id || ctx.is_admin() {
        return Ok(());
    }

    tracing::debug!(
        user_id = %ctx.user_id,
        owner_id = %owner_id,
        "Ownership check failed"
    );
    Err(AuthzError::NotOwner)
}

/// Loads a farm and applies the ownership gate to it
///
/// # Errors
///
/// - `FarmNotFound` when no farm has this id
/// - `NotOwner` when the caller may not edit it
pub async fn authorize_farm_edit(
    farms: &dyn FarmRepository,
    ctx: &AuthContext,
    farm_id: Uuid,
) -> Result<Farm, AuthzError> {
    let farm = farms
        .find_by_id(farm_id)
        .await?
        .ok_or(AuthzError::FarmNotFound)?;

    require_owner_or_admin(ctx, farm.user_id)?;

    Ok(farm)
}
