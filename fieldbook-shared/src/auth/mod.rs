/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: Access and password-reset tokens
/// - [`middleware`]: Bearer token verification into an [`middleware::AuthContext`]
/// - [`authorization`]: Role and ownership gates
///
/// # Example
///
/// ```no_run
/// use fieldbook_shared::auth::password::{hash_password, verify_password};
/// use fieldbook_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::access(Uuid::new_v4()), "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
