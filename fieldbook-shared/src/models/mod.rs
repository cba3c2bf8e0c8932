/// Database models for Fieldbook
///
/// Each model owns its row type, its create/update inputs and the raw SQL
/// that reads and writes it. Repositories in [`crate::repository`] wrap
/// these functions behind traits.
///
/// # Models
///
/// - `user`: Accounts (clients and admins)
/// - `farm`: Farms owned by a user, with their crop id list
/// - `crop`: Crops planted on a farm
/// - `dashboard`: Per-farm overview cards
/// - `farm_health`: Pest, nutrient and disease assessments
/// - `event`: Personal calendar entries
/// - `log`: Append-only audit trail
///
/// # Example
///
/// ```no_run
/// use fieldbook_shared::models::farm::{CreateFarm, Farm};
/// use fieldbook_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let farm = Farm::create(&pool, CreateFarm {
///     user_id: owner,
///     name: "North field".to_string(),
///     ..Default::default()
/// }).await?;
/// assert!(farm.crops.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod crop;
pub mod dashboard;
pub mod de;
pub mod event;
pub mod farm;
pub mod farm_health;
pub mod log;
pub mod user;
