/// Storage access behind per-entity traits
///
/// Handlers and services only see the traits in this module. Two
/// implementations exist:
///
/// - [`postgres::PgStore`]: production storage on top of the model SQL
/// - [`memory::MemoryStore`]: in-process storage used by the test-suite
///
/// Relations between records are plain ids. The single cascade rule lives
/// in [`FarmRepository::delete_by_id`]: deleting a farm deletes its crops
/// and nothing else.
///
/// # Example
///
/// ```
/// use fieldbook_shared::repository::{FindOptions, Repositories};
/// use fieldbook_shared::models::farm::CreateFarm;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), fieldbook_shared::repository::StoreError> {
/// let repos = Repositories::in_memory();
/// let farm = repos.farms.create(CreateFarm {
///     user_id: Uuid::new_v4(),
///     name: "North field".to_string(),
///     ..Default::default()
/// }).await?;
///
/// let found = repos.farms.find_by_id(farm.id).await?;
/// assert_eq!(found.map(|f| f.name), Some("North field".to_string()));
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::crop::{CreateCrop, Crop, UpdateCrop};
use crate::models::dashboard::{CreateDashboard, Dashboard, UpdateDashboard};
use crate::models::event::{CreateEvent, Event};
use crate::models::farm::{CreateFarm, Farm, UpdateFarm};
use crate::models::farm_health::{CreateFarmHealth, FarmHealth, UpdateFarmHealth};
use crate::models::log::{CreateLog, Log};
use crate::models::user::{CreateUser, UpdateUser, User};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Referenced record does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Record failed a schema-level check
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unique constraint violated
    #[error("Duplicate value: {0}")]
    Duplicate(String),

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                StoreError::Validation(db.message().to_string())
            }
            _ => StoreError::Storage(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordering by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    /// SQL keyword for `ORDER BY created_at`
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "DESC",
            SortOrder::OldestFirst => "ASC",
        }
    }
}

/// Paging and ordering for `find` queries
///
/// `limit: None` returns every matching record.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions {
    pub skip: i64,
    pub limit: Option<i64>,
    pub sort: SortOrder,
}

impl FindOptions {
    pub fn newest_first() -> Self {
        Self::default()
    }

    pub fn oldest_first() -> Self {
        Self {
            sort: SortOrder::OldestFirst,
            ..Self::default()
        }
    }

    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = skip.max(0);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FarmFilter {
    pub user_id: Option<Uuid>,
}

impl FarmFilter {
    pub fn owned_by(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CropFilter {
    pub farm_id: Option<Uuid>,

    /// Restrict to these ids; `Some(vec![])` matches nothing
    pub ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub user_id: Option<Uuid>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user; fails with [`StoreError::Duplicate`] on an email clash
    async fn create(&self, data: CreateUser) -> StoreResult<User>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Case-insensitive email lookup
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find(&self, options: FindOptions) -> StoreResult<Vec<User>>;
    async fn update_by_id(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>>;
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait FarmRepository: Send + Sync {
    async fn create(&self, data: CreateFarm) -> StoreResult<Farm>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Farm>>;
    async fn find(&self, filter: &FarmFilter, options: FindOptions) -> StoreResult<Vec<Farm>>;
    async fn count(&self, filter: &FarmFilter) -> StoreResult<i64>;
    async fn update_by_id(&self, id: Uuid, data: UpdateFarm) -> StoreResult<Option<Farm>>;

    /// Appends `crop_id` to the farm's crop list; false if the farm is gone
    async fn add_crop(&self, farm_id: Uuid, crop_id: Uuid) -> StoreResult<bool>;

    /// Removes `crop_id` from the farm's crop list; false if the farm is gone
    async fn remove_crop(&self, farm_id: Uuid, crop_id: Uuid) -> StoreResult<bool>;

    /// Deletes the farm and every crop whose `farm_id` matches
    ///
    /// Dashboards and health records of the farm are left untouched.
    /// Returns false (and deletes nothing) when the farm does not exist.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait CropRepository: Send + Sync {
    async fn create(&self, data: CreateCrop) -> StoreResult<Crop>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Crop>>;
    async fn find(&self, filter: &CropFilter, options: FindOptions) -> StoreResult<Vec<Crop>>;

    /// Oldest crop of a farm
    async fn find_first_by_farm(&self, farm_id: Uuid) -> StoreResult<Option<Crop>>;
    async fn update_by_id(&self, id: Uuid, data: UpdateCrop) -> StoreResult<Option<Crop>>;

    /// Deletes the crop only when it belongs to `farm_id`
    async fn delete_in_farm(&self, id: Uuid, farm_id: Uuid) -> StoreResult<Option<Crop>>;
    async fn delete_by_farm(&self, farm_id: Uuid) -> StoreResult<u64>;
}

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn create(&self, data: CreateDashboard) -> StoreResult<Dashboard>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Dashboard>>;
    async fn find(
        &self,
        filter: &DashboardFilter,
        options: FindOptions,
    ) -> StoreResult<Vec<Dashboard>>;
    async fn update_by_id(
        &self,
        id: Uuid,
        data: UpdateDashboard,
    ) -> StoreResult<Option<Dashboard>>;
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait FarmHealthRepository: Send + Sync {
    async fn create(&self, data: CreateFarmHealth) -> StoreResult<FarmHealth>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<FarmHealth>>;

    /// Oldest health record of a farm
    async fn find_by_farm(&self, farm_id: Uuid) -> StoreResult<Option<FarmHealth>>;
    async fn update_by_id(
        &self,
        id: Uuid,
        data: UpdateFarmHealth,
    ) -> StoreResult<Option<FarmHealth>>;
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, data: CreateEvent) -> StoreResult<Event>;
    async fn find(&self, filter: &EventFilter, options: FindOptions) -> StoreResult<Vec<Event>>;
}

#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn create(&self, data: CreateLog) -> StoreResult<Log>;
    async fn find(&self, options: FindOptions) -> StoreResult<Vec<Log>>;
}

/// Liveness probe for the backing store
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

/// Every repository the application uses, shared behind `Arc`s
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub farms: Arc<dyn FarmRepository>,
    pub crops: Arc<dyn CropRepository>,
    pub dashboards: Arc<dyn DashboardRepository>,
    pub farm_health: Arc<dyn FarmHealthRepository>,
    pub events: Arc<dyn EventRepository>,
    pub logs: Arc<dyn LogRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(postgres::PgStore::new(pool)))
    }

    /// Fresh, empty in-process repositories
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(memory::MemoryStore::new()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + FarmRepository
            + CropRepository
            + DashboardRepository
            + FarmHealthRepository
            + EventRepository
            + LogRepository
            + StoreHealth
            + 'static,
    {
        Self {
            users: store.clone(),
            farms: store.clone(),
            crops: store.clone(),
            dashboards: store.clone(),
            farm_health: store.clone(),
            events: store.clone(),
            logs: store.clone(),
            health: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_options_defaults() {
        let options = FindOptions::default();
        assert_eq!(options.skip, 0);
        assert_eq!(options.limit, None);
        assert_eq!(options.sort, SortOrder::NewestFirst);
        assert_eq!(options.sort.sql(), "DESC");
    }

    #[test]
    fn test_find_options_clamps_negative_values() {
        let options = FindOptions::oldest_first().skip(-3).limit(-1);
        assert_eq!(options.skip, 0);
        assert_eq!(options.limit, Some(0));
        assert_eq!(options.sort.sql(), "ASC");
    }
}
