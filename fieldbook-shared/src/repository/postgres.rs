/// PostgreSQL repositories
///
/// Thin adapters from the repository traits onto the model functions in
/// [`crate::models`]. All queries share one connection pool.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    CropFilter, CropRepository, DashboardFilter, DashboardRepository, EventFilter,
    EventRepository, FarmFilter, FarmHealthRepository, FarmRepository, FindOptions,
    LogRepository, StoreHealth, StoreResult, UserRepository,
};
use crate::models::crop::{CreateCrop, Crop, UpdateCrop};
use crate::models::dashboard::{CreateDashboard, Dashboard, UpdateDashboard};
use crate::models::event::{CreateEvent, Event};
use crate::models::farm::{CreateFarm, Farm, UpdateFarm};
use crate::models::farm_health::{CreateFarmHealth, FarmHealth, UpdateFarmHealth};
use crate::models::log::{CreateLog, Log};
use crate::models::user::{CreateUser, UpdateUser, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find(&self, options: FindOptions) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool, options).await?)
    }

    async fn update_by_id(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl FarmRepository for PgStore {
    async fn create(&self, data: CreateFarm) -> StoreResult<Farm> {
        Ok(Farm::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Farm>> {
        Ok(Farm::find_by_id(&self.pool, id).await?)
    }

    async fn find(&self, filter: &FarmFilter, options: FindOptions) -> StoreResult<Vec<Farm>> {
        Ok(Farm::list(&self.pool, filter, options).await?)
    }

    async fn count(&self, filter: &FarmFilter) -> StoreResult<i64> {
        Ok(Farm::count(&self.pool, filter).await?)
    }

    async fn update_by_id(&self, id: Uuid, data: UpdateFarm) -> StoreResult<Option<Farm>> {
        Ok(Farm::update(&self.pool, id, data).await?)
    }

    async fn add_crop(&self, farm_id: Uuid, crop_id: Uuid) -> StoreResult<bool> {
        Ok(Farm::push_crop(&self.pool, farm_id, crop_id).await?)
    }

    async fn remove_crop(&self, farm_id: Uuid, crop_id: Uuid) -> StoreResult<bool> {
        Ok(Farm::pull_crop(&self.pool, farm_id, crop_id).await?)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        if Farm::find_by_id(&self.pool, id).await?.is_none() {
            return Ok(false);
        }

        let crops = Crop::delete_by_farm(&self.pool, id).await?;
        let deleted = Farm::delete(&self.pool, id).await?;

        tracing::debug!(farm_id = %id, crops, "Deleted farm and its crops");
        Ok(deleted)
    }
}

#[async_trait]
impl CropRepository for PgStore {
    async fn create(&self, data: CreateCrop) -> StoreResult<Crop> {
        Ok(Crop::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Crop>> {
        Ok(Crop::find_by_id(&self.pool, id).await?)
    }

    async fn find(&self, filter: &CropFilter, options: FindOptions) -> StoreResult<Vec<Crop>> {
        Ok(Crop::list(&self.pool, filter, options).await?)
    }

    async fn find_first_by_farm(&self, farm_id: Uuid) -> StoreResult<Option<Crop>> {
        let filter = CropFilter {
            farm_id: Some(farm_id),
            ids: None,
        };
        let mut crops = Crop::list(&self.pool, &filter, FindOptions::oldest_first().limit(1)).await?;
        Ok(crops.pop())
    }

    async fn update_by_id(&self, id: Uuid, data: UpdateCrop) -> StoreResult<Option<Crop>> {
        Ok(Crop::update(&self.pool, id, data).await?)
    }

    async fn delete_in_farm(&self, id: Uuid, farm_id: Uuid) -> StoreResult<Option<Crop>> {
        Ok(Crop::delete_in_farm(&self.pool, id, farm_id).await?)
    }

    async fn delete_by_farm(&self, farm_id: Uuid) -> StoreResult<u64> {
        Ok(Crop::delete_by_farm(&self.pool, farm_id).await?)
    }
}

#[async_trait]
impl DashboardRepository for PgStore {
    async fn create(&self, data: CreateDashboard) -> StoreResult<Dashboard> {
        Ok(Dashboard::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Dashboard>> {
        Ok(Dashboard::find_by_id(&self.pool, id).await?)
    }

    async fn find(
        &self,
        filter: &DashboardFilter,
        options: FindOptions,
    ) -> StoreResult<Vec<Dashboard>> {
        Ok(Dashboard::list(&self.pool, filter, options).await?)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        data: UpdateDashboard,
    ) -> StoreResult<Option<Dashboard>> {
        Ok(Dashboard::update(&self.pool, id, data).await?)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Dashboard::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl FarmHealthRepository for PgStore {
    async fn create(&self, data: CreateFarmHealth) -> StoreResult<FarmHealth> {
        Ok(FarmHealth::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<FarmHealth>> {
        Ok(FarmHealth::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_farm(&self, farm_id: Uuid) -> StoreResult<Option<FarmHealth>> {
        Ok(FarmHealth::find_by_farm(&self.pool, farm_id).await?)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        data: UpdateFarmHealth,
    ) -> StoreResult<Option<FarmHealth>> {
        Ok(FarmHealth::update(&self.pool, id, data).await?)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        Ok(FarmHealth::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl EventRepository for PgStore {
    async fn create(&self, data: CreateEvent) -> StoreResult<Event> {
        Ok(Event::create(&self.pool, data).await?)
    }

    async fn find(&self, filter: &EventFilter, options: FindOptions) -> StoreResult<Vec<Event>> {
        Ok(Event::list(&self.pool, filter, options).await?)
    }
}

#[async_trait]
impl LogRepository for PgStore {
    async fn create(&self, data: CreateLog) -> StoreResult<Log> {
        Ok(Log::create(&self.pool, data).await?)
    }

    async fn find(&self, options: FindOptions) -> StoreResult<Vec<Log>> {
        Ok(Log::list(&self.pool, options).await?)
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}
