/// In-process repositories
///
/// Every collection is a `Vec` behind a `tokio::sync::RwLock`, kept in
/// insertion order. Ordering by `created_at` is stable, so records created
/// within the same clock tick still come back in insertion order.
///
/// Used by the test-suite in place of PostgreSQL; the semantics (partial
/// updates, case-insensitive email uniqueness, the farm to crop cascade)
/// match [`super::postgres::PgStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CropFilter, CropRepository, DashboardFilter, DashboardRepository, EventFilter,
    EventRepository, FarmFilter, FarmHealthRepository, FarmRepository, FindOptions,
    LogRepository, SortOrder, StoreError, StoreHealth, StoreResult, UserRepository,
};
use crate::models::crop::{CreateCrop, Crop, UpdateCrop};
use crate::models::dashboard::{CreateDashboard, Dashboard, UpdateDashboard};
use crate::models::event::{CreateEvent, Event};
use crate::models::farm::{CreateFarm, Farm, UpdateFarm};
use crate::models::farm_health::{CreateFarmHealth, FarmHealth, UpdateFarmHealth};
use crate::models::log::{CreateLog, Log};
use crate::models::user::{CreateUser, UpdateUser, User};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    farms: RwLock<Vec<Farm>>,
    crops: RwLock<Vec<Crop>>,
    dashboards: RwLock<Vec<Dashboard>>,
    farm_health: RwLock<Vec<FarmHealth>>,
    events: RwLock<Vec<Event>>,
    logs: RwLock<Vec<Log>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Email comparison matching the `LOWER(email)` index
fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Sorts by creation time, then applies skip and limit
fn paginate<T>(
    mut items: Vec<T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    options: FindOptions,
) -> Vec<T> {
    items.sort_by_key(|item| created_at(item));
    if options.sort == SortOrder::NewestFirst {
        items.reverse();
    }

    let rest = items.into_iter().skip(options.skip.max(0) as usize);
    match options.limit {
        Some(limit) => rest.take(limit.max(0) as usize).collect(),
        None => rest.collect(),
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| same_email(&u.email, &data.email)) {
            return Err(StoreError::Duplicate(format!("email {}", data.email)));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            mobile_number: None,
            address: None,
            country: None,
            state: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| same_email(&u.email, email))
            .cloned())
    }

    async fn find(&self, options: FindOptions) -> StoreResult<Vec<User>> {
        let users = self.users.read().await.clone();
        Ok(paginate(users, |u| u.created_at, options))
    }

    async fn update_by_id(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(email) = &data.email {
            let taken = users
                .iter()
                .any(|u| u.id != id && same_email(&u.email, email));
            if taken {
                return Err(StoreError::Duplicate(format!("email {}", email)));
            }
        }

        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            data.apply_to(user);
            user.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[async_trait]
impl FarmRepository for MemoryStore {
    async fn create(&self, data: CreateFarm) -> StoreResult<Farm> {
        if matches!(data.size, Some(size) if size < 0.0) {
            return Err(StoreError::Validation("size must not be negative".to_string()));
        }

        let now = Utc::now();
        let farm = Farm {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            name: data.name,
            location: data.location,
            size: data.size,
            soil: data.soil,
            irrigation: data.irrigation,
            crops: data.crops,
            created_at: now,
            updated_at: now,
        };
        self.farms.write().await.push(farm.clone());
        Ok(farm)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Farm>> {
        Ok(self.farms.read().await.iter().find(|f| f.id == id).cloned())
    }

    async fn find(&self, filter: &FarmFilter, options: FindOptions) -> StoreResult<Vec<Farm>> {
        let farms: Vec<Farm> = self
            .farms
            .read()
            .await
            .iter()
            .filter(|f| filter.user_id.map_or(true, |owner| f.user_id == owner))
            .cloned()
            .collect();
        Ok(paginate(farms, |f| f.created_at, options))
    }

    async fn count(&self, filter: &FarmFilter) -> StoreResult<i64> {
        let count = self
            .farms
            .read()
            .await
            .iter()
            .filter(|f| filter.user_id.map_or(true, |owner| f.user_id == owner))
            .count();
        Ok(count as i64)
    }

    async fn update_by_id(&self, id: Uuid, data: UpdateFarm) -> StoreResult<Option<Farm>> {
        if matches!(data.size, Some(size) if size < 0.0) {
            return Err(StoreError::Validation("size must not be negative".to_string()));
        }

        let mut farms = self.farms.write().await;
        Ok(farms.iter_mut().find(|f| f.id == id).map(|farm| {
            data.apply_to(farm);
            farm.clone()
        }))
    }

    async fn add_crop(&self, farm_id: Uuid, crop_id: Uuid) -> StoreResult<bool> {
        let mut farms = self.farms.write().await;
        match farms.iter_mut().find(|f| f.id == farm_id) {
            Some(farm) => {
                farm.crops.push(crop_id);
                farm.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_crop(&self, farm_id: Uuid, crop_id: Uuid) -> StoreResult<bool> {
        let mut farms = self.farms.write().await;
        match farms.iter_mut().find(|f| f.id == farm_id) {
            Some(farm) => {
                farm.crops.retain(|c| *c != crop_id);
                farm.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        // Lock order: farms, then crops
        let mut farms = self.farms.write().await;
        let Some(index) = farms.iter().position(|f| f.id == id) else {
            return Ok(false);
        };

        let mut crops = self.crops.write().await;
        let before = crops.len();
        crops.retain(|c| c.farm_id != id);
        let removed = before - crops.len();

        farms.remove(index);

        tracing::debug!(farm_id = %id, crops = removed, "Deleted farm and its crops");
        Ok(true)
    }
}

#[async_trait]
impl CropRepository for MemoryStore {
    async fn create(&self, data: CreateCrop) -> StoreResult<Crop> {
        let now = Utc::now();
        let crop = Crop {
            id: Uuid::new_v4(),
            farm_id: data.farm_id,
            name: data.name,
            area: data.area,
            crop_yield: data.crop_yield,
            planting_date: data.planting_date,
            harvest_date: data.harvest_date,
            stage: data.stage,
            created_at: now,
            updated_at: now,
        };
        self.crops.write().await.push(crop.clone());
        Ok(crop)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Crop>> {
        Ok(self.crops.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn find(&self, filter: &CropFilter, options: FindOptions) -> StoreResult<Vec<Crop>> {
        let crops: Vec<Crop> = self
            .crops
            .read()
            .await
            .iter()
            .filter(|c| filter.farm_id.map_or(true, |farm| c.farm_id == farm))
            .filter(|c| filter.ids.as_ref().map_or(true, |ids| ids.contains(&c.id)))
            .cloned()
            .collect();
        Ok(paginate(crops, |c| c.created_at, options))
    }

    async fn find_first_by_farm(&self, farm_id: Uuid) -> StoreResult<Option<Crop>> {
        let filter = CropFilter {
            farm_id: Some(farm_id),
            ids: None,
        };
        let mut crops =
            CropRepository::find(self, &filter, FindOptions::oldest_first().limit(1)).await?;
        Ok(crops.pop())
    }

    async fn update_by_id(&self, id: Uuid, data: UpdateCrop) -> StoreResult<Option<Crop>> {
        let mut crops = self.crops.write().await;
        Ok(crops.iter_mut().find(|c| c.id == id).map(|crop| {
            data.apply_to(crop);
            crop.clone()
        }))
    }

    async fn delete_in_farm(&self, id: Uuid, farm_id: Uuid) -> StoreResult<Option<Crop>> {
        let mut crops = self.crops.write().await;
        Ok(crops
            .iter()
            .position(|c| c.id == id && c.farm_id == farm_id)
            .map(|index| crops.remove(index)))
    }

    async fn delete_by_farm(&self, farm_id: Uuid) -> StoreResult<u64> {
        let mut crops = self.crops.write().await;
        let before = crops.len();
        crops.retain(|c| c.farm_id != farm_id);
        Ok((before - crops.len()) as u64)
    }
}

#[async_trait]
impl DashboardRepository for MemoryStore {
    async fn create(&self, data: CreateDashboard) -> StoreResult<Dashboard> {
        let now = Utc::now();
        let dashboard = Dashboard {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            farm_id: data.farm_id,
            charts: data.charts,
            weather: data.weather,
            soil: data.soil,
            upcoming_tasks: data.upcoming_tasks,
            image: data.image,
            created_at: now,
            updated_at: now,
        };
        self.dashboards.write().await.push(dashboard.clone());
        Ok(dashboard)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Dashboard>> {
        Ok(self
            .dashboards
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn find(
        &self,
        filter: &DashboardFilter,
        options: FindOptions,
    ) -> StoreResult<Vec<Dashboard>> {
        let dashboards: Vec<Dashboard> = self
            .dashboards
            .read()
            .await
            .iter()
            .filter(|d| filter.user_id.map_or(true, |owner| d.user_id == owner))
            .cloned()
            .collect();
        Ok(paginate(dashboards, |d| d.created_at, options))
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        data: UpdateDashboard,
    ) -> StoreResult<Option<Dashboard>> {
        let mut dashboards = self.dashboards.write().await;
        Ok(dashboards.iter_mut().find(|d| d.id == id).map(|dashboard| {
            data.apply_to(dashboard);
            dashboard.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut dashboards = self.dashboards.write().await;
        let before = dashboards.len();
        dashboards.retain(|d| d.id != id);
        Ok(dashboards.len() < before)
    }
}

#[async_trait]
impl FarmHealthRepository for MemoryStore {
    async fn create(&self, data: CreateFarmHealth) -> StoreResult<FarmHealth> {
        let now = Utc::now();
        let health = FarmHealth {
            id: Uuid::new_v4(),
            farm_id: data.farm_id,
            pest_pressure: data.pest_pressure,
            nutrient_status: data.nutrient_status,
            disease_risk: data.disease_risk,
            created_at: now,
            updated_at: now,
        };
        self.farm_health.write().await.push(health.clone());
        Ok(health)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<FarmHealth>> {
        Ok(self
            .farm_health
            .read()
            .await
            .iter()
            .find(|h| h.id == id)
            .cloned())
    }

    async fn find_by_farm(&self, farm_id: Uuid) -> StoreResult<Option<FarmHealth>> {
        let records: Vec<FarmHealth> = self
            .farm_health
            .read()
            .await
            .iter()
            .filter(|h| h.farm_id == farm_id)
            .cloned()
            .collect();
        Ok(paginate(records, |h| h.created_at, FindOptions::oldest_first().limit(1))
            .pop())
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        data: UpdateFarmHealth,
    ) -> StoreResult<Option<FarmHealth>> {
        let mut records = self.farm_health.write().await;
        Ok(records.iter_mut().find(|h| h.id == id).map(|health| {
            data.apply_to(health);
            health.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut records = self.farm_health.write().await;
        let before = records.len();
        records.retain(|h| h.id != id);
        Ok(records.len() < before)
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create(&self, data: CreateEvent) -> StoreResult<Event> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            title: data.title,
            date: data.date,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn find(&self, filter: &EventFilter, options: FindOptions) -> StoreResult<Vec<Event>> {
        let events: Vec<Event> = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| filter.user_id.map_or(true, |owner| e.user_id == owner))
            .cloned()
            .collect();
        Ok(paginate(events, |e| e.created_at, options))
    }
}

#[async_trait]
impl LogRepository for MemoryStore {
    async fn create(&self, data: CreateLog) -> StoreResult<Log> {
        let log = Log {
            id: Uuid::new_v4(),
            action: data.action,
            user_id: data.user_id,
            created_at: Utc::now(),
        };
        self.logs.write().await.push(log.clone());
        Ok(log)
    }

    async fn find(&self, options: FindOptions) -> StoreResult<Vec<Log>> {
        let logs = self.logs.read().await.clone();
        Ok(paginate(logs, |l| l.created_at, options))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use chrono::NaiveDate;

    fn new_crop(farm_id: Uuid, name: &str) -> CreateCrop {
        CreateCrop {
            farm_id,
            name: name.to_string(),
            area: 1.5,
            crop_yield: 3.0,
            planting_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            stage: Some("seedling".to_string()),
        }
    }

    async fn new_farm(store: &MemoryStore, owner: Uuid, name: &str) -> Farm {
        FarmRepository::create(
            store,
            CreateFarm {
                user_id: owner,
                name: name.to_string(),
                location: Some("Eldoret".to_string()),
                size: Some(4.0),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_user_email_is_unique_case_insensitively() {
        let store = MemoryStore::new();
        let data = CreateUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Client,
        };
        UserRepository::create(&store, data.clone()).await.unwrap();

        let clash = CreateUser {
            email: "ALICE@example.com".to_string(),
            ..data
        };
        let err = UserRepository::create(&store, clash).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let found = store.find_by_email("Alice@Example.com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_non_ascii_email_is_compared_case_insensitively() {
        let store = MemoryStore::new();
        let data = CreateUser {
            name: "Zoë".to_string(),
            email: "zoë@Example.com".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Client,
        };
        UserRepository::create(&store, data.clone()).await.unwrap();

        let clash = CreateUser {
            email: "ZOË@example.com".to_string(),
            ..data
        };
        let err = UserRepository::create(&store, clash).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let found = UserRepository::find_by_email(&store, "ZOË@EXAMPLE.COM").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_delete_farm_removes_only_its_crops() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let farm = new_farm(&store, owner, "F1").await;
        let other = new_farm(&store, owner, "F2").await;

        CropRepository::create(&store, new_crop(farm.id, "Maize")).await.unwrap();
        CropRepository::create(&store, new_crop(farm.id, "Beans")).await.unwrap();
        let kept = CropRepository::create(&store, new_crop(other.id, "Wheat"))
            .await
            .unwrap();

        let health = FarmHealthRepository::create(
            &store,
            CreateFarmHealth {
                farm_id: farm.id,
                pest_pressure: "low".to_string(),
                nutrient_status: "good".to_string(),
                disease_risk: "low".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(FarmRepository::delete_by_id(&store, farm.id).await.unwrap());

        let remaining = CropRepository::find(&store, &CropFilter::default(), FindOptions::default())
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);

        // Health records are not cascaded
        let health = FarmHealthRepository::find_by_id(&store, health.id).await.unwrap();
        assert!(health.is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_farm_returns_false() {
        let store = MemoryStore::new();
        let farm = new_farm(&store, Uuid::new_v4(), "F1").await;
        CropRepository::create(&store, new_crop(farm.id, "Maize")).await.unwrap();

        assert!(!FarmRepository::delete_by_id(&store, Uuid::new_v4()).await.unwrap());

        let crops = CropRepository::find(&store, &CropFilter::default(), FindOptions::default())
            .await
            .unwrap();
        assert_eq!(crops.len(), 1);
    }

    #[tokio::test]
    async fn test_add_and_remove_crop_reference() {
        let store = MemoryStore::new();
        let farm = new_farm(&store, Uuid::new_v4(), "F1").await;
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(store.add_crop(farm.id, a).await.unwrap());
        assert!(store.add_crop(farm.id, b).await.unwrap());
        assert!(store.remove_crop(farm.id, a).await.unwrap());

        let farm = FarmRepository::find_by_id(&store, farm.id).await.unwrap().unwrap();
        assert_eq!(farm.crops, vec![b]);

        assert!(!store.add_crop(Uuid::new_v4(), a).await.unwrap());
    }

    #[tokio::test]
    async fn test_farm_partial_update_keeps_owner_and_location() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let farm = new_farm(&store, owner, "F1").await;

        let updated = FarmRepository::update_by_id(
            &store,
            farm.id,
            UpdateFarm {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.user_id, owner);
        assert_eq!(updated.location.as_deref(), Some("Eldoret"));
        assert_eq!(updated.size, Some(4.0));
    }

    #[tokio::test]
    async fn test_find_orders_and_pages() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for name in ["a", "b", "c"] {
            new_farm(&store, owner, name).await;
        }
        new_farm(&store, Uuid::new_v4(), "elsewhere").await;

        let filter = FarmFilter::owned_by(owner);
        let newest: Vec<String> = FarmRepository::find(&store, &filter, FindOptions::newest_first())
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(newest, vec!["c", "b", "a"]);

        let page: Vec<String> = FarmRepository::find(
            &store,
            &filter,
            FindOptions::newest_first().skip(1).limit(1),
        )
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
        assert_eq!(page, vec!["b"]);

        assert_eq!(store.count(&filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_first_crop_is_oldest() {
        let store = MemoryStore::new();
        let farm = new_farm(&store, Uuid::new_v4(), "F1").await;
        let first = CropRepository::create(&store, new_crop(farm.id, "Maize")).await.unwrap();
        CropRepository::create(&store, new_crop(farm.id, "Beans")).await.unwrap();

        let found = store.find_first_by_farm(farm.id).await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_delete_in_farm_checks_farm() {
        let store = MemoryStore::new();
        let farm = new_farm(&store, Uuid::new_v4(), "F1").await;
        let crop = CropRepository::create(&store, new_crop(farm.id, "Maize")).await.unwrap();

        assert!(store.delete_in_farm(crop.id, Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.delete_in_farm(crop.id, farm.id).await.unwrap().is_some());
    }
}
