/// Farm listings joined with related records
///
/// - [`farms_with_crops`]: a client's farms, one page at a time, with crops
/// - [`farms_with_owners`]: every farm with a summary of its owner
/// - [`dashboards_with_farms`]: every dashboard with a summary of its farm

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::models::crop::Crop;
use crate::models::dashboard::Dashboard;
use crate::models::farm::Farm;
use crate::repository::{
    CropFilter, DashboardFilter, FarmFilter, FindOptions, Repositories, StoreResult,
};

/// A farm with its `crops` ids replaced by the crop records
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmWithCrops {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub size: Option<f64>,
    pub soil: Option<String>,
    pub irrigation: Option<String>,
    pub crops: Vec<Crop>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FarmWithCrops {
    fn new(farm: Farm, crops: Vec<Crop>) -> Self {
        Self {
            id: farm.id,
            user_id: farm.user_id,
            name: farm.name,
            location: farm.location,
            size: farm.size,
            soil: farm.soil,
            irrigation: farm.irrigation,
            crops,
            created_at: farm.created_at,
            updated_at: farm.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmPage {
    pub data: Vec<FarmWithCrops>,
    pub current_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A farm and its owner; `owner` is `null` when the user was deleted
#[derive(Debug, Clone, Serialize)]
pub struct FarmWithOwner {
    #[serde(flatten)]
    pub farm: Farm,
    pub owner: Option<OwnerSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmSummary {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
}

/// A dashboard and its farm; `farm` is `null` when the farm was deleted
#[derive(Debug, Clone, Serialize)]
pub struct DashboardWithFarm {
    #[serde(flatten)]
    pub dashboard: Dashboard,
    pub farm: Option<FarmSummary>,
}

/// Replaces a farm's crop ids with the crops, keeping the farm's order
///
/// Ids whose crop no longer exists are dropped.
pub async fn populate_crops(repos: &Repositories, farm: Farm) -> StoreResult<FarmWithCrops> {
    if farm.crops.is_empty() {
        return Ok(FarmWithCrops::new(farm, Vec::new()));
    }

    let mut found = repos
        .crops
        .find(
            &CropFilter {
                farm_id: None,
                ids: Some(farm.crops.clone()),
            },
            FindOptions::oldest_first(),
        )
        .await?;

    let crops = farm
        .crops
        .iter()
        .filter_map(|id| {
            let index = found.iter().position(|crop| crop.id == *id)?;
            Some(found.swap_remove(index))
        })
        .collect();

    Ok(FarmWithCrops::new(farm, crops))
}

/// One page of `user_id`'s farms, newest first, with crops populated
///
/// `page` and `limit` are clamped to at least 1.
pub async fn farms_with_crops(
    repos: &Repositories,
    user_id: Uuid,
    page: i64,
    limit: i64,
) -> StoreResult<FarmPage> {
    let page = page.max(1);
    let limit = limit.max(1);
    let filter = FarmFilter::owned_by(user_id);

    let farms = repos
        .farms
        .find(
            &filter,
            FindOptions::newest_first()
                .skip((page - 1).saturating_mul(limit))
                .limit(limit),
        )
        .await?;
    let total = repos.farms.count(&filter).await?;

    let data = try_join_all(farms.into_iter().map(|farm| populate_crops(repos, farm))).await?;

    Ok(FarmPage {
        data,
        current_page: page,
        total_pages: total / limit + i64::from(total % limit != 0),
    })
}

/// Every farm, newest first, with its owner
pub async fn farms_with_owners(repos: &Repositories) -> StoreResult<Vec<FarmWithOwner>> {
    let farms = repos
        .farms
        .find(&FarmFilter::default(), FindOptions::newest_first())
        .await?;

    try_join_all(farms.into_iter().map(|farm| async move {
        let owner = repos
            .users
            .find_by_id(farm.user_id)
            .await?
            .map(|user| OwnerSummary {
                id: user.id,
                name: user.name,
                email: user.email,
            });
        StoreResult::Ok(FarmWithOwner { farm, owner })
    }))
    .await
}

/// Every dashboard, oldest first, with its farm
pub async fn dashboards_with_farms(repos: &Repositories) -> StoreResult<Vec<DashboardWithFarm>> {
    let dashboards = repos
        .dashboards
        .find(&DashboardFilter::default(), FindOptions::oldest_first())
        .await?;

    try_join_all(dashboards.into_iter().map(|dashboard| async move {
        let farm = repos
            .farms
            .find_by_id(dashboard.farm_id)
            .await?
            .map(|farm| FarmSummary {
                id: farm.id,
                name: farm.name,
                location: farm.location,
            });
        StoreResult::Ok(DashboardWithFarm { dashboard, farm })
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::crop::CreateCrop;
    use crate::models::dashboard::CreateDashboard;
    use crate::models::farm::CreateFarm;
    use crate::models::user::{CreateUser, UserRole};
    use chrono::NaiveDate;

    async fn farm(repos: &Repositories, user_id: Uuid, name: &str) -> Farm {
        repos
            .farms
            .create(CreateFarm {
                user_id,
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    async fn planted(repos: &Repositories, farm_id: Uuid, name: &str) -> Crop {
        let crop = repos
            .crops
            .create(CreateCrop {
                farm_id,
                name: name.to_string(),
                area: 1.0,
                crop_yield: 1.5,
                planting_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                harvest_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                stage: None,
            })
            .await
            .unwrap();
        repos.farms.add_crop(farm_id, crop.id).await.unwrap();
        crop
    }

    #[tokio::test]
    async fn test_populate_keeps_reference_order_and_drops_dangling_ids() {
        let repos = Repositories::in_memory();
        let f = farm(&repos, Uuid::new_v4(), "F1").await;
        let maize = planted(&repos, f.id, "Maize").await;
        let beans = planted(&repos, f.id, "Beans").await;
        repos.farms.add_crop(f.id, Uuid::new_v4()).await.unwrap();

        let farm = repos.farms.find_by_id(f.id).await.unwrap().unwrap();
        assert_eq!(farm.crops.len(), 3);

        let populated = populate_crops(&repos, farm).await.unwrap();
        let ids: Vec<_> = populated.crops.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![maize.id, beans.id]);

        let json = serde_json::to_value(&populated).unwrap();
        assert_eq!(json["crops"][0]["name"], "Maize");
        assert_eq!(json["userId"], f.user_id.to_string());
    }

    #[tokio::test]
    async fn test_farms_with_crops_pages_newest_first() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let first = farm(&repos, user, "First").await;
        let second = farm(&repos, user, "Second").await;
        farm(&repos, Uuid::new_v4(), "Foreign").await;
        planted(&repos, first.id, "Maize").await;

        let page1 = farms_with_crops(&repos, user, 1, 1).await.unwrap();
        assert_eq!(page1.total_pages, 2);
        assert_eq!(page1.current_page, 1);
        assert_eq!(page1.data.len(), 1);
        assert_eq!(page1.data[0].id, second.id);

        let page2 = farms_with_crops(&repos, user, 2, 1).await.unwrap();
        assert_eq!(page2.data[0].id, first.id);
        assert_eq!(page2.data[0].crops.len(), 1);

        let everything = farms_with_crops(&repos, user, 0, 10).await.unwrap();
        assert_eq!(everything.current_page, 1);
        assert_eq!(everything.total_pages, 1);
        assert_eq!(everything.data.len(), 2);

        let json = serde_json::to_value(&everything).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["totalPages"], 1);
    }

    #[tokio::test]
    async fn test_huge_limit_yields_one_page() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        farm(&repos, user, "Only").await;

        let page = farms_with_crops(&repos, user, 1, i64::MAX).await.unwrap();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.data.len(), 1);

        let beyond = farms_with_crops(&repos, user, i64::MAX, i64::MAX).await.unwrap();
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.total_pages, 1);
    }

    #[tokio::test]
    async fn test_user_without_farms_has_zero_pages() {
        let repos = Repositories::in_memory();
        let page = farms_with_crops(&repos, Uuid::new_v4(), 1, 1).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_farms_with_owners() {
        let repos = Repositories::in_memory();
        let alice = repos
            .users
            .create(CreateUser {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Client,
            })
            .await
            .unwrap();
        farm(&repos, alice.id, "Owned").await;
        farm(&repos, Uuid::new_v4(), "Orphan").await;

        let farms = farms_with_owners(&repos).await.unwrap();
        assert_eq!(farms.len(), 2);

        let owned = farms.iter().find(|f| f.farm.name == "Owned").unwrap();
        let json = serde_json::to_value(owned).unwrap();
        assert_eq!(json["owner"]["email"], "alice@example.com");
        assert_eq!(json["userId"], alice.id.to_string());

        let orphan = farms.iter().find(|f| f.farm.name == "Orphan").unwrap();
        assert!(orphan.owner.is_none());
    }

    #[tokio::test]
    async fn test_dashboards_with_farms() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let f = farm(&repos, user, "F1").await;
        repos
            .dashboards
            .create(CreateDashboard {
                user_id: user,
                farm_id: f.id,
                ..Default::default()
            })
            .await
            .unwrap();

        let dashboards = dashboards_with_farms(&repos).await.unwrap();
        assert_eq!(dashboards.len(), 1);
        let json = serde_json::to_value(&dashboards[0]).unwrap();
        assert_eq!(json["farm"]["name"], "F1");
        assert_eq!(json["farmId"], f.id.to_string());
    }
}
