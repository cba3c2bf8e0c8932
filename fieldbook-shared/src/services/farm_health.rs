/// Farm health views
///
/// A farm may have several health records; the oldest one is the farm's
/// health. Farms without any record are omitted from per-user listings.

use futures::future::try_join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::models::farm::Farm;
use crate::models::farm_health::FarmHealth;
use crate::repository::{FarmFilter, FindOptions, Repositories, StoreResult};

/// Health of one farm in a user's listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmHealthSummary {
    pub farm_id: Uuid,
    pub farm_name: String,
    pub location: Option<String>,
    pub health: FarmHealth,
}

/// Outcome of [`farm_health_for_user`]
#[derive(Debug, Clone)]
pub enum MyFarmsHealth {
    /// The user owns no farms
    NoFarms,

    /// The user has farms but none has health data
    NoHealthData,

    Found(Vec<FarmHealthSummary>),
}

/// A health record together with the farm it describes
///
/// `farmDetails` is `null` when the farm has been deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmHealthDetail {
    #[serde(flatten)]
    pub health: FarmHealth,
    pub farm_details: Option<Farm>,
}

/// Health of every farm owned by `user_id`
pub async fn farm_health_for_user(
    repos: &Repositories,
    user_id: Uuid,
) -> StoreResult<MyFarmsHealth> {
    let farms = repos
        .farms
        .find(&FarmFilter::owned_by(user_id), FindOptions::oldest_first())
        .await?;

    if farms.is_empty() {
        return Ok(MyFarmsHealth::NoFarms);
    }

    let entries = try_join_all(farms.into_iter().map(|farm| async move {
        let health = repos.farm_health.find_by_farm(farm.id).await?;
        StoreResult::Ok(health.map(|health| FarmHealthSummary {
            farm_id: farm.id,
            farm_name: farm.name,
            location: farm.location,
            health,
        }))
    }))
    .await?;

    let found: Vec<_> = entries.into_iter().flatten().collect();
    if found.is_empty() {
        return Ok(MyFarmsHealth::NoHealthData);
    }

    Ok(MyFarmsHealth::Found(found))
}

/// First health record of `farm_id`, joined with the farm
pub async fn farm_health_detail(
    repos: &Repositories,
    farm_id: Uuid,
) -> StoreResult<Option<FarmHealthDetail>> {
    let Some(health) = repos.farm_health.find_by_farm(farm_id).await? else {
        return Ok(None);
    };

    with_farm_details(repos, health).await.map(Some)
}

/// Joins an already loaded health record with its farm
pub async fn with_farm_details(
    repos: &Repositories,
    health: FarmHealth,
) -> StoreResult<FarmHealthDetail> {
    let farm_details = repos.farms.find_by_id(health.farm_id).await?;

    Ok(FarmHealthDetail {
        health,
        farm_details,
    })
}
