/// Client dashboard overview
///
/// Each dashboard of a user is joined with its farm and the farm's oldest
/// crop and flattened into a [`DashboardOverview`]. Only one crop is shown
/// per farm. Dashboards whose farm has been deleted are left out.

use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::models::dashboard::{Charts, Dashboard, Soil, Weather};
use crate::repository::{DashboardFilter, FindOptions, Repositories, StoreResult};

/// Placeholder for crop fields when a farm has no crops
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub dashboard_id: Uuid,
    pub farm_id: Uuid,
    pub farm_name: String,
    pub farm_size: Option<f64>,
    pub location: Option<String>,
    pub farm_image: String,
    pub crop_name: String,
    pub sowing_date: Option<NaiveDate>,
    pub stage: String,
    pub charts: Charts,
    pub weather: Weather,
    pub soil: Soil,
    pub upcoming_tasks: Vec<String>,
}

async fn overview_entry(
    repos: &Repositories,
    dashboard: Dashboard,
) -> StoreResult<Option<DashboardOverview>> {
    let Some(farm) = repos.farms.find_by_id(dashboard.farm_id).await? else {
        tracing::debug!(
            dashboard_id = %dashboard.id,
            farm_id = %dashboard.farm_id,
            "Skipping dashboard of a deleted farm"
        );
        return Ok(None);
    };

    let crop = repos.crops.find_first_by_farm(farm.id).await?;

    let (crop_name, sowing_date, stage) = match crop {
        Some(crop) => (
            crop.name,
            Some(crop.planting_date),
            crop.stage.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        None => (NOT_AVAILABLE.to_string(), None, NOT_AVAILABLE.to_string()),
    };

    Ok(Some(DashboardOverview {
        dashboard_id: dashboard.id,
        farm_id: farm.id,
        farm_name: farm.name,
        farm_size: farm.size,
        location: farm.location,
        farm_image: dashboard.image,
        crop_name,
        sowing_date,
        stage,
        charts: dashboard.charts,
        weather: dashboard.weather,
        soil: dashboard.soil,
        upcoming_tasks: dashboard.upcoming_tasks,
    }))
}

/// Builds the dashboard overview of `user_id`, oldest dashboard first
pub async fn dashboard_overview(
    repos: &Repositories,
    user_id: Uuid,
) -> StoreResult<Vec<DashboardOverview>> {
    let dashboards = repos
        .dashboards
        .find(
            &DashboardFilter {
                user_id: Some(user_id),
            },
            FindOptions::oldest_first(),
        )
        .await?;

    let entries = try_join_all(
        dashboards
            .into_iter()
            .map(|dashboard| overview_entry(repos, dashboard)),
    )
    .await?;

    Ok(entries.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::crop::CreateCrop;
    use crate::models::dashboard::CreateDashboard;
    use crate::models::farm::CreateFarm;

    async fn farm(repos: &Repositories, user_id: Uuid, name: &str) -> Uuid {
        repos
            .farms
            .create(CreateFarm {
                user_id,
                name: name.to_string(),
                location: Some("Nakuru".to_string()),
                size: Some(4.5),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    async fn dashboard(repos: &Repositories, user_id: Uuid, farm_id: Uuid) -> Uuid {
        repos
            .dashboards
            .create(CreateDashboard {
                user_id,
                farm_id,
                image: "farm.png".to_string(),
                upcoming_tasks: vec!["Weeding".to_string()],
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_overview_without_crops_uses_placeholders() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let farm_id = farm(&repos, user, "F1").await;
        let dashboard_id = dashboard(&repos, user, farm_id).await;

        let view = dashboard_overview(&repos, user).await.unwrap();

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].dashboard_id, dashboard_id);
        assert_eq!(view[0].farm_name, "F1");
        assert_eq!(view[0].farm_size, Some(4.5));
        assert_eq!(view[0].crop_name, "N/A");
        assert_eq!(view[0].stage, "N/A");
        assert!(view[0].sowing_date.is_none());

        let json = serde_json::to_value(&view[0]).unwrap();
        assert_eq!(json["farmImage"], "farm.png");
        assert_eq!(json["upcomingTasks"][0], "Weeding");
        assert!(json["sowingDate"].is_null());
    }

    #[tokio::test]
    async fn test_overview_surfaces_first_crop() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let farm_id = farm(&repos, user, "F1").await;
        dashboard(&repos, user, farm_id).await;

        for (name, stage) in [("Maize", "Tasseling"), ("Beans", "Flowering")] {
            repos
                .crops
                .create(CreateCrop {
                    farm_id,
                    name: name.to_string(),
                    area: 1.0,
                    crop_yield: 2.0,
                    planting_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    harvest_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                    stage: Some(stage.to_string()),
                })
                .await
                .unwrap();
        }

        let view = dashboard_overview(&repos, user).await.unwrap();
        assert_eq!(view[0].crop_name, "Maize");
        assert_eq!(view[0].stage, "Tasseling");
        assert_eq!(view[0].sowing_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[tokio::test]
    async fn test_overview_skips_deleted_farms_and_other_users() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let kept = farm(&repos, user, "Kept").await;
        let gone = farm(&repos, user, "Gone").await;
        dashboard(&repos, user, kept).await;
        dashboard(&repos, user, gone).await;
        dashboard(&repos, Uuid::new_v4(), kept).await;

        assert!(repos.farms.delete_by_id(gone).await.unwrap());

        let view = dashboard_overview(&repos, user).await.unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].farm_name, "Kept");
    }
}
