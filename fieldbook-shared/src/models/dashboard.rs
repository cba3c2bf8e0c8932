/// Dashboard model and database operations
///
/// A dashboard is the per-farm overview card a client sees: sensor chart
/// series, a weather summary, soil readings, upcoming tasks and a cover
/// image. Admins author them; clients only read them through
/// [`crate::services::dashboard::dashboard_overview`].
///
/// The nested groups are stored as JSONB columns.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE dashboards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     farm_id UUID NOT NULL,
///     charts JSONB NOT NULL DEFAULT '{}',
///     weather JSONB NOT NULL DEFAULT '{}',
///     soil JSONB NOT NULL DEFAULT '{}',
///     upcoming_tasks TEXT[] NOT NULL DEFAULT '{}',
///     image TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::repository::{DashboardFilter, FindOptions};

/// Sensor series plotted on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Charts {
    /// Relative humidity
    pub rh: Vec<f64>,
    pub temp: Vec<f64>,
    pub rainfall: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub forecast: String,
    pub temperature: String,
    pub humidity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Soil {
    #[serde(rename = "pH")]
    pub ph: f64,
    pub moisture: String,
}

/// Dashboard for one farm of one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub farm_id: Uuid,
    pub charts: Charts,
    pub weather: Weather,
    pub soil: Soil,
    pub upcoming_tasks: Vec<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct DashboardRow {
    id: Uuid,
    user_id: Uuid,
    farm_id: Uuid,
    charts: Json<Charts>,
    weather: Json<Weather>,
    soil: Json<Soil>,
    upcoming_tasks: Vec<String>,
    image: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DashboardRow> for Dashboard {
    fn from(row: DashboardRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            farm_id: row.farm_id,
            charts: row.charts.0,
            weather: row.weather.0,
            soil: row.soil.0,
            upcoming_tasks: row.upcoming_tasks,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDashboard {
    pub user_id: Uuid,
    pub farm_id: Uuid,
    pub charts: Charts,
    pub weather: Weather,
    pub soil: Soil,
    pub upcoming_tasks: Vec<String>,
    pub image: String,
}

/// Partial dashboard update
///
/// Nested groups are replaced as a whole when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDashboard {
    pub user_id: Option<Uuid>,
    pub farm_id: Option<Uuid>,
    pub charts: Option<Charts>,
    pub weather: Option<Weather>,
    pub soil: Option<Soil>,
    pub upcoming_tasks: Option<Vec<String>>,
    pub image: Option<String>,
}

impl UpdateDashboard {
    pub fn apply_to(self, dashboard: &mut Dashboard) {
        if let Some(user_id) = self.user_id {
            dashboard.user_id = user_id;
        }
        if let Some(farm_id) = self.farm_id {
            dashboard.farm_id = farm_id;
        }
        if let Some(charts) = self.charts {
            dashboard.charts = charts;
        }
        if let Some(weather) = self.weather {
            dashboard.weather = weather;
        }
        if let Some(soil) = self.soil {
            dashboard.soil = soil;
        }
        if let Some(upcoming_tasks) = self.upcoming_tasks {
            dashboard.upcoming_tasks = upcoming_tasks;
        }
        if let Some(image) = self.image {
            dashboard.image = image;
        }
        dashboard.updated_at = Utc::now();
    }
}

const DASHBOARD_COLUMNS: &str = "id, user_id, farm_id, charts, weather, soil, upcoming_tasks, \
                                 image, created_at, updated_at";

impl Dashboard {
    pub async fn create(pool: &PgPool, data: CreateDashboard) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, DashboardRow>(&format!(
            r#"
            INSERT INTO dashboards (user_id, farm_id, charts, weather, soil, upcoming_tasks, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {DASHBOARD_COLUMNS}
            "#
        ))
        .bind(data.user_id)
        .bind(data.farm_id)
        .bind(Json(data.charts))
        .bind(Json(data.weather))
        .bind(Json(data.soil))
        .bind(data.upcoming_tasks)
        .bind(data.image)
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, DashboardRow>(&format!(
            "SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn list(
        pool: &PgPool,
        filter: &DashboardFilter,
        options: FindOptions,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DashboardRow>(&format!(
            r#"
            SELECT {DASHBOARD_COLUMNS} FROM dashboards
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at {}
            LIMIT $2 OFFSET $3
            "#,
            options.sort.sql()
        ))
        .bind(filter.user_id)
        .bind(options.limit)
        .bind(options.skip)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateDashboard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, DashboardRow>(&format!(
            r#"
            UPDATE dashboards SET
                user_id = COALESCE($2, user_id),
                farm_id = COALESCE($3, farm_id),
                charts = COALESCE($4, charts),
                weather = COALESCE($5, weather),
                soil = COALESCE($6, soil),
                upcoming_tasks = COALESCE($7, upcoming_tasks),
                image = COALESCE($8, image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DASHBOARD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.user_id)
        .bind(data.farm_id)
        .bind(data.charts.map(Json))
        .bind(data.weather.map(Json))
        .bind(data.soil.map(Json))
        .bind(data.upcoming_tasks)
        .bind(data.image)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dashboards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
