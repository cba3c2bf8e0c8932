/// Farm health assessments
///
/// Admin-authored readings for a farm. Several records may exist per farm;
/// readers always use the oldest one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FarmHealth {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub pest_pressure: String,
    pub nutrient_status: String,
    pub disease_risk: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFarmHealth {
    pub farm_id: Uuid,
    pub pest_pressure: String,
    pub nutrient_status: String,
    pub disease_risk: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFarmHealth {
    pub pest_pressure: Option<String>,
    pub nutrient_status: Option<String>,
    pub disease_risk: Option<String>,
}

impl UpdateFarmHealth {
    pub fn apply_to(self, health: &mut FarmHealth) {
        if let Some(pest_pressure) = self.pest_pressure {
            health.pest_pressure = pest_pressure;
        }
        if let Some(nutrient_status) = self.nutrient_status {
            health.nutrient_status = nutrient_status;
        }
        if let Some(disease_risk) = self.disease_risk {
            health.disease_risk = disease_risk;
        }
        health.updated_at = Utc::now();
    }
}

const FARM_HEALTH_COLUMNS: &str =
    "id, farm_id, pest_pressure, nutrient_status, disease_risk, created_at, updated_at";

impl FarmHealth {
    pub async fn create(pool: &PgPool, data: CreateFarmHealth) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, FarmHealth>(&format!(
            r#"
            INSERT INTO farm_health (farm_id, pest_pressure, nutrient_status, disease_risk)
            VALUES ($1, $2, $3, $4)
            RETURNING {FARM_HEALTH_COLUMNS}
            "#
        ))
        .bind(data.farm_id)
        .bind(data.pest_pressure)
        .bind(data.nutrient_status)
        .bind(data.disease_risk)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FarmHealth>(&format!(
            "SELECT {FARM_HEALTH_COLUMNS} FROM farm_health WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Oldest health record of a farm
    pub async fn find_by_farm(
        pool: &PgPool,
        farm_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FarmHealth>(&format!(
            r#"
            SELECT {FARM_HEALTH_COLUMNS} FROM farm_health
            WHERE farm_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#
        ))
        .bind(farm_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateFarmHealth,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FarmHealth>(&format!(
            r#"
            UPDATE farm_health SET
                pest_pressure = COALESCE($2, pest_pressure),
                nutrient_status = COALESCE($3, nutrient_status),
                disease_risk = COALESCE($4, disease_risk),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {FARM_HEALTH_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.pest_pressure)
        .bind(data.nutrient_status)
        .bind(data.disease_risk)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM farm_health WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
