/// Crop model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE crops (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     farm_id UUID NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     area DOUBLE PRECISION NOT NULL,
///     crop_yield DOUBLE PRECISION NOT NULL,
///     planting_date DATE NOT NULL,
///     harvest_date DATE NOT NULL,
///     stage VARCHAR(64),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{CropFilter, FindOptions};

/// Crop planted on a farm
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: Uuid,

    /// Farm this crop belongs to
    pub farm_id: Uuid,

    pub name: String,

    /// Planted area in hectares
    pub area: f64,

    /// Expected yield in tonnes
    #[serde(rename = "yield")]
    pub crop_yield: f64,

    pub planting_date: NaiveDate,
    pub harvest_date: NaiveDate,

    /// Growth stage label ("seedling", "flowering", ...)
    pub stage: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCrop {
    pub farm_id: Uuid,
    pub name: String,
    pub area: f64,
    pub crop_yield: f64,
    pub planting_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub stage: Option<String>,
}

/// Partial crop update; the owning farm never changes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCrop {
    pub name: Option<String>,
    pub area: Option<f64>,
    pub crop_yield: Option<f64>,
    pub planting_date: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
    pub stage: Option<String>,
}

impl UpdateCrop {
    pub fn apply_to(self, crop: &mut Crop) {
        if let Some(name) = self.name {
            crop.name = name;
        }
        if let Some(area) = self.area {
            crop.area = area;
        }
        if let Some(crop_yield) = self.crop_yield {
            crop.crop_yield = crop_yield;
        }
        if let Some(planting_date) = self.planting_date {
            crop.planting_date = planting_date;
        }
        if let Some(harvest_date) = self.harvest_date {
            crop.harvest_date = harvest_date;
        }
        if let Some(stage) = self.stage {
            crop.stage = Some(stage);
        }
        crop.updated_at = Utc::now();
    }
}

const CROP_COLUMNS: &str = "id, farm_id, name, area, crop_yield, planting_date, harvest_date, \
                            stage, created_at, updated_at";

impl Crop {
    pub async fn create(pool: &PgPool, data: CreateCrop) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Crop>(&format!(
            r#"
            INSERT INTO crops (farm_id, name, area, crop_yield, planting_date, harvest_date, stage)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CROP_COLUMNS}
            "#
        ))
        .bind(data.farm_id)
        .bind(data.name)
        .bind(data.area)
        .bind(data.crop_yield)
        .bind(data.planting_date)
        .bind(data.harvest_date)
        .bind(data.stage)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Crop>(&format!("SELECT {CROP_COLUMNS} FROM crops WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists crops matching `filter`
    ///
    /// `filter.ids = Some(vec![])` matches nothing, mirroring an empty
    /// `IN ()` list.
    pub async fn list(
        pool: &PgPool,
        filter: &CropFilter,
        options: FindOptions,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Crop>(&format!(
            r#"
            SELECT {CROP_COLUMNS} FROM crops
            WHERE ($1::uuid IS NULL OR farm_id = $1)
              AND ($2::uuid[] IS NULL OR id = ANY($2))
            ORDER BY created_at {}
            LIMIT $3 OFFSET $4
            "#,
            options.sort.sql()
        ))
        .bind(filter.farm_id)
        .bind(filter.ids.as_deref())
        .bind(options.limit)
        .bind(options.skip)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCrop,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Crop>(&format!(
            r#"
            UPDATE crops SET
                name = COALESCE($2, name),
                area = COALESCE($3, area),
                crop_yield = COALESCE($4, crop_yield),
                planting_date = COALESCE($5, planting_date),
                harvest_date = COALESCE($6, harvest_date),
                stage = COALESCE($7, stage),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CROP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.area)
        .bind(data.crop_yield)
        .bind(data.planting_date)
        .bind(data.harvest_date)
        .bind(data.stage)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a crop only if it belongs to `farm_id`
    pub async fn delete_in_farm(
        pool: &PgPool,
        id: Uuid,
        farm_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Crop>(&format!(
            "DELETE FROM crops WHERE id = $1 AND farm_id = $2 RETURNING {CROP_COLUMNS}"
        ))
        .bind(id)
        .bind(farm_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM crops WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every crop of a farm, returning how many were removed
    pub async fn delete_by_farm(pool: &PgPool, farm_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM crops WHERE farm_id = $1")
            .bind(farm_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_uses_wire_name() {
        let now = Utc::now();
        let crop = Crop {
            id: Uuid::new_v4(),
            farm_id: Uuid::new_v4(),
            name: "Maize".to_string(),
            area: 2.0,
            crop_yield: 7.5,
            planting_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            stage: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&crop).unwrap();
        assert_eq!(json["yield"], 7.5);
        assert_eq!(json["plantingDate"], "2024-03-01");
        assert!(json.get("farmId").is_some());
    }
}
