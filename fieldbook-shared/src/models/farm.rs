/// Farm model and database operations
///
/// A farm belongs to exactly one user and keeps the ids of its crops in
/// `crops`. The list is maintained by hand whenever a crop is added to or
/// removed from the farm; there is no foreign key behind it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE farms (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     location VARCHAR(255),
///     size DOUBLE PRECISION,
///     soil VARCHAR(255),
///     irrigation VARCHAR(255),
///     crops UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{FarmFilter, FindOptions};

/// Farm owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub name: String,
    pub location: Option<String>,

    /// Size in hectares
    pub size: Option<f64>,

    pub soil: Option<String>,
    pub irrigation: Option<String>,

    /// Ids of the crops planted on this farm
    pub crops: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a farm
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFarm {
    pub user_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub size: Option<f64>,
    pub soil: Option<String>,
    pub irrigation: Option<String>,
    pub crops: Vec<Uuid>,
}

/// Partial farm update
///
/// The owner (`user_id`) and the crop list are deliberately absent: the
/// owner never changes through an update and crops are linked through
/// [`crate::repository::FarmRepository::add_crop`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFarm {
    pub name: Option<String>,
    pub location: Option<String>,
    pub size: Option<f64>,
    pub soil: Option<String>,
    pub irrigation: Option<String>,
}

impl UpdateFarm {
    /// Merges the provided fields into `farm`
    pub fn apply_to(self, farm: &mut Farm) {
        if let Some(name) = self.name {
            farm.name = name;
        }
        if let Some(location) = self.location {
            farm.location = Some(location);
        }
        if let Some(size) = self.size {
            farm.size = Some(size);
        }
        if let Some(soil) = self.soil {
            farm.soil = Some(soil);
        }
        if let Some(irrigation) = self.irrigation {
            farm.irrigation = Some(irrigation);
        }
        farm.updated_at = Utc::now();
    }
}

const FARM_COLUMNS: &str =
    "id, user_id, name, location, size, soil, irrigation, crops, created_at, updated_at";

impl Farm {
    /// Creates a new farm
    pub async fn create(pool: &PgPool, data: CreateFarm) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Farm>(&format!(
            r#"
            INSERT INTO farms (user_id, name, location, size, soil, irrigation, crops)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {FARM_COLUMNS}
            "#
        ))
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.location)
        .bind(data.size)
        .bind(data.soil)
        .bind(data.irrigation)
        .bind(data.crops)
        .fetch_one(pool)
        .await
    }

    /// Finds a farm by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Farm>(&format!("SELECT {FARM_COLUMNS} FROM farms WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists farms matching `filter`, ordered by creation date
    pub async fn list(
        pool: &PgPool,
        filter: &FarmFilter,
        options: FindOptions,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Farm>(&format!(
            r#"
            SELECT {FARM_COLUMNS} FROM farms
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
        .await
    }

    /// Counts farms matching `filter`
    pub async fn count(pool: &PgPool, filter: &FarmFilter) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM farms WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(filter.user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Applies a partial update; omitted fields keep their stored values
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateFarm,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Farm>(&format!(
            r#"
            UPDATE farms SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                size = COALESCE($4, size),
                soil = COALESCE($5, soil),
                irrigation = COALESCE($6, irrigation),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {FARM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.location)
        .bind(data.size)
        .bind(data.soil)
        .bind(data.irrigation)
        .fetch_optional(pool)
        .await
    }

    /// Appends a crop id to the farm's crop list
    pub async fn push_crop(pool: &PgPool, id: Uuid, crop_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE farms SET crops = array_append(crops, $2), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(crop_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every occurrence of a crop id from the farm's crop list
    pub async fn pull_crop(pool: &PgPool, id: Uuid, crop_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE farms SET crops = array_remove(crops, $2), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(crop_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes the farm row only
    ///
    /// Crop cleanup is the repository's job, see
    /// [`crate::repository::FarmRepository::delete_by_id`].
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM farms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_farm_with_only_name_preserves_other_fields() {
        let owner = Uuid::new_v4();
        let crop = Uuid::new_v4();
        let now = Utc::now();
        let mut farm = Farm {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "North field".to_string(),
            location: Some("Nakuru".to_string()),
            size: Some(12.5),
            soil: Some("loam".to_string()),
            irrigation: Some("drip".to_string()),
            crops: vec![crop],
            created_at: now,
            updated_at: now,
        };

        UpdateFarm {
            name: Some("South field".to_string()),
            ..Default::default()
        }
        .apply_to(&mut farm);

        assert_eq!(farm.name, "South field");
        assert_eq!(farm.location.as_deref(), Some("Nakuru"));
        assert_eq!(farm.size, Some(12.5));
        assert_eq!(farm.user_id, owner);
        assert_eq!(farm.crops, vec![crop]);
    }

    #[test]
    fn test_farm_serializes_camel_case() {
        let now = Utc::now();
        let farm = Farm {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "F1".to_string(),
            location: None,
            size: None,
            soil: None,
            irrigation: None,
            crops: vec![],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&farm).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["crops"], serde_json::json!([]));
    }
}
