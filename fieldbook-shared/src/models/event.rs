/// Calendar events
///
/// Personal entries (field visits, spraying dates, market days) that a user
/// keeps for themself. Only the owner ever reads them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{EventFilter, FindOptions};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEvent {
    pub user_id: Uuid,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

const EVENT_COLUMNS: &str = "id, user_id, title, date, description, created_at, updated_at";

impl Event {
    pub async fn create(pool: &PgPool, data: CreateEvent) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (user_id, title, date, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.date)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        filter: &EventFilter,
        options: FindOptions,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
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
}
