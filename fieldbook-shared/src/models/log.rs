/// Audit log entries
///
/// Append-only: there is no update or delete path for logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::FindOptions;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub id: Uuid,

    /// Human-readable description, e.g. `"User logged in: a@b.c"`
    pub action: String,

    /// Acting user
    #[serde(rename = "user")]
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLog {
    pub action: String,
    pub user_id: Uuid,
}

impl Log {
    pub async fn create(pool: &PgPool, data: CreateLog) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Log>(
            r#"
            INSERT INTO logs (action, user_id)
            VALUES ($1, $2)
            RETURNING id, action, user_id, created_at
            "#,
        )
        .bind(data.action)
        .bind(data.user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &PgPool, options: FindOptions) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Log>(&format!(
            "SELECT id, action, user_id, created_at FROM logs ORDER BY created_at {} LIMIT $1 OFFSET $2",
            options.sort.sql()
        ))
        .bind(options.limit)
        .bind(options.skip)
        .fetch_all(pool)
        .await
    }
}
