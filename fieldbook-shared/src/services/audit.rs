/// Audit trail writes
///
/// An audit entry is recorded after the action it describes has succeeded.
/// A failed write is logged and swallowed; it never changes the response of
/// the request that triggered it.

use uuid::Uuid;

use crate::models::log::CreateLog;
use crate::repository::LogRepository;

/// Appends `{action, user}` to the audit log
pub async fn record(logs: &dyn LogRepository, actor: Uuid, action: impl Into<String>) {
    let action = action.into();

    match logs
        .create(CreateLog {
            action: action.clone(),
            user_id: actor,
        })
        .await
    {
        Ok(_) => tracing::debug!(user_id = %actor, action = %action, "Audit entry recorded"),
        Err(e) => tracing::warn!(
            user_id = %actor,
            action = %action,
            error = %e,
            "Failed to record audit entry"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::log::Log;
    use crate::repository::memory::MemoryStore;
    use crate::repository::{FindOptions, StoreError, StoreResult};
    use async_trait::async_trait;

    struct BrokenLogs;

    #[async_trait]
    impl LogRepository for BrokenLogs {
        async fn create(&self, _data: CreateLog) -> StoreResult<Log> {
            Err(StoreError::Storage("disk full".to_string()))
        }

        async fn find(&self, _options: FindOptions) -> StoreResult<Vec<Log>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_record_appends_entry() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();

        record(&store, actor, "User logged in: a@example.com").await;

        let logs = LogRepository::find(&store, FindOptions::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, actor);
        assert_eq!(logs[0].action, "User logged in: a@example.com");
    }

    #[tokio::test]
    async fn test_record_swallows_storage_failures() {
        // Completes without panicking or returning an error
        record(&BrokenLogs, Uuid::new_v4(), "Deleted user: b@example.com").await;
    }
}
