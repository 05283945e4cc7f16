//! Storage-used counters.
//!
//! File inserts and deletes credit and debit the owner's counter inside the
//! record store's own unit of work, so the counter always equals the sum of
//! the owner's recorded file sizes. The explicit `credit`/`debit` entry
//! points exist for maintenance; `reconcile` recomputes the counter from
//! the file records.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_database::UserStore;

/// Result of recomputing one user's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageReconciliation {
    /// Account whose counter was recomputed.
    pub user_id: Uuid,
    /// Counter before.
    pub previous_bytes: i64,
    /// Counter after (sum of recorded file sizes).
    pub current_bytes: i64,
}

impl UsageReconciliation {
    /// Signed correction that was applied.
    pub fn drift(&self) -> i64 {
        self.current_bytes - self.previous_bytes
    }
}

/// Reads and adjusts per-user storage counters.
#[derive(Debug, Clone)]
pub struct StorageAccounting {
    users: Arc<dyn UserStore>,
}

impl StorageAccounting {
    /// Creates a new accounting service.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Adds `bytes` to the owner's counter. Returns the new value.
    pub async fn credit(&self, owner_id: Uuid, bytes: i64) -> Result<i64, AppError> {
        if bytes < 0 {
            return Err(AppError::invalid_input("Credit must not be negative"));
        }
        self.users.adjust_storage(owner_id, bytes).await
    }

    /// Subtracts `bytes` from the owner's counter, flooring at zero.
    pub async fn debit(&self, owner_id: Uuid, bytes: i64) -> Result<i64, AppError> {
        if bytes < 0 {
            return Err(AppError::invalid_input("Debit must not be negative"));
        }
        self.users.adjust_storage(owner_id, -bytes).await
    }

    /// Current counter value.
    pub async fn usage(&self, owner_id: Uuid) -> Result<i64, AppError> {
        self.users
            .find_by_id(owner_id)
            .await?
            .map(|u| u.storage_used)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Sets the counter to the sum of the owner's recorded file sizes.
    pub async fn reconcile(&self, owner_id: Uuid) -> Result<UsageReconciliation, AppError> {
        let (previous_bytes, current_bytes) = self.users.recompute_storage(owner_id).await?;
        let report = UsageReconciliation {
            user_id: owner_id,
            previous_bytes,
            current_bytes,
        };

        if report.drift() != 0 {
            info!(
                user_id = %owner_id,
                previous = previous_bytes,
                current = current_bytes,
                "Storage usage reconciled"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use minicloud_core::ErrorKind;
    use minicloud_database::MemoryRecordStore;
    use minicloud_entity::user::CreateUser;

    use super::*;

    async fn setup() -> (StorageAccounting, Uuid) {
        let store = Arc::new(MemoryRecordStore::new());
        let user = UserStore::create(
            store.as_ref(),
            &CreateUser::regular("alice", "alice@example.com", "hash".into()),
        )
        .await
        .unwrap();
        (StorageAccounting::new(store), user.id)
    }

    #[tokio::test]
    async fn credit_and_debit_floor_at_zero() {
        let (accounting, user) = setup().await;

        assert_eq!(accounting.credit(user, 100).await.unwrap(), 100);
        assert_eq!(accounting.debit(user, 40).await.unwrap(), 60);
        assert_eq!(accounting.debit(user, 500).await.unwrap(), 0);
        assert_eq!(accounting.usage(user).await.unwrap(), 0);

        let err = accounting.credit(user, -1).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn reconcile_restores_sum_of_file_sizes() {
        let (accounting, user) = setup().await;
        accounting.credit(user, 1234).await.unwrap();

        // no file records exist, so the counter drifts back to zero
        let report = accounting.reconcile(user).await.unwrap();
        assert_eq!(report.previous_bytes, 1234);
        assert_eq!(report.current_bytes, 0);
        assert_eq!(report.drift(), -1234);
    }

    #[tokio::test]
    async fn usage_of_unknown_user_is_not_found() {
        let (accounting, _) = setup().await;
        let err = accounting.usage(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
