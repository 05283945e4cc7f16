//! Security ledger recording.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_database::SecurityLogStore;
use minicloud_entity::audit::{NewSecurityEvent, SecurityEvent, SecurityEventKind};

/// Default number of events returned by [`SecurityAudit::recent`].
pub const DEFAULT_EVENT_LIMIT: i64 = 100;

/// Upper bound on events returned by one listing.
pub const MAX_EVENT_LIMIT: i64 = 1000;

/// Appends security events and reads them back.
#[derive(Debug, Clone)]
pub struct SecurityAudit {
    logs: Arc<dyn SecurityLogStore>,
}

impl SecurityAudit {
    /// Creates a new audit recorder.
    pub fn new(logs: Arc<dyn SecurityLogStore>) -> Self {
        Self { logs }
    }

    /// Records an event. The operation being audited has already happened,
    /// so a ledger failure is logged and swallowed.
    pub async fn record(
        &self,
        kind: SecurityEventKind,
        user_id: Option<Uuid>,
        details: impl Into<String>,
    ) {
        let event = NewSecurityEvent {
            kind,
            user_id,
            details: details.into(),
        };

        match self.logs.append(&event).await {
            Ok(_) => info!(event = %kind, user_id = ?user_id, "Security event recorded"),
            Err(e) => error!(event = %kind, user_id = ?user_id, error = %e, "Failed to record security event"),
        }
    }

    /// Most recent events first. `limit` is clamped to
    /// `1..=MAX_EVENT_LIMIT`.
    pub async fn recent(&self, limit: Option<i64>) -> Result<Vec<SecurityEvent>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_EVENT_LIMIT).clamp(1, MAX_EVENT_LIMIT);
        self.logs.recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use minicloud_database::MemoryRecordStore;

    use super::*;

    #[tokio::test]
    async fn recorded_events_read_back_newest_first() {
        let audit = SecurityAudit::new(Arc::new(MemoryRecordStore::new()));
        let user = Uuid::new_v4();

        audit
            .record(SecurityEventKind::UserRegistered, Some(user), "User alice registered")
            .await;
        audit
            .record(SecurityEventKind::UserLogin, Some(user), "User alice logged in")
            .await;

        let events = audit.recent(None).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "user_login");
        assert_eq!(events[1].details, "User alice registered");

        assert_eq!(audit.recent(Some(0)).await.unwrap().len(), 1);
    }
}
