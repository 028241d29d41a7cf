use async_trait::async_trait;
use atlas_types::{CollabError, CreditReason, Result, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// One successful credit, kept for audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditRecord {
    pub user: UserId,
    pub amount: u64,
    pub reason: CreditReason,
    pub timestamp: DateTime<Utc>,
}

type PointsMap = HashMap<UserId, u64>;

/// Durable backend for the points ledger. Implementations must serialize
/// `add_points` per user so concurrent credits never lose an increment.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    async fn get_points(&self, user: UserId) -> Result<u64>;

    /// Atomic read-modify-write: adds `amount` and returns the new total.
    async fn add_points(&self, user: UserId, amount: u64) -> Result<u64>;

    async fn record_credit(&self, credit: CreditRecord) -> Result<()>;

    async fn credit_history(&self, user: UserId) -> Result<Vec<CreditRecord>>;
}

/// In-memory backend. The write lock around the points map makes each
/// read-modify-write a single serialized section per call.
pub struct MemoryLedger {
    points: Arc<RwLock<PointsMap>>,
    history: Arc<RwLock<Vec<CreditRecord>>>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            points: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LedgerStorage for MemoryLedger {
    async fn get_points(&self, user: UserId) -> Result<u64> {
        let points = self.points.read().await;
        Ok(points.get(&user).copied().unwrap_or(0))
    }

    async fn add_points(&self, user: UserId, amount: u64) -> Result<u64> {
        let mut points = self.points.write().await;
        let entry = points.entry(user).or_insert(0);
        let new_total = entry
            .checked_add(amount)
            .ok_or_else(|| CollabError::Storage(format!("points overflow for {}", user)))?;
        *entry = new_total;

        debug!(
            user = %user,
            amount = amount,
            total = new_total,
            storage_type = "memory",
            "Points stored"
        );
        Ok(new_total)
    }

    async fn record_credit(&self, credit: CreditRecord) -> Result<()> {
        let mut history = self.history.write().await;
        history.push(credit);
        Ok(())
    }

    async fn credit_history(&self, user: UserId) -> Result<Vec<CreditRecord>> {
        let history = self.history.read().await;
        Ok(history.iter().filter(|c| c.user == user).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_has_zero_points() {
        let storage = MemoryLedger::new();
        let user = UserId::from_bytes([1; 32]);
        assert_eq!(storage.get_points(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_points_accumulates() {
        let storage = MemoryLedger::new();
        let user = UserId::from_bytes([2; 32]);
        assert_eq!(storage.add_points(user, 50).await.unwrap(), 50);
        assert_eq!(storage.add_points(user, 20).await.unwrap(), 70);
        assert_eq!(storage.get_points(user).await.unwrap(), 70);
    }

    #[tokio::test]
    async fn test_add_points_overflow_is_rejected() {
        let storage = MemoryLedger::new();
        let user = UserId::from_bytes([3; 32]);
        storage.add_points(user, u64::MAX).await.unwrap();
        assert!(storage.add_points(user, 1).await.is_err());
        // Total is untouched by the failed add
        assert_eq!(storage.get_points(user).await.unwrap(), u64::MAX);
    }

    #[tokio::test]
    async fn test_history_is_per_user() {
        let storage = MemoryLedger::new();
        let alice = UserId::from_bytes([4; 32]);
        let bob = UserId::from_bytes([5; 32]);

        storage
            .record_credit(CreditRecord {
                user: alice,
                amount: 50,
                reason: CreditReason::Creation,
                timestamp: Utc::now(),
            })
            .await
            .unwrap();
        storage
            .record_credit(CreditRecord {
                user: bob,
                amount: 10,
                reason: CreditReason::Report,
                timestamp: Utc::now(),
            })
            .await
            .unwrap();

        let history = storage.credit_history(alice).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, 50);
        assert_eq!(history[0].reason, CreditReason::Creation);
    }
}
