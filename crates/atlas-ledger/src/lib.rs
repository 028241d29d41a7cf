pub mod storage;

pub use storage::{CreditRecord, LedgerStorage, MemoryLedger};

use atlas_types::{CollabError, CreditReason, Result, UserId};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Cumulative reputation points per user. Credits are additive only;
/// point totals never decrease through this API.
pub struct PointsLedger {
    storage: Arc<dyn LedgerStorage>,
}

impl PointsLedger {
    pub fn new(storage: Arc<dyn LedgerStorage>) -> Self {
        Self { storage }
    }

    /// Credit `amount` points to `user` and return the new total.
    ///
    /// Zero is a successful no-op; negative amounts are rejected with
    /// `InvalidAmount` before any state is touched.
    pub async fn credit(&self, user: UserId, amount: i64, reason: CreditReason) -> Result<u64> {
        if amount < 0 {
            return Err(CollabError::InvalidAmount(amount));
        }
        if amount == 0 {
            return self.storage.get_points(user).await;
        }

        let amount = amount as u64;
        let new_total = self.storage.add_points(user, amount).await?;
        self.storage
            .record_credit(CreditRecord {
                user,
                amount,
                reason,
                timestamp: Utc::now(),
            })
            .await?;

        info!(
            user = %user,
            amount = amount,
            reason = ?reason,
            total = new_total,
            "💰 Points credited"
        );
        Ok(new_total)
    }

    pub async fn points(&self, user: UserId) -> Result<u64> {
        self.storage.get_points(user).await
    }

    /// Whether `user`'s reputation meets the trusted-contributor threshold.
    pub async fn is_trusted(&self, user: UserId, threshold: u64) -> Result<bool> {
        Ok(self.storage.get_points(user).await? >= threshold)
    }

    pub async fn history(&self, user: UserId) -> Result<Vec<CreditRecord>> {
        self.storage.credit_history(user).await
    }
}

impl Clone for PointsLedger {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}
