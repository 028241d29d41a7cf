use atlas_ledger::PointsLedger;
use atlas_types::{
    Actor, CollabParams, CreditReason, Record, RecordId, RecordStatus, ReportOutcome,
    ReportResult, Result, UserId,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Tracks "mark as false" reports. A creator reporting their own record
/// retracts it (soft-delete); a third party flags it and is rewarded once.
///
/// Reporter sets are locked per record: the outer map lock is held only
/// for lookup/insert, so reports against unrelated records never wait on
/// each other's ledger round-trips.
pub struct ReportTracker {
    reporters: Arc<RwLock<HashMap<RecordId, Arc<RwLock<HashSet<UserId>>>>>>,
    ledger: PointsLedger,
    params: CollabParams,
}

impl ReportTracker {
    pub fn new(params: CollabParams, ledger: PointsLedger) -> Self {
        Self {
            reporters: Arc::new(RwLock::new(HashMap::new())),
            ledger,
            params,
        }
    }

    async fn entry(&self, record: RecordId) -> Arc<RwLock<HashSet<UserId>>> {
        let mut reporters = self.reporters.write().await;
        Arc::clone(reporters.entry(record).or_default())
    }

    /// Apply a report to `record`. The caller holds the record's write lock;
    /// the mutation and the point award are all-or-nothing (credit happens
    /// before any state changes).
    pub async fn report(
        &self,
        record: &mut Record,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<ReportResult> {
        if actor.id == record.created_by {
            // A creator retracting their own bad submission is corrective,
            // not something to police or reward.
            record.status = RecordStatus::Deleted {
                deleted_at: Utc::now().timestamp(),
            };
            info!(
                record = %record.id,
                actor = %actor.id,
                "🗑️ Record self-retracted by creator"
            );
            return Ok(ReportResult {
                outcome: ReportOutcome::SelfDeleted,
                points_awarded: 0,
            });
        }

        let cell = self.entry(record.id).await;
        let mut reporters = cell.write().await;
        if reporters.contains(&actor.id) {
            debug!(
                record = %record.id,
                actor = %actor.id,
                "Duplicate report ignored"
            );
            return Ok(ReportResult {
                outcome: ReportOutcome::AlreadyReported,
                points_awarded: 0,
            });
        }

        self.ledger
            .credit(actor.id, self.params.report_points as i64, CreditReason::Report)
            .await?;

        reporters.insert(actor.id);
        record.is_reported = true;
        if reason.is_some() {
            record.report_reason = reason;
        }
        info!(
            record = %record.id,
            actor = %actor.id,
            "🚩 Record reported as false"
        );

        Ok(ReportResult {
            outcome: ReportOutcome::Flagged,
            points_awarded: self.params.report_points,
        })
    }
}

impl Clone for ReportTracker {
    fn clone(&self) -> Self {
        Self {
            reporters: Arc::clone(&self.reporters),
            ledger: self.ledger.clone(),
            params: self.params.clone(),
        }
    }
}
