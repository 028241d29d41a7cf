pub mod classifier;
pub mod quorum;
pub mod report;
pub mod store;
pub mod visibility;

pub use classifier::EditClassifier;
pub use quorum::{FieldVotes, ValidationQuorum};
pub use report::ReportTracker;
pub use store::RecordStore;
pub use visibility::is_visible;

use atlas_ledger::{LedgerStorage, PointsLedger};
use atlas_types::{
    Actor, CollabError, CollabParams, CreditReason, EditEvent, EditKind, FieldValidationResult,
    Record, RecordId, ReportResult, Result, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Counts of records by trust state, for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub records: usize,
    pub validated: usize,
    pub reported: usize,
    pub deleted: usize,
}

/// Entry point of the trust & consensus engine. Orchestrates classification,
/// quorum voting, reporting and visibility over a shared record catalog,
/// crediting the points ledger as operations succeed.
pub struct CatalogEngine {
    params: CollabParams,
    pub ledger: PointsLedger,
    pub classifier: EditClassifier,
    pub quorum: ValidationQuorum,
    pub reports: ReportTracker,
    store: RecordStore,
}

impl CatalogEngine {
    pub fn new(params: CollabParams, storage: Arc<dyn LedgerStorage>) -> Self {
        let ledger = PointsLedger::new(storage);
        Self {
            classifier: EditClassifier::new(params.clone()),
            quorum: ValidationQuorum::new(params.clone(), ledger.clone()),
            reports: ReportTracker::new(params.clone(), ledger.clone()),
            store: RecordStore::new(),
            ledger,
            params,
        }
    }

    pub fn params(&self) -> &CollabParams {
        &self.params
    }

    /// Whether `actor` is a trusted contributor: an admin, or a user whose
    /// reputation meets the configured threshold.
    pub async fn is_trusted(&self, actor: &Actor) -> Result<bool> {
        if actor.is_admin {
            return Ok(true);
        }
        self.ledger
            .is_trusted(actor.id, self.params.trusted_reputation_threshold)
            .await
    }

    /// Create a new record. Trusted contributors publish instantly; everyone
    /// else starts pending. The creator earns the creation award
    /// unconditionally.
    pub async fn create(
        &self,
        fields: BTreeMap<String, Option<String>>,
        actor: &Actor,
    ) -> Result<Record> {
        // Trustedness is judged on reputation as it stands before the
        // creation award lands.
        let trusted = self.is_trusted(actor).await?;

        let mut record = Record::new(fields, actor.id);
        record.is_validated = trusted;

        self.ledger
            .credit(
                actor.id,
                self.params.creation_points as i64,
                CreditReason::Creation,
            )
            .await?;
        self.store.insert(record.clone()).await;

        info!(
            record = %record.id,
            actor = %actor.id,
            validated = record.is_validated,
            "📍 Record created"
        );
        Ok(record)
    }

    /// Write `new_value` into `field`, classifying the edit and crediting
    /// the actor. The record's lock is held across classify, credit and
    /// apply, so the award and the mutation are all-or-nothing.
    pub async fn update_field(
        &self,
        record_id: RecordId,
        field: &str,
        new_value: Option<&str>,
        actor: &Actor,
    ) -> Result<EditEvent> {
        let entry = self.store.entry(record_id).await?;
        let mut record = entry.write().await;

        if record.is_deleted() {
            return Err(CollabError::RecordDeleted(record_id));
        }

        let event = self.classifier.classify(&record, field, new_value, actor)?;

        if event.points > 0 {
            let reason = match event.kind {
                EditKind::New => CreditReason::FillMissing,
                _ => CreditReason::Correction,
            };
            // Credit before applying; a ledger failure leaves the field
            // untouched.
            self.ledger
                .credit(actor.id, event.points as i64, reason)
                .await?;
        }

        let normalized = new_value.filter(|v| !v.is_empty()).map(|v| v.to_string());
        if record.field_value(field) != normalized.as_deref() {
            record.fields.insert(field.to_string(), normalized);
            debug!(
                record = %record_id,
                field = field,
                actor = %actor.id,
                kind = ?event.kind,
                points = event.points,
                "✏️ Field updated"
            );
        }

        Ok(event)
    }

    /// Cast a validation vote on one field. Pass-through to the quorum with
    /// the deleted-record guard applied first.
    pub async fn validate_field(
        &self,
        record_id: RecordId,
        field: &str,
        actor: &Actor,
    ) -> Result<FieldValidationResult> {
        let entry = self.store.entry(record_id).await?;
        let record = entry.read().await;
        if record.is_deleted() {
            return Err(CollabError::RecordDeleted(record_id));
        }
        self.quorum.vote(&record, field, actor).await
    }

    /// Report a record as false. Third parties flag it; the creator's own
    /// report retracts (soft-deletes) it.
    pub async fn mark_as_false(
        &self,
        record_id: RecordId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<ReportResult> {
        let entry = self.store.entry(record_id).await?;
        let mut record = entry.write().await;
        if record.is_deleted() {
            return Err(CollabError::RecordDeleted(record_id));
        }
        self.reports.report(&mut record, actor, reason).await
    }

    /// Publish a record. Admins and trusted reviewers only; validation is a
    /// one-way transition and repeating it is a no-op.
    pub async fn validate(&self, record_id: RecordId, actor: &Actor) -> Result<()> {
        if !self.is_trusted(actor).await? {
            return Err(CollabError::Unauthorized(format!(
                "{} is not an admin or trusted reviewer",
                actor.id
            )));
        }

        let entry = self.store.entry(record_id).await?;
        let mut record = entry.write().await;
        if record.is_deleted() {
            return Err(CollabError::RecordDeleted(record_id));
        }
        if !record.is_validated {
            record.is_validated = true;
            info!(record = %record_id, actor = %actor.id, "✅ Record validated");
        }
        Ok(())
    }

    /// Whether `viewer` may currently see the record.
    pub async fn is_visible(&self, record_id: RecordId, viewer: &Actor) -> Result<bool> {
        let record = self.store.get(record_id).await?;
        Ok(visibility::is_visible(&record, viewer))
    }

    pub async fn get_record(&self, record_id: RecordId) -> Result<Record> {
        self.store.get(record_id).await
    }

    /// Field-level trust signal without casting a vote.
    pub async fn field_validation(
        &self,
        record_id: RecordId,
        field: &str,
    ) -> Result<FieldValidationResult> {
        let record = self.store.get(record_id).await?;
        if !record.has_field(field) {
            return Err(CollabError::UnknownField {
                field: field.to_string(),
            });
        }
        Ok(self.quorum.field_status(record_id, field).await)
    }

    /// Escape hatch for external bonus logic (e.g. streak bonuses). Returns
    /// the new total; negative amounts are rejected.
    pub async fn credit(&self, user: UserId, amount: i64) -> Result<u64> {
        self.ledger.credit(user, amount, CreditReason::External).await
    }

    pub async fn stats(&self) -> EngineStats {
        let records = self.store.snapshot_all().await;
        EngineStats {
            records: records.len(),
            validated: records.iter().filter(|r| r.is_validated).count(),
            reported: records.iter().filter(|r| r.is_reported).count(),
            deleted: records.iter().filter(|r| r.is_deleted()).count(),
        }
    }
}
