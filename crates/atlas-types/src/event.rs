use crate::id::{RecordId, UserId};
use serde::{Deserialize, Serialize};

/// Category assigned to a field edit by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// First-time creation of a whole record.
    Creation,
    /// A missing attribute was filled in.
    New,
    /// An existing value was corrected.
    PartialUpdate,
    /// The write changed nothing of consequence.
    NoChange,
}

/// Outcome of a classified edit, returned to the caller. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditEvent {
    pub kind: EditKind,
    pub points: u64,
    pub actor: UserId,
    pub record: RecordId,
    pub field: Option<String>,
}

/// Outcome of a field validation vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidationResult {
    pub is_validated: bool,
    pub points_awarded: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportOutcome {
    /// A third party flagged the record as false.
    Flagged,
    /// The creator retracted their own record; it was soft-deleted.
    SelfDeleted,
    /// This reporter already flagged the record; nothing changed.
    AlreadyReported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResult {
    pub outcome: ReportOutcome,
    pub points_awarded: u64,
}

/// Why a ledger credit happened. Carried into the credit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditReason {
    Creation,
    Correction,
    FillMissing,
    Report,
    FieldVote,
    /// Credits applied through the external hook (e.g. streak bonuses).
    External,
}
