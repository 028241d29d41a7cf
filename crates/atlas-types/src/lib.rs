pub mod actor;
pub mod error;
pub mod event;
pub mod id;
pub mod params;
pub mod record;

pub use actor::Actor;
pub use error::{CollabError, Result};
pub use event::{
    CreditReason, EditEvent, EditKind, FieldValidationResult, ReportOutcome, ReportResult,
};
pub use id::{RecordId, UserId};
pub use params::CollabParams;
pub use record::{Record, RecordStatus};
