use atlas_types::{Actor, CollabError, CollabParams, EditEvent, EditKind, Record, Result};

/// Classifies a field edit into a category and its point value.
///
/// The classifier never mutates anything; the caller applies the field
/// change and forwards the point award to the ledger.
pub struct EditClassifier {
    params: CollabParams,
}

impl EditClassifier {
    pub fn new(params: CollabParams) -> Self {
        Self { params }
    }

    /// Classify writing `new_value` into `field` of `record` by `actor`.
    ///
    /// The old value is read from the record snapshot the caller holds
    /// locked, so classification and application see the same state.
    /// Empty strings and absent values are both treated as missing.
    pub fn classify(
        &self,
        record: &Record,
        field: &str,
        new_value: Option<&str>,
        actor: &Actor,
    ) -> Result<EditEvent> {
        if !record.has_field(field) {
            return Err(CollabError::UnknownField {
                field: field.to_string(),
            });
        }

        let old = record.field_value(field);
        let new = new_value.filter(|v| !v.is_empty());

        let (kind, points) = match (old, new) {
            (None, Some(_)) => (EditKind::New, self.params.fill_points),
            (Some(old), Some(new)) if old != new => {
                (EditKind::PartialUpdate, self.params.correction_points)
            }
            // No-op write, or a field being cleared; neither is rewarded.
            _ => (EditKind::NoChange, 0),
        };

        // Self-edits proceed but are never rewarded.
        let points = if actor.id == record.created_by {
            0
        } else {
            points
        };

        Ok(EditEvent {
            kind,
            points,
            actor: actor.id,
            record: record.id,
            field: Some(field.to_string()),
        })
    }
}
