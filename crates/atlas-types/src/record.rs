use crate::id::{RecordId, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of a record. Deletion is a tagged state, never a
/// physical removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Active,
    Deleted { deleted_at: i64 },
}

/// A collaboratively edited catalog record. The set of field names fixed at
/// creation time is the record's schema; values may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, Option<String>>,
    pub created_by: UserId,
    pub status: RecordStatus,
    pub is_validated: bool,
    pub is_reported: bool,
    pub report_reason: Option<String>,
    pub created_at: i64,
}

impl Record {
    pub fn new(fields: BTreeMap<String, Option<String>>, created_by: UserId) -> Self {
        let now = Utc::now();
        let created_at = now.timestamp();
        let mut material = Vec::new();
        material.extend_from_slice(created_by.as_bytes());
        material.extend_from_slice(&created_at.to_le_bytes());
        material.extend_from_slice(&now.timestamp_subsec_nanos().to_le_bytes());
        for (name, value) in &fields {
            material.extend_from_slice(name.as_bytes());
            material.push(0);
            if let Some(v) = value {
                material.extend_from_slice(v.as_bytes());
            }
            material.push(0);
        }

        Self {
            id: RecordId::new(&material),
            fields,
            created_by,
            status: RecordStatus::Active,
            is_validated: false,
            is_reported: false,
            report_reason: None,
            created_at,
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Current value of a field, flattened: an empty string and an absent
    /// value are both "missing" for classification purposes.
    pub fn field_value(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.status, RecordStatus::Deleted { .. })
    }

    pub fn deleted_at(&self) -> Option<i64> {
        match self.status {
            RecordStatus::Active => None,
            RecordStatus::Deleted { deleted_at } => Some(deleted_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, Option<&str>)]) -> BTreeMap<String, Option<String>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(|s| s.to_string())))
            .collect()
    }

    #[test]
    fn test_new_record_is_active_and_unvalidated() {
        let record = Record::new(
            fields(&[("name", Some("Central Park")), ("description", None)]),
            UserId::from_bytes([1; 32]),
        );
        assert_eq!(record.status, RecordStatus::Active);
        assert!(!record.is_validated);
        assert!(!record.is_reported);
        assert!(record.deleted_at().is_none());
    }

    #[test]
    fn test_field_value_treats_empty_as_missing() {
        let record = Record::new(
            fields(&[
                ("name", Some("Central Park")),
                ("description", Some("")),
                ("neighborhood", None),
            ]),
            UserId::from_bytes([1; 32]),
        );
        assert_eq!(record.field_value("name"), Some("Central Park"));
        assert_eq!(record.field_value("description"), None);
        assert_eq!(record.field_value("neighborhood"), None);
        assert!(record.has_field("description"));
        assert!(!record.has_field("rating"));
    }

    #[test]
    fn test_distinct_creators_get_distinct_ids() {
        let f = fields(&[("name", Some("Park"))]);
        let a = Record::new(f.clone(), UserId::from_bytes([1; 32]));
        let b = Record::new(f, UserId::from_bytes([2; 32]));
        assert_ne!(a.id, b.id);
    }
}
