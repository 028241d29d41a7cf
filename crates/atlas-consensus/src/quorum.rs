use atlas_ledger::PointsLedger;
use atlas_types::{
    Actor, CollabError, CollabParams, CreditReason, FieldValidationResult, Record, RecordId,
    Result, UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Validation votes cast on one (record, field) pair.
#[derive(Debug, Clone, Default)]
pub struct FieldVotes {
    pub voters: HashSet<UserId>,
    pub is_validated: bool,
}

type VoteKey = (RecordId, String);

/// Tallies distinct per-field validation votes and flips a field's
/// validated flag once the quorum threshold is reached. The flip is
/// monotonic; votes are never retracted.
///
/// The outer map lock is held only for entry lookup/insert; each
/// (record, field) pair carries its own lock, so votes on unrelated
/// fields never serialize behind each other or behind a ledger
/// round-trip.
pub struct ValidationQuorum {
    votes: Arc<RwLock<HashMap<VoteKey, Arc<RwLock<FieldVotes>>>>>,
    ledger: PointsLedger,
    params: CollabParams,
}

impl ValidationQuorum {
    pub fn new(params: CollabParams, ledger: PointsLedger) -> Self {
        Self {
            votes: Arc::new(RwLock::new(HashMap::new())),
            ledger,
            params,
        }
    }

    /// Handle to one field's vote set, created lazily on first use.
    async fn entry(&self, key: VoteKey) -> Arc<RwLock<FieldVotes>> {
        let mut votes = self.votes.write().await;
        Arc::clone(votes.entry(key).or_default())
    }

    /// Cast a validation vote by `actor` on `field` of `record`.
    ///
    /// Creator self-votes are not recorded. A repeat vote from the same
    /// user is idempotent: no new points, no duplicate vote. The point
    /// credit happens before the vote is recorded, inside the field's
    /// write section, so a ledger failure leaves no vote behind.
    pub async fn vote(
        &self,
        record: &Record,
        field: &str,
        actor: &Actor,
    ) -> Result<FieldValidationResult> {
        if !record.has_field(field) {
            return Err(CollabError::UnknownField {
                field: field.to_string(),
            });
        }

        if actor.id == record.created_by {
            // Self-validation is meaningless; report current state unchanged.
            return Ok(self.field_status(record.id, field).await);
        }

        let cell = self.entry((record.id, field.to_string())).await;
        let mut entry = cell.write().await;

        if entry.voters.contains(&actor.id) {
            debug!(
                record = %record.id,
                field = field,
                actor = %actor.id,
                "Duplicate field vote ignored"
            );
            return Ok(FieldValidationResult {
                is_validated: entry.is_validated,
                points_awarded: 0,
            });
        }

        self.ledger
            .credit(actor.id, self.params.vote_points as i64, CreditReason::FieldVote)
            .await?;

        entry.voters.insert(actor.id);
        if !entry.is_validated && entry.voters.len() >= self.params.quorum_threshold {
            entry.is_validated = true;
            info!(
                record = %record.id,
                field = field,
                voters = entry.voters.len(),
                "✅ Field reached validation quorum"
            );
        } else {
            debug!(
                record = %record.id,
                field = field,
                actor = %actor.id,
                voters = entry.voters.len(),
                "🗳️ Field vote recorded"
            );
        }

        Ok(FieldValidationResult {
            is_validated: entry.is_validated,
            points_awarded: self.params.vote_points,
        })
    }

    /// Current state of a (record, field) pair without casting a vote.
    pub async fn field_status(&self, record: RecordId, field: &str) -> FieldValidationResult {
        let cell = {
            let votes = self.votes.read().await;
            votes.get(&(record, field.to_string())).cloned()
        };
        let is_validated = match cell {
            Some(cell) => cell.read().await.is_validated,
            None => false,
        };
        FieldValidationResult {
            is_validated,
            points_awarded: 0,
        }
    }

    pub async fn voter_count(&self, record: RecordId, field: &str) -> usize {
        let cell = {
            let votes = self.votes.read().await;
            votes.get(&(record, field.to_string())).cloned()
        };
        match cell {
            Some(cell) => cell.read().await.voters.len(),
            None => 0,
        }
    }
}

impl Clone for ValidationQuorum {
    fn clone(&self) -> Self {
        Self {
            votes: Arc::clone(&self.votes),
            ledger: self.ledger.clone(),
            params: self.params.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_ledger::MemoryLedger;
    use std::collections::BTreeMap;

    fn setup() -> (ValidationQuorum, PointsLedger, Record) {
        let ledger = PointsLedger::new(Arc::new(MemoryLedger::new()));
        let quorum = ValidationQuorum::new(CollabParams::default(), ledger.clone());

        let mut fields = BTreeMap::new();
        fields.insert("neighborhood".to_string(), Some("Manhattan".to_string()));
        let record = Record::new(fields, UserId::from_bytes([99; 32]));
        (quorum, ledger, record)
    }

    #[tokio::test]
    async fn test_first_vote_earns_points_but_no_quorum() {
        let (quorum, ledger, record) = setup();
        let voter = Actor::new(UserId::from_bytes([1; 32]));

        let result = quorum.vote(&record, "neighborhood", &voter).await.unwrap();
        assert!(!result.is_validated);
        assert_eq!(result.points_awarded, 5);
        assert_eq!(ledger.points(voter.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_repeat_vote_is_idempotent() {
        let (quorum, ledger, record) = setup();
        let voter = Actor::new(UserId::from_bytes([1; 32]));

        quorum.vote(&record, "neighborhood", &voter).await.unwrap();
        let result = quorum.vote(&record, "neighborhood", &voter).await.unwrap();
        assert_eq!(result.points_awarded, 0);
        assert_eq!(ledger.points(voter.id).await.unwrap(), 5);
        assert_eq!(quorum.voter_count(record.id, "neighborhood").await, 1);
    }

    #[tokio::test]
    async fn test_creator_vote_is_not_recorded() {
        let (quorum, ledger, record) = setup();
        let creator = Actor::new(record.created_by);

        let result = quorum.vote(&record, "neighborhood", &creator).await.unwrap();
        assert_eq!(result.points_awarded, 0);
        assert_eq!(ledger.points(creator.id).await.unwrap(), 0);
        assert_eq!(quorum.voter_count(record.id, "neighborhood").await, 0);
    }

    #[tokio::test]
    async fn test_quorum_flips_at_threshold() {
        let (quorum, _ledger, record) = setup();

        for i in 1..=4u8 {
            let voter = Actor::new(UserId::from_bytes([i; 32]));
            let result = quorum.vote(&record, "neighborhood", &voter).await.unwrap();
            assert!(!result.is_validated);
        }

        let fifth = Actor::new(UserId::from_bytes([5; 32]));
        let result = quorum.vote(&record, "neighborhood", &fifth).await.unwrap();
        assert!(result.is_validated);
        assert!(
            quorum
                .field_status(record.id, "neighborhood")
                .await
                .is_validated
        );
    }

    #[tokio::test]
    async fn test_quorum_is_per_field() {
        let ledger = PointsLedger::new(Arc::new(MemoryLedger::new()));
        let params = CollabParams {
            quorum_threshold: 2,
            ..Default::default()
        };
        let quorum = ValidationQuorum::new(params, ledger);

        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), Some("Park".to_string()));
        fields.insert("location".to_string(), Some("NY".to_string()));
        let record = Record::new(fields, UserId::from_bytes([99; 32]));

        for i in 1..=2u8 {
            let voter = Actor::new(UserId::from_bytes([i; 32]));
            quorum.vote(&record, "name", &voter).await.unwrap();
        }

        assert!(quorum.field_status(record.id, "name").await.is_validated);
        assert!(!quorum.field_status(record.id, "location").await.is_validated);
    }

    #[tokio::test]
    async fn test_unknown_field_vote_is_rejected() {
        let (quorum, _ledger, record) = setup();
        let voter = Actor::new(UserId::from_bytes([1; 32]));

        let err = quorum.vote(&record, "rating", &voter).await.unwrap_err();
        assert!(matches!(err, CollabError::UnknownField { .. }));
    }

    #[tokio::test]
    async fn test_votes_on_other_fields_proceed_while_one_field_is_locked() {
        let (quorum, _ledger, record) = setup();

        // Hold one field's vote set locked, then vote on a different record
        let held = quorum
            .entry((record.id, "neighborhood".to_string()))
            .await;
        let _guard = held.write().await;

        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), Some("Other Park".to_string()));
        let other = Record::new(fields, UserId::from_bytes([98; 32]));
        let voter = Actor::new(UserId::from_bytes([1; 32]));

        let vote = quorum.vote(&other, "name", &voter);
        let result = tokio::time::timeout(std::time::Duration::from_secs(1), vote)
            .await
            .expect("vote on unrelated field must not block")
            .unwrap();
        assert_eq!(result.points_awarded, 5);
    }

    #[tokio::test]
    async fn test_concurrent_votes_count_distinct_users_once() {
        let (quorum, ledger, record) = setup();

        let mut handles = vec![];
        for i in 1..=5u8 {
            // Each voter votes twice, concurrently
            for _ in 0..2 {
                let quorum = quorum.clone();
                let record = record.clone();
                let voter = Actor::new(UserId::from_bytes([i; 32]));
                handles.push(tokio::spawn(async move {
                    quorum.vote(&record, "neighborhood", &voter).await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(quorum.voter_count(record.id, "neighborhood").await, 5);
        assert!(
            quorum
                .field_status(record.id, "neighborhood")
                .await
                .is_validated
        );
        for i in 1..=5u8 {
            let id = UserId::from_bytes([i; 32]);
            assert_eq!(ledger.points(id).await.unwrap(), 5);
        }
    }
}
