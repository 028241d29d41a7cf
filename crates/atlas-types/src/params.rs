use serde::{Deserialize, Serialize};

/// Tunable point values and thresholds for the engine. Injected into every
/// manager at construction; never hard-coded at use sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollabParams {
    /// Awarded for creating a well-formed record.
    pub creation_points: u64,
    /// Awarded for overwriting an incorrect value with a correction.
    pub correction_points: u64,
    /// Awarded for filling in a missing attribute.
    pub fill_points: u64,
    /// Awarded for a third-party "mark as false" report.
    pub report_points: u64,
    /// Awarded for a field validation vote.
    pub vote_points: u64,
    /// Distinct voters required before a field counts as validated.
    pub quorum_threshold: usize,
    /// Reputation at which a contributor's submissions publish instantly.
    pub trusted_reputation_threshold: u64,
}

impl Default for CollabParams {
    fn default() -> Self {
        Self {
            creation_points: 50,
            correction_points: 20,
            fill_points: 15,
            report_points: 10,
            vote_points: 5,
            quorum_threshold: 5,
            trusted_reputation_threshold: 100,
        }
    }
}
