//! # groupeval - Group Detection Evaluation
//!
//! Scores predicted social groupings of agents (e.g. pedestrians) against
//! ground-truth groupings, scene by scene, and aggregates the results into
//! F1 scores over several overlap thresholds.
//!
//! ## Features
//!
//! - Merging of ground-truth listings where an agent appears in several groups
//! - Scene segmentation by composite time keys or explicit frame identifiers
//! - Threshold matching with reusable / non-reusable predicted groups
//! - Unweighted per-scene averaging into precision, recall and F1
//! - Pluggable clustering and group-MITRE collaborators
//!
//! ## Example
//!
//! ```rust
//! use groupeval_rs::{evaluate_groups, Group};
//!
//! let truth = vec![Group::new(vec![1, 2]), Group::new(vec![2, 3])];
//! let mut guesses = vec![Group::new(vec![1, 2, 3])];
//!
//! let result = evaluate_groups(&mut guesses, &truth, 0.5, true).unwrap();
//! assert_eq!(result.true_positives, 1);
//! assert!(guesses.is_empty());
//! ```

// Internal modules (array helpers)
pub(crate) mod internal;

// Public modules
pub mod adapters;
pub mod agent;
pub mod config;
pub mod matching;
pub mod merge;
pub mod metrics;
pub mod segment;

// Optional modules
#[cfg(feature = "python")]
pub mod python;

// Re-exports for convenience
pub use adapters::{Clustering, ClusteringAdapter, GroupMitreAdapter, MitreScore, SceneInput};
pub use agent::{groups_from_membership, AgentId, Group, MembershipVector, SlotMap, SlotResolver, SyntheticNames};
pub use config::{EvaluationConfig, ThresholdSlot};
pub use matching::{evaluate_groups, GroupMatcher, ThresholdResult};
pub use merge::merge_groups;
pub use metrics::{F1Score, MetricAggregator};
pub use segment::{FrameKey, FrameRoster, SceneBatch, SceneKey, SegmentationMode};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur while evaluating group detections
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Malformed input at line {line}: {content:?}")]
        MalformedInput { line: usize, content: String },

        #[error(
            "Division by zero: {true_groups} countable true groups, {guess_groups} countable predicted groups"
        )]
        DivisionByZero { true_groups: i64, guess_groups: i64 },

        #[error("Time key {key} at row {index} reappears after its scene ended")]
        UnorderedTimeKeys { index: usize, key: String },

        #[error("Invalid time key (expected at least 4 ':'-separated fields): {0}")]
        InvalidTimeKey(String),

        #[error("Invalid membership vector: expected {expected} slots, got {got}")]
        InvalidMembership { expected: usize, got: usize },

        #[error("Agent slot {0} is not in the agent map")]
        UnknownAgentSlot(usize),

        #[error("Clustering returned no agent map")]
        MissingAgentMap,

        #[error("No ground-truth groups for scene {0}")]
        MissingGroundTruth(String),

        #[error("No agents recorded for frame {0}")]
        MissingFrame(String),

        #[error("Affinity matrix has {rows} rows but {keys} scene keys were given")]
        LengthMismatch { rows: usize, keys: usize },

        #[error("No scenes were evaluated")]
        EmptyEvaluation,

        #[error("Clustering error: {0}")]
        Clustering(String),

        #[error("Group-MITRE error: {0}")]
        GroupMitre(String),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),
    }

    /// Result type for group evaluation operations
    pub type Result<T> = std::result::Result<T, Error>;
}
