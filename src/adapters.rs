//! Collaborator traits plugged into the evaluation pipelines.
//!
//! The clustering step that turns pairwise affinities into groups, and the
//! group-MITRE metric, live outside this crate. Pipelines only see them
//! through these traits.

use crate::agent::{Group, MembershipVector, SlotMap};
use crate::Result;

/// Per-scene input handed to a [`ClusteringAdapter`].
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a, K> {
    /// Scene identifier.
    pub key: &'a K,
    /// Rows of the prediction stream belonging to the scene.
    pub rows: &'a [usize],
    /// Affinity predictions of those rows, flattened row-major.
    pub predictions: &'a [f64],
    /// Number of agent slots in the scene.
    pub n_agents: usize,
}

/// Output of a clustering step.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering<A> {
    /// One membership vector per discovered group.
    pub groups: Vec<MembershipVector>,
    /// Slot-to-agent map, when the clustering knows real agent ids.
    pub agent_map: Option<SlotMap<A>>,
}

impl<A> Clustering<A> {
    /// Clustering whose slots are named synthetically.
    pub fn unmapped(groups: Vec<MembershipVector>) -> Self {
        Self {
            groups,
            agent_map: None,
        }
    }

    pub fn mapped(groups: Vec<MembershipVector>, agent_map: SlotMap<A>) -> Self {
        Self {
            groups,
            agent_map: Some(agent_map),
        }
    }
}

/// Turns a scene's pairwise affinity predictions into groups.
///
/// Implementations own whatever frame context they need (positions,
/// feature counts, samples per pair); the pipeline only supplies the scene.
pub trait ClusteringAdapter<K, A> {
    fn cluster(&self, scene: &SceneInput<'_, K>) -> Result<Clustering<A>>;
}

/// Scores returned by a group-MITRE collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MitreScore {
    pub precision: f64,
    pub recall: f64,
    /// Extra value reported by the collaborator, unused by aggregation.
    pub auxiliary: Option<f64>,
}

/// Alternative per-scene precision/recall metric.
pub trait GroupMitreAdapter<A> {
    fn score(&self, truth: &[Group<A>], predicted: &[Group<A>]) -> Result<MitreScore>;
}
