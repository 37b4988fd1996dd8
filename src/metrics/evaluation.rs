//! End-to-end group detection evaluation.
//!
//! Both pipelines follow the same steps per scene: gather the scene's rows
//! of the affinity matrix, let the clustering collaborator form groups,
//! score every threshold slot against the scene's ground truth and fold the
//! result into a [`MetricAggregator`].

use std::collections::HashMap;
use std::fmt;

use nalgebra::DMatrix;

use super::{F1Score, MetricAggregator};
use crate::adapters::{ClusteringAdapter, GroupMitreAdapter, SceneInput};
use crate::agent::{groups_from_membership, AgentId, Group, SyntheticNames};
use crate::config::{EvaluationConfig, ThresholdSlot};
use crate::internal::numpy::take_rows_flat;
use crate::matching::GroupMatcher;
use crate::segment::{segment_frames, segment_time_keys, FrameKey, FrameRoster, SceneKey};
use crate::{Error, Result};

/// Score one scene's predicted groups for every configured slot.
///
/// Each overlap slot works on its own copy of `predicted`, so non-reusable
/// consumption in one slot never affects another.
pub fn score_scene<A: AgentId>(
    config: &EvaluationConfig,
    predicted: &[Group<A>],
    truth: &[Group<A>],
    mitre: Option<&dyn GroupMitreAdapter<A>>,
) -> Result<Vec<(f64, f64)>> {
    config
        .thresholds
        .iter()
        .map(|slot| match slot {
            ThresholdSlot::Overlap(t) => {
                let result = GroupMatcher::new(*t, config.non_reusable).evaluate(predicted, truth)?;
                Ok((result.precision, result.recall))
            }
            ThresholdSlot::GroupMitre => {
                let adapter = mitre.ok_or_else(missing_mitre)?;
                let score = adapter.score(truth, predicted)?;
                Ok((score.precision, score.recall))
            }
        })
        .collect()
}

/// Evaluate a stream keyed by composite `time:...:...:segment` keys.
///
/// `affinities` holds one row per agent pair, aligned with `time_keys`.
/// Scenes are contiguous runs of equal (field 0, field 3) pairs, subject to
/// `config.segmentation`. Ground truth is looked up by field 0; agents are
/// named `"ID_00{slot + 1}"` over `n_agents` slots.
///
/// Returns one score per threshold slot, in configuration order.
pub fn evaluate_time_keyed<S: AsRef<str>>(
    config: &EvaluationConfig,
    affinities: &DMatrix<f64>,
    time_keys: &[S],
    ground_truth: &HashMap<String, Vec<Group<String>>>,
    n_agents: usize,
    clustering: &dyn ClusteringAdapter<SceneKey, String>,
    mitre: Option<&dyn GroupMitreAdapter<String>>,
) -> Result<Vec<F1Score>> {
    check_inputs(config, affinities, time_keys.len(), mitre.is_some())?;

    let scenes = segment_time_keys(time_keys, config.segmentation)?;
    let mut aggregator = MetricAggregator::new(config.thresholds.len());

    for scene in &scenes {
        let truth = ground_truth
            .get(&scene.key.time)
            .ok_or_else(|| Error::MissingGroundTruth(scene.key.time.clone()))?;

        let predictions = take_rows_flat(affinities, &scene.indices);
        let input = SceneInput {
            key: &scene.key,
            rows: &scene.indices,
            predictions: &predictions,
            n_agents,
        };
        let clustered = clustering.cluster(&input)?;
        let predicted = groups_from_membership(&clustered.groups, n_agents, &SyntheticNames)?;

        log_scene(&scene.key, &scene.indices, n_agents, &predicted, truth);
        aggregator.record_scene(&score_scene(config, &predicted, truth, mitre)?)?;
    }

    finish(config, &aggregator)
}

/// Evaluate a stream keyed by explicit frame identifiers.
///
/// Every distinct key in `frame_keys` (a frame or a window of frames) is one
/// scene, whether or not its rows are contiguous. The agent count comes from
/// `roster`; agent ids come from the clustering's slot map. Ground truth is
/// the first entry of `ground_truth` whose key equals the scene key.
pub fn evaluate_frame_keyed<A: AgentId>(
    config: &EvaluationConfig,
    affinities: &DMatrix<f64>,
    frame_keys: &[FrameKey],
    ground_truth: &[(FrameKey, Vec<Group<A>>)],
    roster: &FrameRoster<A>,
    clustering: &dyn ClusteringAdapter<FrameKey, A>,
    mitre: Option<&dyn GroupMitreAdapter<A>>,
) -> Result<Vec<F1Score>> {
    check_inputs(config, affinities, frame_keys.len(), mitre.is_some())?;

    let scenes = segment_frames(frame_keys);
    let mut aggregator = MetricAggregator::new(config.thresholds.len());

    for scene in &scenes {
        let truth = ground_truth
            .iter()
            .find(|(key, _)| *key == scene.key)
            .map(|(_, groups)| groups)
            .ok_or_else(|| Error::MissingGroundTruth(scene.key.to_string()))?;

        let n_agents = roster.agent_count(&scene.key)?;
        let predictions = take_rows_flat(affinities, &scene.indices);
        let input = SceneInput {
            key: &scene.key,
            rows: &scene.indices,
            predictions: &predictions,
            n_agents,
        };
        let clustered = clustering.cluster(&input)?;
        let agent_map = clustered.agent_map.as_ref().ok_or(Error::MissingAgentMap)?;
        let predicted = groups_from_membership(&clustered.groups, n_agents, agent_map)?;

        log_scene(&scene.key, &scene.indices, n_agents, &predicted, truth);
        aggregator.record_scene(&score_scene(config, &predicted, truth, mitre)?)?;
    }

    finish(config, &aggregator)
}

fn check_inputs(
    config: &EvaluationConfig,
    affinities: &DMatrix<f64>,
    num_keys: usize,
    has_mitre: bool,
) -> Result<()> {
    config.validate()?;
    if config.uses_group_mitre() && !has_mitre {
        return Err(missing_mitre());
    }
    if affinities.nrows() != num_keys {
        return Err(Error::LengthMismatch {
            rows: affinities.nrows(),
            keys: num_keys,
        });
    }
    Ok(())
}

fn missing_mitre() -> Error {
    Error::InvalidConfig("group-MITRE slot configured without an adapter".to_string())
}

fn log_scene<K: fmt::Display, A>(
    key: &K,
    rows: &[usize],
    n_agents: usize,
    predicted: &[Group<A>],
    truth: &[Group<A>],
) {
    log::debug!(
        "scene {}: {} pairs, {} agents, {} predicted groups, {} true groups",
        key,
        rows.len(),
        n_agents,
        predicted.len(),
        truth.len()
    );
}

fn finish(config: &EvaluationConfig, aggregator: &MetricAggregator) -> Result<Vec<F1Score>> {
    let scores = aggregator.finalize()?;
    for (slot, score) in config.thresholds.iter().zip(&scores) {
        log::info!(
            "{:?} over {} scenes: F1 {:.4} (precision {:.4}, recall {:.4})",
            slot,
            aggregator.scene_count(),
            score.f1,
            score.precision,
            score.recall
        );
    }
    Ok(scores)
}
