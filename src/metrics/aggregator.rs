//! Precision/recall accumulation across scenes.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Final score of one threshold slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct F1Score {
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

impl F1Score {
    pub fn new(precision: f64, recall: f64) -> Self {
        Self {
            f1: f1_score(precision, recall),
            precision,
            recall,
        }
    }
}

/// Harmonic mean of precision and recall.
///
/// Returns exactly 0 when either input is 0.
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision * recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Turn per-slot `(precision, recall)` sums over `scene_count` scenes into
/// scores.
pub fn calculate_f1(sums: &[Vector2<f64>], scene_count: usize) -> Result<Vec<F1Score>> {
    if scene_count == 0 {
        return Err(Error::EmptyEvaluation);
    }
    Ok(sums
        .iter()
        .map(|sum| {
            let mean = sum / scene_count as f64;
            F1Score::new(mean.x, mean.y)
        })
        .collect())
}

/// Running `(precision, recall)` sums, one per threshold slot.
///
/// The mean is unweighted: every scene counts once regardless of how many
/// agents or groups it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricAggregator {
    sums: Vec<Vector2<f64>>,
    scenes: usize,
}

impl MetricAggregator {
    pub fn new(num_slots: usize) -> Self {
        Self {
            sums: vec![Vector2::zeros(); num_slots],
            scenes: 0,
        }
    }

    pub fn num_slots(&self) -> usize {
        self.sums.len()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes
    }

    pub fn sums(&self) -> &[Vector2<f64>] {
        &self.sums
    }

    /// Add one scene's `(precision, recall)` for every slot, in slot order.
    pub fn record_scene(&mut self, scores: &[(f64, f64)]) -> Result<()> {
        if scores.len() != self.sums.len() {
            return Err(Error::InvalidConfig(format!(
                "expected {} slot scores, got {}",
                self.sums.len(),
                scores.len()
            )));
        }
        for (sum, &(precision, recall)) in self.sums.iter_mut().zip(scores) {
            *sum += Vector2::new(precision, recall);
        }
        self.scenes += 1;
        Ok(())
    }

    /// Fold another accumulator over the same slots into this one.
    pub fn merge(&mut self, other: &MetricAggregator) -> Result<()> {
        if other.sums.len() != self.sums.len() {
            return Err(Error::InvalidConfig(format!(
                "cannot merge aggregators with {} and {} slots",
                self.sums.len(),
                other.sums.len()
            )));
        }
        for (sum, other_sum) in self.sums.iter_mut().zip(&other.sums) {
            *sum += other_sum;
        }
        self.scenes += other.scenes;
        Ok(())
    }

    /// Average the sums and compute F1 per slot.
    pub fn finalize(&self) -> Result<Vec<F1Score>> {
        calculate_f1(&self.sums, self.scenes)
    }
}
