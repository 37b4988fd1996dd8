//! Evaluation configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::segment::SegmentationMode;
use crate::{Error, Result};

/// One column of the evaluation output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSlot {
    /// Overlap matching at threshold `T`.
    Overlap(f64),
    /// Scores delegated to a group-MITRE collaborator (no threshold).
    GroupMitre,
}

impl ThresholdSlot {
    pub fn threshold(&self) -> Option<f64> {
        match self {
            ThresholdSlot::Overlap(t) => Some(*t),
            ThresholdSlot::GroupMitre => None,
        }
    }
}

/// Configuration of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Output slots, evaluated per scene in this order.
    pub thresholds: Vec<ThresholdSlot>,

    /// Remove a predicted group once it matched a true group.
    pub non_reusable: bool,

    /// Handling of non-contiguous composite time keys.
    pub segmentation: SegmentationMode,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![
                ThresholdSlot::Overlap(2.0 / 3.0),
                ThresholdSlot::Overlap(1.0),
            ],
            non_reusable: false,
            segmentation: SegmentationMode::default(),
        }
    }
}

impl EvaluationConfig {
    /// Configuration with the given overlap thresholds and default policies.
    pub fn new(thresholds: &[f64]) -> Self {
        Self {
            thresholds: thresholds.iter().map(|&t| ThresholdSlot::Overlap(t)).collect(),
            ..Self::default()
        }
    }

    /// Append a group-MITRE slot after the overlap thresholds.
    pub fn with_group_mitre(mut self) -> Self {
        self.thresholds.push(ThresholdSlot::GroupMitre);
        self
    }

    pub fn with_non_reusable(mut self, non_reusable: bool) -> Self {
        self.non_reusable = non_reusable;
        self
    }

    pub fn with_segmentation(mut self, segmentation: SegmentationMode) -> Self {
        self.segmentation = segmentation;
        self
    }

    /// Whether any slot needs a group-MITRE collaborator.
    pub fn uses_group_mitre(&self) -> bool {
        self.thresholds.contains(&ThresholdSlot::GroupMitre)
    }

    pub fn validate(&self) -> Result<()> {
        if self.thresholds.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one threshold slot is required".to_string(),
            ));
        }

        for slot in &self.thresholds {
            if let ThresholdSlot::Overlap(t) = slot {
                if !t.is_finite() || !(0.0..=1.0).contains(t) {
                    return Err(Error::InvalidConfig(format!(
                        "overlap threshold must be in [0, 1], got {}",
                        t
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!(
                    "failed to read config '{}': {}",
                    path.as_ref().display(),
                    e
                ),
            ))
        })?;
        Self::from_json_str(&content)
    }
}
