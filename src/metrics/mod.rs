//! Group detection metrics.
//!
//! This module provides the scoring side of the evaluation:
//!
//! - `GroupsFile` - Parse ground-truth `groups.txt` files
//! - `MetricAggregator` - Accumulate per-scene precision/recall into F1
//! - `evaluate_time_keyed` / `evaluate_frame_keyed` - Full evaluation pipelines

mod aggregator;
mod evaluation;
mod groups_file;

pub use aggregator::{calculate_f1, f1_score, F1Score, MetricAggregator};
pub use evaluation::{evaluate_frame_keyed, evaluate_time_keyed, score_scene};
pub use groups_file::GroupsFile;
