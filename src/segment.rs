//! Scene segmentation of flat per-pair prediction streams.
//!
//! Predictions arrive as one row per agent pair. Rows belonging to the same
//! scene are gathered into a [`SceneBatch`], either by scanning contiguous
//! runs of a composite time key or by exact matching of frame identifiers.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::{Error, Result};

/// Rows of the prediction stream that form one scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneBatch<K> {
    /// Identifying key of the scene.
    pub key: K,
    /// Indices into the prediction stream, in stream order.
    pub indices: Vec<usize>,
}

/// Scene identity carried by a composite `a:b:c:d...` time key.
///
/// Fields 0 and 3 jointly identify a scene. Field 0 is the time used to look
/// up ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneKey {
    pub time: String,
    pub segment: String,
}

impl SceneKey {
    /// Parse the scene identity out of a composite time key.
    pub fn parse(key: &str) -> Result<Self> {
        let mut fields = key.split(':');
        let time = fields.next();
        let segment = fields.nth(2);
        match (time, segment) {
            (Some(time), Some(segment)) => Ok(Self {
                time: time.to_string(),
                segment: segment.to_string(),
            }),
            _ => Err(Error::InvalidTimeKey(key.to_string())),
        }
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.time, self.segment)
    }
}

/// How the contiguous-run segmenter treats keys that are not grouped
/// contiguously in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    /// Maximal contiguous runs. A key reappearing after its run ended opens
    /// a new scene (logged as a warning).
    #[default]
    Contiguous,
    /// Maximal contiguous runs, but a key reappearing after its run ended is
    /// an [`Error::UnorderedTimeKeys`].
    Strict,
    /// Group all rows by key regardless of contiguity. Scenes are ordered by
    /// first appearance.
    Grouped,
}

/// Segment a stream of composite time keys into scenes.
///
/// In the run-based modes the caller must supply rows already grouped
/// contiguously by scene; the segmenter does not sort.
pub fn segment_time_keys<S: AsRef<str>>(
    keys: &[S],
    mode: SegmentationMode,
) -> Result<Vec<SceneBatch<SceneKey>>> {
    let parsed = keys
        .iter()
        .map(|k| SceneKey::parse(k.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    match mode {
        SegmentationMode::Grouped => Ok(group_by_first_appearance(parsed)),
        SegmentationMode::Contiguous | SegmentationMode::Strict => {
            contiguous_runs(parsed, mode == SegmentationMode::Strict)
        }
    }
}

fn contiguous_runs(keys: Vec<SceneKey>, strict: bool) -> Result<Vec<SceneBatch<SceneKey>>> {
    let mut scenes: Vec<SceneBatch<SceneKey>> = Vec::new();
    let mut closed: HashSet<SceneKey> = HashSet::new();

    for (index, key) in keys.into_iter().enumerate() {
        if let Some(current) = scenes.last_mut() {
            if current.key == key {
                current.indices.push(index);
                continue;
            }
            closed.insert(current.key.clone());
        }

        if closed.contains(&key) {
            if strict {
                return Err(Error::UnorderedTimeKeys {
                    index,
                    key: key.to_string(),
                });
            }
            log::warn!("scene {} reappears at row {}; it will be split", key, index);
        }

        scenes.push(SceneBatch {
            key,
            indices: vec![index],
        });
    }

    Ok(scenes)
}

fn group_by_first_appearance(keys: Vec<SceneKey>) -> Vec<SceneBatch<SceneKey>> {
    let mut scenes: Vec<SceneBatch<SceneKey>> = Vec::new();
    let mut position: HashMap<SceneKey, usize> = HashMap::new();

    for (index, key) in keys.into_iter().enumerate() {
        match position.get(&key) {
            Some(&slot) => scenes[slot].indices.push(index),
            None => {
                position.insert(key.clone(), scenes.len());
                scenes.push(SceneBatch {
                    key,
                    indices: vec![index],
                });
            }
        }
    }

    scenes
}

/// Frame identifier of a scene: one frame, or a fixed window of frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameKey {
    Single(i64),
    Multi(Vec<i64>),
}

impl FrameKey {
    /// Frames covered by this key.
    pub fn frames(&self) -> &[i64] {
        match self {
            FrameKey::Single(frame) => std::slice::from_ref(frame),
            FrameKey::Multi(frames) => frames,
        }
    }
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKey::Single(frame) => write!(f, "{}", frame),
            FrameKey::Multi(frames) => write!(f, "{:?}", frames),
        }
    }
}

/// Segment a stream by exact frame identifier.
///
/// Every distinct identifier (compared by value) becomes one scene holding
/// all rows equal to it, contiguous or not. Scenes come out in ascending
/// identifier order.
pub fn segment_frames<K: Ord + Clone>(ids: &[K]) -> Vec<SceneBatch<K>> {
    let mut scenes: BTreeMap<&K, Vec<usize>> = BTreeMap::new();
    for (index, id) in ids.iter().enumerate() {
        scenes.entry(id).or_default().push(index);
    }
    scenes
        .into_iter()
        .map(|(key, indices)| SceneBatch {
            key: key.clone(),
            indices,
        })
        .collect()
}

/// Which agents are present in which frame.
#[derive(Debug, Clone)]
pub struct FrameRoster<A> {
    frames: HashMap<i64, HashSet<A>>,
}

impl<A: AgentId> Default for FrameRoster<A> {
    fn default() -> Self {
        Self {
            frames: HashMap::new(),
        }
    }
}

impl<A: AgentId> FrameRoster<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from `(frame, agent)` observations.
    pub fn from_observations<I: IntoIterator<Item = (i64, A)>>(observations: I) -> Self {
        let mut roster = Self::new();
        for (frame, agent) in observations {
            roster.insert(frame, agent);
        }
        roster
    }

    pub fn insert(&mut self, frame: i64, agent: A) {
        self.frames.entry(frame).or_default().insert(agent);
    }

    /// Agents present in a single frame.
    pub fn agents(&self, frame: i64) -> Option<&HashSet<A>> {
        self.frames.get(&frame)
    }

    /// Number of agents taking part in a scene.
    ///
    /// For a window of frames this counts the agents present in every frame
    /// of the window.
    pub fn agent_count(&self, key: &FrameKey) -> Result<usize> {
        let mut sets = key.frames().iter().map(|&frame| {
            self.frames
                .get(&frame)
                .ok_or_else(|| Error::MissingFrame(frame.to_string()))
        });

        let first = match sets.next() {
            Some(set) => set?,
            None => return Err(Error::MissingFrame(key.to_string())),
        };
        let mut common: HashSet<&A> = first.iter().collect();
        for set in sets {
            let set = set?;
            common.retain(|agent| set.contains(*agent));
        }
        Ok(common.len())
    }
}
