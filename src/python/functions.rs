//! Python wrappers for matching, merging and aggregation.

use nalgebra::Vector2;
use numpy::PyReadonlyArray2;
use pyo3::exceptions::{PyIOError, PyValueError, PyZeroDivisionError};
use pyo3::prelude::*;

use crate::metrics::GroupsFile;
use crate::{Error, Group};

/// Agent identifier coming from Python: an int or a str.
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromPyObject)]
pub enum PyAgent {
    Int(i64),
    Str(String),
}

impl IntoPy<PyObject> for PyAgent {
    fn into_py(self, py: Python<'_>) -> PyObject {
        match self {
            PyAgent::Int(id) => id.into_py(py),
            PyAgent::Str(id) => id.into_py(py),
        }
    }
}

fn to_py_err(err: Error) -> PyErr {
    match &err {
        Error::DivisionByZero { .. } => PyZeroDivisionError::new_err(err.to_string()),
        Error::IoError(_) => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn to_groups(raw: Vec<Vec<PyAgent>>) -> Vec<Group<PyAgent>> {
    raw.into_iter().map(Group::new).collect()
}

/// Count correctly detected groups.
///
/// Args:
///     guesses: Predicted groups (lists of agent ids).
///     truth: Ground-truth groups.
///     threshold: Overlap threshold T.
///     non_reusable: Consume a predicted group once it matched.
///
/// Returns:
///     (TP, FN, FP, precision, recall). The caller's `guesses` list is not
///     modified.
#[pyfunction]
#[pyo3(signature = (guesses, truth, threshold, non_reusable=false))]
pub fn group_correctness(
    guesses: Vec<Vec<PyAgent>>,
    truth: Vec<Vec<PyAgent>>,
    threshold: f64,
    non_reusable: bool,
) -> PyResult<(i64, i64, i64, f64, f64)> {
    let mut guesses = to_groups(guesses);
    let truth = to_groups(truth);
    let r = crate::matching::evaluate_groups(&mut guesses, &truth, threshold, non_reusable)
        .map_err(to_py_err)?;
    Ok((
        r.true_positives,
        r.false_negatives,
        r.false_positives,
        r.precision,
        r.recall,
    ))
}

/// Merge groups that share agents so that every agent is in one group.
#[pyfunction]
pub fn merge_groups(groups: Vec<Vec<PyAgent>>) -> Vec<Vec<PyAgent>> {
    crate::merge::merge_groups(to_groups(groups))
        .into_iter()
        .map(Group::into_members)
        .collect()
}

/// Average per-threshold (precision, recall) sums and compute F1.
///
/// Args:
///     avg_results: Array of shape (n_thresholds, 2) holding the sums.
///     num_times: Number of scenes the sums cover.
///
/// Returns:
///     List of (F1, precision, recall) tuples.
#[pyfunction]
pub fn calculate_f1(
    avg_results: PyReadonlyArray2<f64>,
    num_times: usize,
) -> PyResult<Vec<(f64, f64, f64)>> {
    let sums = avg_results.as_array();
    if sums.ncols() != 2 {
        return Err(PyValueError::new_err(format!(
            "avg_results must have shape (n, 2), got (n, {})",
            sums.ncols()
        )));
    }

    let sums: Vec<Vector2<f64>> = sums
        .rows()
        .into_iter()
        .map(|row| Vector2::new(row[0], row[1]))
        .collect();

    let scores = crate::metrics::calculate_f1(&sums, num_times).map_err(to_py_err)?;
    Ok(scores
        .into_iter()
        .map(|s| (s.f1, s.precision, s.recall))
        .collect())
}

/// Read a single-scene groups.txt, merging groups with common agents.
#[pyfunction]
pub fn read_groups(path: &str) -> PyResult<Vec<Vec<i64>>> {
    let groups = GroupsFile::read_single(path).map_err(to_py_err)?;
    Ok(groups.into_iter().map(Group::into_members).collect())
}

/// Read a multi-scene groups.txt (scenes separated by `-` lines).
#[pyfunction]
pub fn read_multi_groups(path: &str) -> PyResult<Vec<Vec<Vec<i64>>>> {
    let scenes = GroupsFile::read_multi(path).map_err(to_py_err)?;
    Ok(scenes
        .into_iter()
        .map(|scene| scene.into_iter().map(Group::into_members).collect())
        .collect())
}
