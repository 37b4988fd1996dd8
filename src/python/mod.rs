//! Python bindings for groupeval-rs using PyO3.
//!
//! The functions keep the call shapes of the Python evaluation helpers they
//! replace, so an existing training loop can switch to them directly.

use pyo3::prelude::*;

mod functions;

pub use functions::PyAgent;

/// Python module for groupeval-rs.
///
/// The function is named `_groupeval_rs` with underscore prefix for mixed Python/Rust projects.
#[pymodule]
fn _groupeval_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(functions::group_correctness, m)?)?;
    m.add_function(wrap_pyfunction!(functions::merge_groups, m)?)?;
    m.add_function(wrap_pyfunction!(functions::calculate_f1, m)?)?;
    m.add_function(wrap_pyfunction!(functions::read_groups, m)?)?;
    m.add_function(wrap_pyfunction!(functions::read_multi_groups, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
