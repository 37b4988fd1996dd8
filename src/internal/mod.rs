//! Internal helpers mirroring array operations of the Python evaluation code.

pub mod numpy;
