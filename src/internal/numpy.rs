//! NumPy-like array operations.

use nalgebra::DMatrix;

/// Select `rows` of `matrix` and flatten them in row-major order
/// (`matrix[rows].flatten()`).
///
/// Panics if a row index is out of bounds.
pub fn take_rows_flat(matrix: &DMatrix<f64>, rows: &[usize]) -> Vec<f64> {
    let ncols = matrix.ncols();
    let mut data = Vec::with_capacity(rows.len() * ncols);
    for &row in rows {
        data.extend((0..ncols).map(|col| matrix[(row, col)]));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_rows_flat_row_major() {
        let matrix = DMatrix::from_row_slice(3, 2, &[
            1.0, 2.0,
            3.0, 4.0,
            5.0, 6.0,
        ]);
        assert_eq!(take_rows_flat(&matrix, &[2, 0]), vec![5.0, 6.0, 1.0, 2.0]);
    }

    #[test]
    fn test_take_rows_flat_empty() {
        let matrix = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert!(take_rows_flat(&matrix, &[]).is_empty());
    }
}
