//! Sparse-matrix times dense-vector kernels, the prediction primitive for LR and the
//! first-order term of FM/FFM.
use crate::DataMatrix;

/// Returns `Σ values[i] * dense[positions[i]]`.
///
/// # Panics
/// If `values` and `positions` differ in length, or a position is out of range for `dense`.
#[inline]
pub fn sparse_vector_dense_vector_times(values: &[f32], positions: &[u32], dense: &[f32]) -> f32 {
    assert_eq!(
        values.len(),
        positions.len(),
        "values and positions must have same length"
    );

    values
        .iter()
        .zip(positions)
        .map(|(&x, &j)| x * dense[j as usize])
        .sum()
}

/// `out[i] <- row_i · dense` for every row of `matrix`.
///
/// # Panics
/// If `out` is not exactly one value per row, or a position is out of range for `dense`.
pub fn sparse_matrix_dense_vector_times(matrix: &DataMatrix, dense: &[f32], out: &mut [f32]) {
    assert_eq!(
        out.len(),
        matrix.len(),
        "output must hold one value per row"
    );

    for (o, row) in out.iter_mut().zip(matrix) {
        *o = sparse_vector_dense_vector_times(row.values(), row.positions(), dense);
    }
}
