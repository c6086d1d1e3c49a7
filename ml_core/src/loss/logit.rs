use log::debug;

use super::{Loss, check_input};
use crate::{
    DataMatrix, Model, ModelKind, Result, SparseGrad, SparseRow,
    kernel::{sparse_matrix_dense_vector_times, sparse_vector_dense_vector_times},
};

/// Logistic regression: `pred = x · w`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogitLoss;

impl Loss for LogitLoss {
    fn kind(&self) -> ModelKind {
        ModelKind::Lr
    }

    fn predict_row(&self, row: &SparseRow, model: &Model) -> f32 {
        sparse_vector_dense_vector_times(row.values(), row.positions(), model.get_w())
    }

    fn accumulate_row(&self, row: &SparseRow, _model: &Model, p: f32, grad: &mut SparseGrad) {
        for (j, x) in row.iter() {
            grad.accumulate_w(j as usize, x * p);
        }
    }

    fn predict(&self, matrix: &DataMatrix, model: &Model) -> Result<Vec<f32>> {
        check_input(self.kind(), matrix, model)?;

        let mut pred = vec![0.; matrix.len()];
        sparse_matrix_dense_vector_times(matrix, model.get_w(), &mut pred);

        debug!(kind = self.kind().as_str(), rows = matrix.len(); "predicted batch");
        Ok(pred)
    }
}
