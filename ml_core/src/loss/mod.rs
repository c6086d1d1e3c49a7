//! The loss contract shared by every model family: predict, compute the gradient
//! and reduce predictions to a scalar log-loss.
mod ffm;
mod fm;
mod logit;

use log::debug;

use crate::{
    DataMatrix, MlError, Model, ModelKind, ModelSpec, Result, SparseGrad, SparseRow,
    data::normalized_label,
};
pub use ffm::FfmLoss;
pub use fm::FmLoss;
pub use logit::LogitLoss;

/// Abstraction over the per-family computations driven by a training pass.
///
/// Implementors provide the per-row kernels, which assume their input has already been
/// checked and panic otherwise. The provided methods check the whole batch against the
/// model first and report bad input as an `MlError`.
pub trait Loss {
    /// The model family this loss works on.
    fn kind(&self) -> ModelKind;

    /// The raw score of a single row.
    fn predict_row(&self, row: &SparseRow, model: &Model) -> f32;

    /// `grad += ∂pred/∂params * p` for a single row.
    fn accumulate_row(&self, row: &SparseRow, model: &Model, p: f32, grad: &mut SparseGrad);

    /// Returns one raw score per row of `matrix`.
    ///
    /// # Errors
    /// See `check_input`.
    fn predict(&self, matrix: &DataMatrix, model: &Model) -> Result<Vec<f32>> {
        check_input(self.kind(), matrix, model)?;

        let pred = matrix
            .iter()
            .map(|row| self.predict_row(row, model))
            .collect();

        debug!(kind = self.kind().as_str(), rows = matrix.len(); "predicted batch");
        Ok(pred)
    }

    /// Accumulates the logistic-loss gradient of every row of `matrix`.
    ///
    /// # Errors
    /// See `check_input`.
    fn calc_grad(&self, matrix: &DataMatrix, model: &Model) -> Result<SparseGrad> {
        check_input(self.kind(), matrix, model)?;

        let mut grad = SparseGrad::for_spec(&model.spec());

        for row in matrix {
            let pred = self.predict_row(row, model);
            let p = partial_grad(row.label(), pred);
            self.accumulate_row(row, model, p, &mut grad);
        }

        debug!(
            kind = self.kind().as_str(),
            rows = matrix.len(),
            nnz = grad.nnz();
            "computed gradient"
        );
        Ok(grad)
    }

    /// `Σ log(1 + exp(-y * pred))` with labels normalized to `{-1, +1}`.
    ///
    /// # Panics
    /// If `pred` and `labels` differ in length.
    fn evaluate(&self, pred: &[f32], labels: &[f32]) -> f32 {
        log_loss(pred, labels)
    }
}

/// Checks that `matrix` can be fed to a `kind` loss over `model`.
///
/// # Errors
/// - `MlError::ModelMismatch` if `model` is not of family `kind`.
/// - `MlError::FeatureOutOfRange` if a position is not below `feature_num`.
/// - `MlError::MissingFields` if an FFM row has no field ids.
/// - `MlError::FieldOutOfRange` if a field id is not below `field_num`.
pub fn check_input(kind: ModelKind, matrix: &DataMatrix, model: &Model) -> Result<()> {
    let spec = model.spec();

    if spec.kind != kind {
        return Err(MlError::ModelMismatch {
            loss: kind,
            model: spec.kind,
        });
    }

    for (i, row) in matrix.iter().enumerate() {
        check_row(i, row, &spec)?;
    }

    Ok(())
}

fn check_row(i: usize, row: &SparseRow, spec: &ModelSpec) -> Result<()> {
    if let Some(&position) = row
        .positions()
        .iter()
        .find(|&&j| j as usize >= spec.feature_num)
    {
        return Err(MlError::FeatureOutOfRange {
            row: i,
            position,
            feature_num: spec.feature_num,
        });
    }

    if spec.kind != ModelKind::Ffm {
        return Ok(());
    }

    let fields = row.fields().ok_or(MlError::MissingFields { row: i })?;

    match fields.iter().find(|&&f| f as usize >= spec.field_num) {
        Some(&field) => Err(MlError::FieldOutOfRange {
            row: i,
            field,
            field_num: spec.field_num,
        }),
        None => Ok(()),
    }
}

/// The derivative of the logistic loss with respect to the raw score:
/// `-y / (1 + exp(y * pred))`.
#[inline]
pub fn partial_grad(label: f32, pred: f32) -> f32 {
    let y = normalized_label(label);
    -y / (1. + (y * pred).exp())
}

/// `Σ log(1 + exp(-y * pred))`, computed without overflowing for large margins.
///
/// # Panics
/// If `pred` and `labels` differ in length.
pub fn log_loss(pred: &[f32], labels: &[f32]) -> f32 {
    assert_eq!(
        pred.len(),
        labels.len(),
        "predictions and labels must have same length"
    );

    pred.iter()
        .zip(labels)
        .map(|(&p, &y)| softplus(-normalized_label(y) * p))
        .sum()
}

#[inline]
fn softplus(z: f32) -> f32 {
    z.max(0.) + (-z.abs()).exp().ln_1p()
}

/// Runtime-selected loss, chosen once per training run from the model spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossFn {
    Logit(LogitLoss),
    Fm(FmLoss),
    Ffm(FfmLoss),
}

impl LossFn {
    pub fn for_spec(spec: &ModelSpec) -> Self {
        match spec.kind {
            ModelKind::Lr => Self::Logit(LogitLoss),
            ModelKind::Fm => Self::Fm(FmLoss),
            ModelKind::Ffm => Self::Ffm(FfmLoss),
        }
    }
}

impl Loss for LossFn {
    fn kind(&self) -> ModelKind {
        match self {
            LossFn::Logit(l) => l.kind(),
            LossFn::Fm(l) => l.kind(),
            LossFn::Ffm(l) => l.kind(),
        }
    }

    fn predict_row(&self, row: &SparseRow, model: &Model) -> f32 {
        match self {
            LossFn::Logit(l) => l.predict_row(row, model),
            LossFn::Fm(l) => l.predict_row(row, model),
            LossFn::Ffm(l) => l.predict_row(row, model),
        }
    }

    fn accumulate_row(&self, row: &SparseRow, model: &Model, p: f32, grad: &mut SparseGrad) {
        match self {
            LossFn::Logit(l) => l.accumulate_row(row, model, p, grad),
            LossFn::Fm(l) => l.accumulate_row(row, model, p, grad),
            LossFn::Ffm(l) => l.accumulate_row(row, model, p, grad),
        }
    }

    fn predict(&self, matrix: &DataMatrix, model: &Model) -> Result<Vec<f32>> {
        match self {
            LossFn::Logit(l) => l.predict(matrix, model),
            LossFn::Fm(l) => l.predict(matrix, model),
            LossFn::Ffm(l) => l.predict(matrix, model),
        }
    }
}
