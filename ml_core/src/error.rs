use std::fmt;

use crate::model::ModelKind;

/// The result type used across the numeric core.
pub type Result<T> = std::result::Result<T, MlError>;

/// Errors reported at the boundary between the numeric core and the trainer loop.
///
/// Internal algebra keeps panicking on violated preconditions, these variants only
/// describe inputs that the surrounding code hands over and can reasonably reject.
#[derive(Debug, Clone, PartialEq)]
pub enum MlError {
    /// A model dimension is invalid for the requested model kind.
    InvalidDimension {
        kind: ModelKind,
        what: &'static str,
        got: usize,
    },

    /// A shape invariant was violated (e.g. mismatched lengths).
    ShapeMismatch {
        /// Human-readable context for the mismatch (e.g. "params", "batch").
        what: &'static str,
        /// Observed value.
        got: usize,
        /// Expected value.
        expected: usize,
    },

    /// The parameter buffer could not be allocated.
    Allocation { params: usize },

    /// A loss was asked to work on a model of a different family.
    ModelMismatch { loss: ModelKind, model: ModelKind },

    /// A row references a feature outside of the model.
    FeatureOutOfRange {
        row: usize,
        position: u32,
        feature_num: usize,
    },

    /// A row references a field outside of the model.
    FieldOutOfRange {
        row: usize,
        field: u32,
        field_num: usize,
    },

    /// A row handed to a field-aware loss carries no field ids.
    MissingFields { row: usize },

    /// An initialization distribution could not be built.
    InvalidDistribution(String),
}

impl fmt::Display for MlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlError::InvalidDimension { kind, what, got } => {
                write!(f, "invalid {what} for {kind} model: got {got}")
            }
            MlError::ShapeMismatch { what, got, expected } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
            MlError::Allocation { params } => {
                write!(f, "cannot allocate a parameter buffer of {params} values")
            }
            MlError::ModelMismatch { loss, model } => {
                write!(f, "{loss} loss cannot evaluate a {model} model")
            }
            MlError::FeatureOutOfRange {
                row,
                position,
                feature_num,
            } => write!(
                f,
                "row {row} references feature {position}, the model has {feature_num} features"
            ),
            MlError::FieldOutOfRange {
                row,
                field,
                field_num,
            } => write!(
                f,
                "row {row} references field {field}, the model has {field_num} fields"
            ),
            MlError::MissingFields { row } => write!(f, "row {row} has no field ids"),
            MlError::InvalidDistribution(msg) => write!(f, "invalid distribution: {msg}"),
        }
    }
}

impl std::error::Error for MlError {}
