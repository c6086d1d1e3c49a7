use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MlError, Result};

/// The model family a parameter buffer is laid out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Logistic regression: first-order weights only.
    Lr,
    /// Factorization machine: one latent vector per feature.
    Fm,
    /// Field-aware factorization machine: one latent vector per (feature, field).
    Ffm,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Lr => "LR",
            ModelKind::Fm => "FM",
            ModelKind::Ffm => "FFM",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model selection plus the scalars that fix its parameter layout.
///
/// `k` is ignored by LR and `field_num` by LR and FM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub feature_num: usize,
    #[serde(default)]
    pub k: usize,
    #[serde(default)]
    pub field_num: usize,
}

impl ModelSpec {
    pub fn lr(feature_num: usize) -> Self {
        Self {
            kind: ModelKind::Lr,
            feature_num,
            k: 0,
            field_num: 0,
        }
    }

    pub fn fm(feature_num: usize, k: usize) -> Self {
        Self {
            kind: ModelKind::Fm,
            feature_num,
            k,
            field_num: 0,
        }
    }

    pub fn ffm(feature_num: usize, k: usize, field_num: usize) -> Self {
        Self {
            kind: ModelKind::Ffm,
            feature_num,
            k,
            field_num,
        }
    }

    /// Checks the dimensions required by the model kind.
    ///
    /// # Errors
    /// - `MlError::InvalidDimension` if `feature_num`, or the `k`/`field_num` the kind
    ///   uses, is zero.
    /// - `MlError::Allocation` if the parameter count does not fit in `usize`.
    pub fn validate(&self) -> Result<()> {
        let invalid = |what, got| MlError::InvalidDimension {
            kind: self.kind,
            what,
            got,
        };

        if self.feature_num == 0 {
            return Err(invalid("feature_num", self.feature_num));
        }

        if self.kind != ModelKind::Lr && self.k == 0 {
            return Err(invalid("k", self.k));
        }

        if self.kind == ModelKind::Ffm && self.field_num == 0 {
            return Err(invalid("field_num", self.field_num));
        }

        self.checked_num_params()
            .map(|_| ())
            .ok_or(MlError::Allocation { params: usize::MAX })
    }

    /// The latent dimension the kind actually uses (0 for LR).
    #[inline]
    pub fn latent_dim(&self) -> usize {
        match self.kind {
            ModelKind::Lr => 0,
            ModelKind::Fm | ModelKind::Ffm => self.k,
        }
    }

    /// The field count the kind actually uses (0 unless FFM).
    #[inline]
    pub fn fields(&self) -> usize {
        match self.kind {
            ModelKind::Ffm => self.field_num,
            ModelKind::Lr | ModelKind::Fm => 0,
        }
    }

    /// Total number of parameters in the flat buffer for this model:
    /// - LR: `feature_num`
    /// - FM: `feature_num * (1 + k)`
    /// - FFM: `feature_num * (1 + k * field_num)`
    ///
    /// # Panics
    /// If the count overflows, which `validate` reports beforehand.
    pub fn num_params(&self) -> usize {
        self.checked_num_params()
            .unwrap_or_else(|| panic!("parameter count overflows for {self:?}"))
    }

    fn checked_num_params(&self) -> Option<usize> {
        let per_feature = match self.kind {
            ModelKind::Lr => 1,
            ModelKind::Fm => self.k.checked_add(1)?,
            ModelKind::Ffm => self.k.checked_mul(self.field_num)?.checked_add(1)?,
        };

        self.feature_num.checked_mul(per_feature)
    }
}
