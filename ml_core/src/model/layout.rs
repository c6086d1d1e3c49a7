use std::ops::Range;

use super::spec::{ModelKind, ModelSpec};

/// Maps the flat parameter buffer into the first-order block and the latent blocks.
///
/// Layout: `[ w_0 .. w_{F-1} | latent ]`, where the latent region holds one block of
/// `k` values per feature (FM) or per (feature, field) pair (FFM), feature-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLayout {
    pub w: Range<usize>,
    pub latent: Range<usize>,
    kind: ModelKind,
    k: usize,
    field_num: usize,
}

impl ParameterLayout {
    pub fn new(spec: &ModelSpec) -> Self {
        let w = 0..spec.feature_num;
        let latent = w.end..spec.num_params();

        Self {
            w,
            latent,
            kind: spec.kind,
            k: spec.latent_dim(),
            field_num: spec.fields(),
        }
    }

    #[inline]
    pub fn feature_num(&self) -> usize {
        self.w.end
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn field_num(&self) -> usize {
        self.field_num
    }

    /// Offsets of the FM latent vector of `feature`:
    /// `base = w.end + k * feature`.
    ///
    /// # Panics
    /// If the layout is not FM or `feature` is out of range.
    #[inline]
    pub fn v_fm(&self, feature: usize) -> Range<usize> {
        assert_eq!(self.kind, ModelKind::Fm, "v_fm on a {} layout", self.kind);
        assert!(
            feature < self.feature_num(),
            "feature {feature} out of range (feature_num = {})",
            self.feature_num()
        );

        let start = self.w.end + self.k * feature;
        start..start + self.k
    }

    /// Offsets of the FFM latent vector of `feature` towards `field`:
    /// `base = w.end + k * field_num * feature + k * field`.
    ///
    /// # Panics
    /// If the layout is not FFM, or `feature` or `field` are out of range.
    #[inline]
    pub fn v_ffm(&self, feature: usize, field: usize) -> Range<usize> {
        assert_eq!(self.kind, ModelKind::Ffm, "v_ffm on a {} layout", self.kind);
        assert!(
            feature < self.feature_num(),
            "feature {feature} out of range (feature_num = {})",
            self.feature_num()
        );
        assert!(
            field < self.field_num,
            "field {field} out of range (field_num = {})",
            self.field_num
        );

        let start = self.w.end + self.k * self.field_num * feature + self.k * field;
        start..start + self.k
    }

    /// Sanity check: ranges must be in-bounds and non-overlapping for a given buffer size.
    pub fn validate(&self, total_params: usize) {
        assert!(!self.w.is_empty(), "w range must be non-empty");
        assert_eq!(self.w.start, 0, "w must start the buffer");
        assert_eq!(self.w.end, self.latent.start, "latent must follow w");
        assert_eq!(self.latent.end, total_params, "layout must cover the buffer");

        let per_feature = self.k * self.field_num.max(1);
        match self.kind {
            ModelKind::Lr => assert!(self.latent.is_empty(), "LR has no latent block"),
            ModelKind::Fm | ModelKind::Ffm => assert_eq!(
                self.latent.len(),
                self.feature_num() * per_feature,
                "latent block size"
            ),
        }
    }
}
