use crate::{ModelKind, ModelSpec, SparseVector};

/// Gradient accumulator mirroring a model's shape.
///
/// Keys are absolute positions in the model's flat parameter buffer, so the
/// first-order part holds keys in `0..feature_num` and the latent part keys past it.
/// Created fresh for every gradient computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseGrad {
    w: SparseVector<usize, f32>,
    v: Option<SparseVector<usize, f32>>,
}

impl SparseGrad {
    /// An empty gradient with a latent part only if the model has one.
    pub fn for_spec(spec: &ModelSpec) -> Self {
        let v = match spec.kind {
            ModelKind::Lr => None,
            ModelKind::Fm | ModelKind::Ffm => Some(SparseVector::new()),
        };

        Self {
            w: SparseVector::new(),
            v,
        }
    }

    #[inline]
    pub fn w(&self) -> &SparseVector<usize, f32> {
        &self.w
    }

    #[inline]
    pub fn v(&self) -> Option<&SparseVector<usize, f32>> {
        self.v.as_ref()
    }

    /// Total number of stored (non-zero) gradient entries.
    pub fn nnz(&self) -> usize {
        self.w.len() + self.v.as_ref().map_or(0, SparseVector::len)
    }

    /// `w[position] += delta`
    #[inline]
    pub fn accumulate_w(&mut self, position: usize, delta: f32) {
        self.w.accumulate(position, delta);
    }

    /// `v[position] += delta`
    ///
    /// # Panics
    /// If this gradient has no latent part.
    #[inline]
    pub fn accumulate_v(&mut self, position: usize, delta: f32) {
        let Some(v) = self.v.as_mut() else {
            panic!("gradient has no latent part");
        };

        v.accumulate(position, delta);
    }

    /// `dense[pos] += grad[pos]` for every stored entry.
    ///
    /// # Panics
    /// If a stored position is out of range for `dense`.
    pub fn scatter_into(&self, dense: &mut [f32]) {
        let latent = self.v.iter().flat_map(|v| v.iter());

        for (position, value) in self.w.iter().chain(latent) {
            dense[position] += value;
        }
    }

    /// A dense copy of the gradient, `len` values long.
    pub fn to_dense(&self, len: usize) -> Vec<f32> {
        let mut dense = vec![0.; len];
        self.scatter_into(&mut dense);
        dense
    }
}
