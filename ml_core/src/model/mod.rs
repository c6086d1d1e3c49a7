pub mod layout;
pub mod spec;

use log::{debug, error, info};

use crate::{DenseBuffer, MlError, ParamGen, Result};
use layout::ParameterLayout;
pub use spec::{ModelKind, ModelSpec};

/// The flat parameter store of an LR, FM or FFM model.
///
/// Owns one contiguous buffer laid out as described by its `ParameterLayout`. Gradients
/// live in separate buffers, nothing outside the model ever aliases this storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    spec: ModelSpec,
    layout: ParameterLayout,
    params: DenseBuffer<f32>,
}

impl Model {
    /// Creates a new `Model` with every parameter set to `init`.
    ///
    /// # Arguments
    /// * `spec` - The model kind and dimensions.
    /// * `init` - The fill value.
    ///
    /// # Errors
    /// - `MlError::InvalidDimension` if `spec` does not validate.
    /// - `MlError::Allocation` if the buffer cannot be allocated.
    pub fn new(spec: ModelSpec, init: f32) -> Result<Self> {
        spec.validate()?;

        let mut params = allocate(spec.num_params())?;
        params.resize(spec.num_params(), init);
        Ok(Self::with_params(spec, params))
    }

    /// Creates a new `Model` whose buffer is filled, in order, by `param_gen`.
    ///
    /// # Errors
    /// Same as `new`, plus `MlError::ShapeMismatch` if the generator runs dry before
    /// the buffer is full.
    pub fn from_param_gen(spec: ModelSpec, param_gen: &mut dyn ParamGen) -> Result<Self> {
        spec.validate()?;

        let num_params = spec.num_params();
        let mut params = allocate(num_params)?;

        while params.len() < num_params {
            let Some(sample) = param_gen.sample(num_params - params.len()) else {
                break;
            };
            params.extend(sample);
        }

        if params.len() != num_params {
            return Err(MlError::ShapeMismatch {
                what: "initial params",
                got: params.len(),
                expected: num_params,
            });
        }

        Ok(Self::with_params(spec, params))
    }

    fn with_params(spec: ModelSpec, params: Vec<f32>) -> Self {
        let layout = ParameterLayout::new(&spec);
        layout.validate(params.len());

        info!(
            kind = spec.kind.as_str(),
            feature_num = spec.feature_num,
            k = spec.latent_dim(),
            field_num = spec.fields(),
            num_params = params.len();
            "model created"
        );

        Self {
            spec,
            layout,
            params: DenseBuffer::from(params),
        }
    }

    #[inline]
    pub fn spec(&self) -> ModelSpec {
        self.spec
    }

    #[inline]
    pub fn kind(&self) -> ModelKind {
        self.spec.kind
    }

    #[inline]
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    #[inline]
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn params(&self) -> &DenseBuffer<f32> {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut DenseBuffer<f32> {
        &mut self.params
    }

    /// The first-order weights, `feature_num` long.
    #[inline]
    pub fn get_w(&self) -> &[f32] {
        &self.params.as_slice()[self.layout.w.clone()]
    }

    #[inline]
    pub fn get_w_mut(&mut self) -> &mut [f32] {
        &mut self.params.as_mut_slice()[self.layout.w.clone()]
    }

    /// The FM latent vector of `feature`, `k` long.
    ///
    /// # Panics
    /// If the model is not FM or `feature >= feature_num`.
    #[inline]
    pub fn get_v(&self, feature: usize) -> &[f32] {
        &self.params.as_slice()[self.layout.v_fm(feature)]
    }

    /// See `get_v`.
    #[inline]
    pub fn get_v_mut(&mut self, feature: usize) -> &mut [f32] {
        let range = self.layout.v_fm(feature);
        &mut self.params.as_mut_slice()[range]
    }

    /// The FFM latent vector of `feature` towards `field`, `k` long.
    ///
    /// # Panics
    /// If the model is not FFM, `feature >= feature_num` or `field >= field_num`.
    #[inline]
    pub fn get_v_field(&self, feature: usize, field: usize) -> &[f32] {
        &self.params.as_slice()[self.layout.v_ffm(feature, field)]
    }

    /// See `get_v_field`.
    #[inline]
    pub fn get_v_field_mut(&mut self, feature: usize, field: usize) -> &mut [f32] {
        let range = self.layout.v_ffm(feature, field);
        &mut self.params.as_mut_slice()[range]
    }
}

/// Reserves room for `num_params` values, reporting failure as an error.
fn allocate(num_params: usize) -> Result<Vec<f32>> {
    let mut params = Vec::new();

    if let Err(e) = params.try_reserve_exact(num_params) {
        error!(num_params = num_params; "cannot allocate parameter buffer: {e}");
        return Err(MlError::Allocation { params: num_params });
    }

    debug!(num_params = num_params; "reserved parameter buffer");
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockGen, InitSpec};

    #[test]
    fn new_fills_every_param() {
        let model = Model::new(ModelSpec::ffm(10, 4, 3), 0.5).unwrap();

        assert_eq!(model.num_params(), 130);
        assert!(model.params().as_slice().iter().all(|&x| x == 0.5));
        assert_eq!(model.get_w().len(), 10);
        assert_eq!(model.get_v_field(9, 2).len(), 4);
    }

    #[test]
    fn new_rejects_invalid_spec() {
        let err = Model::new(ModelSpec::fm(10, 0), 0.).unwrap_err();
        assert!(matches!(err, MlError::InvalidDimension { .. }));
    }

    #[test]
    fn oversized_model_reports_allocation() {
        let err = Model::new(ModelSpec::lr(usize::MAX / 2), 0.).unwrap_err();
        assert_eq!(
            err,
            MlError::Allocation {
                params: usize::MAX / 2
            }
        );
    }

    #[test]
    fn fm_views_address_their_blocks() {
        let mut model = Model::new(ModelSpec::fm(10, 4), 0.).unwrap();

        model.get_w_mut()[3] = 1.;
        model.get_v_mut(3).copy_from_slice(&[2., 3., 4., 5.]);

        let params = model.params().as_slice();
        assert_eq!(params[3], 1.);
        assert_eq!(&params[22..26], &[2., 3., 4., 5.]);
        assert_eq!(model.get_v(3), &[2., 3., 4., 5.]);
        assert!(model.get_v(2).iter().all(|&x| x == 0.));
        assert!(model.get_v(4).iter().all(|&x| x == 0.));
    }

    #[test]
    fn ffm_views_address_their_blocks() {
        let mut model = Model::new(ModelSpec::ffm(10, 4, 3), 0.).unwrap();

        model.get_v_field_mut(2, 1).fill(7.);

        let params = model.params().as_slice();
        assert!(params[38..42].iter().all(|&x| x == 7.));
        assert_eq!(params.iter().filter(|&&x| x == 7.).count(), 4);
    }

    #[test]
    #[should_panic(expected = "v_ffm on a FM layout")]
    fn field_view_on_fm_model_panics() {
        Model::new(ModelSpec::fm(10, 4), 0.).unwrap().get_v_field(0, 0);
    }

    #[test]
    fn from_param_gen_uses_generator_order() {
        let spec = ModelSpec::fm(2, 2);
        let mut param_gen = spec.init_gen(&InitSpec::constant(1.5)).unwrap();
        let model = Model::from_param_gen(spec, &mut param_gen).unwrap();

        assert_eq!(model.params().as_slice(), &[1.5; 6]);
    }

    #[test]
    fn from_param_gen_rejects_short_generator() {
        let mut param_gen = BlockGen::constant(0., 3);
        let err = Model::from_param_gen(ModelSpec::fm(2, 2), &mut param_gen).unwrap_err();

        assert_eq!(
            err,
            MlError::ShapeMismatch {
                what: "initial params",
                got: 3,
                expected: 6
            }
        );
    }
}
