use std::{cell::RefCell, rc::Rc};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{BlockGen, ChainedParamGen, ParamGen};
use crate::{ModelSpec, Result};

/// How one block of the parameter buffer is filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamInit {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    Normal { mean: f32, std_dev: f32 },
}

/// Initialization of a whole model: one rule for `w`, one for the latent block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitSpec {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "InitSpec::default_w")]
    pub w: ParamInit,
    #[serde(default = "InitSpec::default_latent")]
    pub latent: ParamInit,
}

impl InitSpec {
    fn default_w() -> ParamInit {
        ParamInit::Const { value: 0. }
    }

    fn default_latent() -> ParamInit {
        ParamInit::Normal {
            mean: 0.,
            std_dev: 0.1,
        }
    }

    /// Every parameter set to `value`.
    pub fn constant(value: f32) -> Self {
        Self {
            seed: 0,
            w: ParamInit::Const { value },
            latent: ParamInit::Const { value },
        }
    }
}

impl Default for InitSpec {
    fn default() -> Self {
        Self {
            seed: 0,
            w: Self::default_w(),
            latent: Self::default_latent(),
        }
    }
}

impl ModelSpec {
    /// Builds the generator that fills a buffer for this model: `feature_num` values
    /// following `init.w`, then the latent block following `init.latent`.
    ///
    /// # Errors
    /// `MlError::InvalidDistribution` if either rule has invalid parameters.
    pub fn init_gen(&self, init: &InitSpec) -> Result<ChainedParamGen> {
        let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(init.seed)));
        let latent = self.num_params() - self.feature_num;

        let blocks: Vec<Box<dyn ParamGen>> = vec![
            Box::new(BlockGen::new(init.w, &rng, self.feature_num)?),
            Box::new(BlockGen::new(init.latent, &rng, latent)?),
        ];
        Ok(ChainedParamGen::new(blocks))
    }
}
