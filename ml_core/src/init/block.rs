use std::{cell::RefCell, rc::Rc};

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, Uniform};

use super::{ParamGen, ParamInit};
use crate::{MlError, Result};

/// The seeded rng every random block of one model draws from, in buffer order.
pub type SharedRng = Rc<RefCell<StdRng>>;

enum Fill {
    Const(f32),
    Uniform(Uniform<f32>, SharedRng),
    Normal(Normal<f32>, SharedRng),
}

/// Fills one block of the parameter buffer (`w` or the latent block) following a
/// single `ParamInit` rule, yielding exactly `len` values in total.
pub struct BlockGen {
    fill: Fill,
    remaining: usize,
}

impl BlockGen {
    /// # Errors
    /// `MlError::InvalidDistribution` if a uniform range is empty or not finite, or a
    /// normal `std_dev` is negative or not finite.
    pub fn new(rule: ParamInit, rng: &SharedRng, len: usize) -> Result<Self> {
        let fill = match rule {
            ParamInit::Const { value } => Fill::Const(value),
            ParamInit::Uniform { low, high } => {
                let uniform = Uniform::new(low, high).map_err(invalid)?;
                Fill::Uniform(uniform, Rc::clone(rng))
            }
            ParamInit::Normal { mean, std_dev } => {
                if !(std_dev.is_finite() && std_dev >= 0.) {
                    return Err(MlError::InvalidDistribution(format!(
                        "normal std_dev must be finite and non-negative, got {std_dev}"
                    )));
                }

                let normal = Normal::new(mean, std_dev).map_err(invalid)?;
                Fill::Normal(normal, Rc::clone(rng))
            }
        };

        Ok(Self {
            fill,
            remaining: len,
        })
    }

    /// A block of `len` copies of `value`.
    pub fn constant(value: f32, len: usize) -> Self {
        Self {
            fill: Fill::Const(value),
            remaining: len,
        }
    }
}

fn invalid(e: impl ToString) -> MlError {
    MlError::InvalidDistribution(e.to_string())
}

fn draw<D: Distribution<f32>>(distribution: &D, rng: &SharedRng, n: usize) -> Vec<f32> {
    let mut rng = rng.borrow_mut();
    (0..n).map(|_| distribution.sample(&mut *rng)).collect()
}

impl ParamGen for BlockGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        if self.remaining == 0 {
            return None;
        }

        let n = n.min(self.remaining);
        self.remaining -= n;

        let values = match &self.fill {
            Fill::Const(value) => vec![*value; n],
            Fill::Uniform(uniform, rng) => draw(uniform, rng, n),
            Fill::Normal(normal, rng) => draw(normal, rng, n),
        };
        Some(values)
    }
}
