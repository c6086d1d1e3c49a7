//! Parameter initialization.
mod block;
mod chained;
mod spec;

pub use block::{BlockGen, SharedRng};
pub use chained::ChainedParamGen;
pub use spec::{InitSpec, ParamInit};

/// A source of initial parameter values, consumed front to back while a model's
/// buffer is filled.
pub trait ParamGen {
    /// Returns the next values, at most `n` of them, or `None` once nothing is left.
    fn sample(&mut self, n: usize) -> Option<Vec<f32>>;
}
