pub mod data;
pub mod dense;
mod error;
mod grad;
pub mod init;
pub mod kernel;
pub mod loss;
pub mod model;
pub mod sparse;

pub use data::{DataMatrix, SparseRow};
pub use dense::DenseBuffer;
pub use error::{MlError, Result};
pub use grad::SparseGrad;
pub use init::{BlockGen, ChainedParamGen, InitSpec, ParamGen, ParamInit};
pub use loss::{FfmLoss, FmLoss, LogitLoss, Loss, LossFn};
pub use model::{Model, ModelKind, ModelSpec, layout::ParameterLayout};
pub use sparse::SparseVector;
