#![deny(missing_docs)]
#![doc = "Core types for the deltalog probabilistic stable-model engine: ground symbols, stable-model containers, exact probabilities, deterministic randomness, and structured errors."]

pub mod errors;
pub mod model;
pub mod probability;
pub mod rng;
pub mod symbol;

pub use errors::{DeltalogError, ErrorInfo};
pub use model::{Model, ModelList};
pub use probability::Probability;
pub use rng::RngHandle;
pub use symbol::Symbol;
