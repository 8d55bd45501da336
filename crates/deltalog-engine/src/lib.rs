#![deny(missing_docs)]
#![doc = "Memoized grounding/solving over an external engine boundary, plus the Monte Carlo and exhaustive-enumeration schedulers with their frequency reports."]

pub mod frequency;
pub mod program;
pub mod repeat;
pub mod smart;
pub mod solver;

pub use frequency::{ModelOutcome, SetsOfStableModelsFrequency, StableModelsFrequency};
pub use program::{Program, SolveResult};
pub use repeat::Repeat;
pub use smart::SmartRepeat;
pub use solver::{EngineOutcome, GroundedProgram, GroundingEngine, ScriptedEngine};
