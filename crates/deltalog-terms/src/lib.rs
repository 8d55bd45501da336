#![deny(missing_docs)]
#![doc = "Delta-term evaluation layer: call records and traces, the per-pass evaluation context, the named-function registry with built-in distributions, and weighted choice without replacement."]

pub mod builtins;
pub mod call;
pub mod choice;
pub mod context;

pub use builtins::{DeltaFn, DeltaRegistry};
pub use call::{DeltaCall, DeltaFunction, DeltaRequest, Trace};
pub use choice::{weighted_choice, ChoiceDraw};
pub use context::{DeltaTermsContext, ExclusionMap};
