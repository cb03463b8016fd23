//! Advisory evaluators
//!
//! Every evaluator is a pure function of its inputs and the evaluation
//! instant; none of them fail.

mod alerts;
mod disease;
mod irrigation;
mod recommendations;

pub use alerts::*;
pub use disease::*;
pub use irrigation::*;
pub use recommendations::*;
