//! Solver traits and the primal-dual driver

mod slicelike;
mod linalg;
mod operator;
mod convex_fn;
mod observer;
mod solver_error;
mod solver;

pub use slicelike::*;
pub use linalg::*;
pub use operator::*;
pub use convex_fn::*;
pub use observer::*;
pub use solver_error::*;
pub use solver::*;
