//! Stochastic primal-dual hybrid gradient (SPDHG) solver
//!
//! <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
//! <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
//!
//! Solves composite problems
//! \\[
//! \min_x \sum_i f_i(A_i x) + g(x)
//! \\]
//! with smooth \\(f_i\\) and strongly convex \\(g\\),
//! by deterministic PDHG, uniformly sampled SPDHG, or the Pesquet-Repetti stochastic primal-dual method.
//!
//! The usual flow is
//! 1. build a [`Problem`] from a [`BlockOp`], a [`SeparableSum`] and a regularizer,
//! 2. estimate subset operator norms with [`BlockOp::subset_norms`] (or through a [`NormCache`]),
//! 3. [`calibrate`] an [`AlgorithmConfig`] for an [`Algorithm`] variant,
//! 4. run [`solver::Solver::solve`] with a seeded [`Sampler`] and [`solver::Observer`]s.

pub mod solver;

//

mod linalg_ex;
mod floatgeneric;
mod matop;
mod matbuild;

pub use linalg_ex::*;
pub use floatgeneric::*;
pub use matop::*;
pub use matbuild::*;

//

mod blockop;
mod norm_cache;
mod partition;

pub use blockop::*;
pub use norm_cache::*;
pub use partition::*;

//

mod fn_sqnorm;
mod fn_klsmooth;
mod fn_tvnonneg;
mod fn_sepsum;

pub use fn_sqnorm::*;
pub use fn_klsmooth::*;
pub use fn_tvnonneg::*;
pub use fn_sepsum::*;

//

mod problem;
mod calibrate;

pub use problem::*;
pub use calibrate::*;
