//! Benchmark harness of the stochastic primal-dual solvers
//!
//! Reproduces a comparison of deterministic PDHG, SPDHG and the Pesquet-Repetti method
//! on a synthetic emission tomography problem with a smoothed Kullback-Leibler data term
//! and a strongly convex nonnegative total variation prior.
//!
//! The pipeline is
//! 1. simulate or load the measurement data ([`load_or_simulate`]),
//! 2. compute or load a saddle point of high accuracy ([`load_or_compute_target`]),
//! 3. run each [`spdhg_core::Algorithm`] variant with measurement observers ([`run_variant`]),
//! 4. analyse and plot the recorded traces ([`analyse`], [`plot_semilogy`]).
//!
//! Every randomness and every cached artifact goes through one [`ExperimentContext`].

mod param;
mod bench_error;
mod cache;
mod context;

pub use param::*;
pub use bench_error::*;
pub use cache::*;
pub use context::*;

//

mod bundle;
mod phantom;
mod problem;
mod target;

pub use bundle::*;
pub use phantom::*;
pub use problem::*;
pub use target::*;

//

mod observer;
mod run;
mod analysis;
mod plot;

pub use observer::*;
pub use run::*;
pub use analysis::*;
pub use plot::*;

/// Linear algebra of the harness.
pub type La = spdhg_core::FloatGeneric<f64>;
