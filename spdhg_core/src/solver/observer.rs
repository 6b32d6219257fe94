//! Iterate state and its observers

use num_traits::Float;
use crate::solver::{LinAlg, SolverError};

/// Primal-dual iterate \\((x, y)\\).
///
/// `y` stacks the dual blocks \\(y_0, \ldots, y_{B-1}\\) in block order.
/// Owned by exactly one run of [`crate::solver::Solver`].
#[derive(Debug, Clone, PartialEq)]
pub struct IterateState<F: Float>
{
    /// Primal point \\(x\\).
    pub x: Vec<F>,
    /// Stacked dual point \\(y\\).
    pub y: Vec<F>,
}

impl<F: Float> IterateState<F>
{
    /// Creates a zero iterate.
    /// * `(m, n)` is the size of the stacked operator, that is the dual and primal dimensions.
    pub fn zero((m, n): (usize, usize)) -> Self
    {
        IterateState {
            x: vec![F::zero(); n],
            y: vec![F::zero(); m],
        }
    }
}

//

/// Objective value trait
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Read-only view of a problem given to each [`Observer`].
pub trait Objective<L: LinAlg>
{
    /// Calculates the primal objective \\(f(Ax) + g(x)\\).
    ///
    /// Returns the value, or `Err` with [`SolverError::OutOfDomain`] if \\(x\\) is infeasible.
    fn objective(&self, x: &L::Sl) -> Result<L::F, SolverError>;
}

/// Iteration observer trait
///
/// Invoked by [`crate::solver::Solver`] with the initial iterate as `k = 0`
/// and after every iteration `k = 1, ..., niter`, in the order observers are given.
/// An observer decides its own cadence and only reads the state.
pub trait Observer<L: LinAlg>
{
    /// Called once per iteration.
    /// * `k` is the iteration index.
    /// * `state` is the iterate after `k` iterations.
    /// * `obj` evaluates the objective at any primal point.
    fn on_iteration(&mut self, k: usize, state: &IterateState<L::F>, obj: &dyn Objective<L>);
}
