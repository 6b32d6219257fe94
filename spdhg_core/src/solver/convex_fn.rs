//! Proximable convex function

use num_traits::Float;
use crate::solver::{LinAlg, SliceLike, SolverError, ConfigError};

/// Proximable convex function trait
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Expresses a closed proper convex function \\(h: \mathbb{R}^n \to \mathbb{R} \cup \lbrace +\infty \rbrace\\),
/// used either as the regularizer \\(g\\) or as a summand \\(f_i\\) of the data term.
/// The solver touches \\(f_i\\) only through its convex conjugate \\(f_i^\*\\),
/// see [`ConvexFn::conj_prox`] and [`ConvexFn::conj_strong_convexity`].
pub trait ConvexFn<L: LinAlg>
{
    /// Dimension \\(n\\) of the domain.
    fn dim(&self) -> usize;

    /// Calculates \\(h(x)\\).
    ///
    /// Returns the value, or `Err` with [`SolverError::OutOfDomain`] if \\(x \notin {\bf dom}\,h\\).
    fn value(&self, x: &L::Sl) -> Result<L::F, SolverError>;

    /// Calculates \\({\bf prox}\_{s h}(x) = \arg\min_z \left( s h(z) + \frac12 \\|z - x\\|_2^2 \right)\\).
    ///
    /// Returns `Ok`, or `Err` if something fails.
    /// * `step` is \\(s > 0\\).
    /// * `x` is \\(x\\) before entry, the minimizer on exit.
    ///   Implementors with an iterative inner solver may return an approximate minimizer.
    fn prox(&mut self, step: L::F, x: &mut L::Sl) -> Result<(), SolverError>;

    /// Strong convexity modulus \\(\mu \ge 0\\) of \\(h\\), `0` if not strongly convex.
    fn strong_convexity(&self) -> L::F;

    /// Lipschitz constant of \\(\nabla h\\), `infinity` if \\(h\\) is not smooth.
    fn smoothness(&self) -> L::F
    {
        L::F::infinity()
    }

    /// Strong convexity modulus of \\(h^\*\\).
    ///
    /// Defaults to the reciprocal of [`ConvexFn::smoothness`].
    fn conj_strong_convexity(&self) -> L::F
    {
        self.smoothness().recip()
    }

    /// Calculates \\({\bf prox}\_{s h^\*}(y)\\).
    ///
    /// Defaults to the Moreau identity
    /// \\({\bf prox}\_{s h^\*}(y) = y - s\,{\bf prox}\_{h/s}(y/s)\\).
    /// * `step` is \\(s > 0\\).
    /// * `y` is \\(y\\) before entry, the minimizer on exit.
    fn conj_prox(&mut self, step: L::F, y: &mut L::Sl) -> Result<(), SolverError>
    {
        check_step(step)?;

        let mut w_v = y.to_vec();
        let mut w = L::Sl::new_mut(&mut w_v);

        L::scale(step.recip(), &mut w);
        self.prox(step.recip(), &mut w)?;
        L::add(-step, &w, y);

        Ok(())
    }
}

/// Checks a proximal step size.
pub(crate) fn check_step<F: Float>(step: F) -> Result<(), SolverError>
{
    if step > F::zero() && step.is_finite() {
        Ok(())
    }
    else {
        Err(ConfigError::NonPositiveStep.into())
    }
}
