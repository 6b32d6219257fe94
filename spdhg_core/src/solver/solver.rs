//! Stochastic primal-dual hybrid gradient solver

use num_traits::{Float, Zero, One};
use core::marker::PhantomData;
use core::fmt::{Debug, LowerExp};
use rand::Rng;
use crate::solver::{LinAlg, SliceLike, Operator, ConvexFn, SolverError};
use crate::solver::{IterateState, Objective, Observer};
use crate::{AlgorithmConfig, Problem, Sampler, splitm_mut};

//

/// Solver parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParam
{
    /// Period of iterations to output progress log(for debug/trace level).
    pub log_period: usize,
}

impl Default for SolverParam
{
    fn default() -> Self
    {
        SolverParam {
            log_period: 100,
        }
    }
}

//

/// Stochastic primal-dual hybrid gradient solver
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Solves the saddle-point problem of [`Problem`],
/// \\[
/// \min_x \max_y \sum_i \langle A_i x, y_i \rangle - f_i^\*(y_i) + g(x),
/// \\]
/// by the iteration of [`PrimalDual::step`] with the variant and steps of an [`AlgorithmConfig`].
/// The iteration budget is fixed; there is no adaptive stopping.
pub struct Solver<L: LinAlg>
{
    /// solver parameters.
    pub par: SolverParam,

    ph_l: PhantomData<L>,
}

impl<L: LinAlg> Solver<L>
{
    /// Creates an instance.
    ///
    /// Returns [`Solver`] instance.
    pub fn new() -> Self
    {
        Solver {
            par: SolverParam::default(),
            ph_l: PhantomData,
        }
    }

    /// Changes solver parameters.
    ///
    /// Returns [`Solver`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut SolverParam)
    {
        f(&mut self.par);
        self
    }
}

impl<L: LinAlg> Default for Solver<L>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<L: LinAlg> Solver<L>
where L::F: Float + Debug + LowerExp
{
    /// Runs the configured algorithm for `cfg.niter()` iterations.
    ///
    /// Returns `Ok` with the final iterate
    /// or `Err` with [`SolverError`] type, in which case no iterate is returned.
    /// * `prob` is the [`Problem`].
    /// * `cfg` is the calibrated [`AlgorithmConfig`], immutable during the run.
    /// * `sampler` draws one subset per iteration; its state is the only source of randomness.
    /// * `observers` are invoked in order at `k = 0` and after every iteration.
    /// * `state` is the initial iterate.
    pub fn solve<O, G, R>(self,
        (prob, cfg, sampler, observers): (&mut Problem<L, O, G>, &AlgorithmConfig<L::F>, &mut Sampler<R>, &mut [&mut dyn Observer<L>]),
        state: IterateState<L::F>
    ) -> Result<IterateState<L::F>, SolverError>
    where O: Operator<L>, G: ConvexFn<L>, R: Rng
    {
        log::debug!("{:?}", self.par);

        log::info!("----- Initializing");
        let mut core = PrimalDual::new(prob, cfg, state)?;

        for o in observers.iter_mut() {
            o.on_iteration(0, core.state(), core.objective());
        }

        log::info!("----- Started");
        for k in 1..= cfg.niter() {
            let log_trig = if self.par.log_period > 0 {
                k % self.par.log_period == 0
            }
            else {
                if k == 1 && log::log_enabled!(log::Level::Debug) {
                    log::warn!("log_period == 0: no periodic log");
                }
                false
            };

            let j = sampler.select(k);
            core.step(j)?;

            if log_trig {
                log::debug!("{}: subset {} |x| {:.3e} |y| {:.3e}", k, j, core.norm_x(), core.norm_y());
            }
            else {
                log::trace!("{}: subset {} |x| {:.3e} |y| {:.3e}", k, j, core.norm_x(), core.norm_y());
            }

            for o in observers.iter_mut() {
                o.on_iteration(k, core.state(), core.objective());
            }
        }
        log::info!("----- Finished");

        Ok(core.into_state())
    }
}

//

/// One run of the primal-dual iteration
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Keeps \\(z = A^T y\\) and its extrapolation \\(\bar z\\) along with the iterate.
/// For [`crate::Algorithm::Deterministic`] and [`crate::Algorithm::UniformStochastic`], a step with subset \\(S\\) is
/// \\[
/// \begin{array}{l}
/// x \leftarrow {\bf prox}\_{\tau g}(x - \tau \bar z) \\\\
/// y_i \leftarrow {\bf prox}\_{\sigma_i f_i^\*}(y_i + \sigma_i A_i x), \quad i \in S \\\\
/// z \leftarrow z + \sum_{i \in S} A_i^T \Delta y_i \\\\
/// \bar z \leftarrow z + \theta \sum_{i \in S} \frac{1}{p_i} A_i^T \Delta y_i
/// \end{array}
/// \\]
/// where \\(p_i\\) is the probability that block \\(i\\) belongs to the drawn subset,
/// so that \\(\bar z\\) is an unbiased estimate of \\(A^T (y + \theta \Delta y)\\) of the full update.
/// [`crate::Algorithm::Pesquet`] has no extrapolation, so its \\(\bar z = z\\).
pub struct PrimalDual<'a, L, O, G>
where L: LinAlg, O: Operator<L>, G: ConvexFn<L>
{
    prob: &'a mut Problem<L, O, G>,
    cfg: &'a AlgorithmConfig<L::F>,

    state: IterateState<L::F>,
    z: Vec<L::F>,
    zbar: Vec<L::F>,
    dz: Vec<L::F>,
    dz_w: Vec<L::F>,
    dy: Vec<L::F>,
}

impl<'a, L, O, G> PrimalDual<'a, L, O, G>
where L: LinAlg, O: Operator<L>, G: ConvexFn<L>
{
    /// Creates an instance, starting at `state`.
    ///
    /// Returns [`PrimalDual`], or `Err` with [`SolverError::InvalidOp`]
    /// if `cfg` or `state` does not fit `prob`.
    pub fn new(prob: &'a mut Problem<L, O, G>, cfg: &'a AlgorithmConfig<L::F>, state: IterateState<L::F>) -> Result<Self, SolverError>
    {
        let (m, n) = prob.op_a().size();

        if cfg.partition().total() != prob.op_a().len() {
            log::error!("Configured {} blocks, problem has {}", cfg.partition().total(), prob.op_a().len());
            return Err(SolverError::InvalidOp);
        }
        if state.x.len() != n || state.y.len() != m {
            log::error!("Size mismatch: x {}, y {}, op_a {:?}", state.x.len(), state.y.len(), (m, n));
            return Err(SolverError::InvalidOp);
        }

        // z = A^T y
        let z = prob.adjoint(&state.y);
        let zbar = z.clone();

        Ok(PrimalDual {
            dz: vec![L::F::zero(); n],
            dz_w: vec![L::F::zero(); n],
            dy: vec![L::F::zero(); prob.op_a().max_block_len()],
            prob,
            cfg,
            state,
            z,
            zbar,
        })
    }

    /// Current iterate.
    pub fn state(&self) -> &IterateState<L::F>
    {
        &self.state
    }

    /// Gives back the iterate.
    pub fn into_state(self) -> IterateState<L::F>
    {
        self.state
    }

    /// \\(z = A^T y\\).
    pub fn z(&self) -> &[L::F]
    {
        &self.z
    }

    /// Extrapolated \\(\bar z\\) the next primal step reads.
    pub fn zbar(&self) -> &[L::F]
    {
        &self.zbar
    }

    /// Objective view of the problem.
    pub fn objective(&self) -> &dyn Objective<L>
    {
        &*self.prob
    }

    fn norm_x(&self) -> L::F
    {
        L::norm(&L::Sl::new_ref(&self.state.x))
    }

    fn norm_y(&self) -> L::F
    {
        L::norm(&L::Sl::new_ref(&self.state.y))
    }

    /// Performs one iteration updating the blocks of the `j`-th subset.
    ///
    /// Returns `Ok`, or `Err` if a prox fails.
    pub fn step(&mut self, j: usize) -> Result<(), SolverError>
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let tau = self.cfg.tau();

        let (op_a, f, g) = self.prob.parts_mut();

        let mut x = L::Sl::new_mut(&mut self.state.x);
        let mut y = L::Sl::new_mut(&mut self.state.y);
        let mut dz = L::Sl::new_mut(&mut self.dz);
        let mut dz_w = L::Sl::new_mut(&mut self.dz_w);
        let mut dy = L::Sl::new_mut(&mut self.dy);

        // primal: x = prox_{tau g}(x - tau zbar)
        L::add(-tau, &L::Sl::new_ref(&self.zbar), &mut x);
        g.prox(tau, &mut x)?;

        L::scale(f0, &mut dz);
        L::scale(f0, &mut dz_w);

        for &i in self.cfg.partition().subset(j) {
            let sigma_i = self.cfg.sigma()[i];
            let p_i = self.cfg.prob()[i];
            let (offset, len) = op_a.block_range(i);

            splitm_mut!(y, (_y_done; offset), (y_i; len));
            splitm_mut!(dy, (dy_i; len));

            // y_i = prox_{sigma_i f_i^*}(y_i + sigma_i A_i x)
            L::copy(&y_i, &mut dy_i);
            op_a.op_block(i, sigma_i, &x, f1, &mut y_i);
            f.conj_prox_block(i, sigma_i, &mut y_i)?;

            // dy_i = y_i - y_i(prev)
            L::scale(-f1, &mut dy_i);
            L::add(f1, &y_i, &mut dy_i);

            op_a.trans_op_block(i, f1, &dy_i, f1, &mut dz);
            op_a.trans_op_block(i, p_i.recip(), &dy_i, f1, &mut dz_w);
        }

        let mut z = L::Sl::new_mut(&mut self.z);
        let mut zbar = L::Sl::new_mut(&mut self.zbar);

        L::add(f1, &dz, &mut z);
        L::copy(&z, &mut zbar);
        if let Some(theta) = self.cfg.theta() {
            L::add(theta, &dz_w, &mut zbar);
        }

        Ok(())
    }
}
