use num_traits::Float;
use crate::solver::{SolverError, ConfigError};
use crate::partition::check_prob;
use crate::Partition;

//

/// Algorithm variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm
{
    /// Deterministic PDHG: one subset holding every block, accelerated by strong convexity.
    Deterministic,
    /// SPDHG with `n` subsets drawn uniformly, accelerated by strong convexity.
    UniformStochastic(usize),
    /// Pesquet-Repetti stochastic primal-dual with `n` subsets drawn uniformly, non-accelerated.
    Pesquet(usize),
}

impl Algorithm
{
    /// Number of subsets.
    pub fn nsub(&self) -> usize
    {
        match self {
            Algorithm::Deterministic => 1,
            Algorithm::UniformStochastic(n) => *n,
            Algorithm::Pesquet(n) => *n,
        }
    }

    /// Number of subsets of the partition whose operator norms the calibration consumes.
    ///
    /// [`Algorithm::Pesquet`] consumes the global norm of the whole operator.
    pub fn norm_nsub(&self) -> usize
    {
        match self {
            Algorithm::Deterministic => 1,
            Algorithm::UniformStochastic(n) => *n,
            Algorithm::Pesquet(_) => 1,
        }
    }

    /// Short name used for output files and logs, e.g. `spdhg_uni10`.
    pub fn name(&self) -> String
    {
        match self {
            Algorithm::Deterministic => "pdhg".to_string(),
            Algorithm::UniformStochastic(n) => format!("spdhg_uni{}", n),
            Algorithm::Pesquet(n) => format!("pesquet_uni{}", n),
        }
    }
}

impl core::fmt::Display for Algorithm
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result
    {
        write!(f, "{}", self.name())
    }
}

//

/// Strong convexity moduli of the problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Moduli<F: Float>
{
    /// \\(\mu_g\\) of the regularizer \\(g\\).
    pub mu_g: F,
    /// \\(\mu_i\\) of each conjugate \\(f_i^\*\\), indexed by block.
    pub mu_i: Vec<F>,
}

impl<F: Float> Moduli<F>
{
    /// \\(\mu_f = \min_i \mu_i\\).
    pub fn mu_f(&self) -> F
    {
        self.mu_i.iter().fold(F::infinity(), |m, v| m.min(*v))
    }
}

//

/// Algorithm configuration
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Immutable record of one run: primal step \\(\tau\\), dual steps \\(\sigma_i\\) per block,
/// extrapolation \\(\theta\\), subset probabilities \\(p_j\\), the partition and the iteration budget.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmConfig<F: Float>
{
    alg: Algorithm,
    tau: F,
    sigma: Vec<F>,
    theta: Option<F>,
    kappa: Option<F>,
    prob_subset: Vec<F>,
    prob: Vec<F>,
    partition: Partition,
    niter: usize,
}

impl<F: Float> AlgorithmConfig<F>
{
    /// Creates an instance from explicit parameters.
    ///
    /// Returns [`AlgorithmConfig`], or `Err` if
    /// * `tau` or an element of `sigma` is not finite positive,
    /// * `sigma` has not a length of the number of blocks,
    /// * `prob_subset` has not a length of the number of subsets, or does not sum to one.
    pub fn new(alg: Algorithm, tau: F, sigma: Vec<F>, theta: Option<F>, prob_subset: Vec<F>, partition: Partition, niter: usize) -> Result<Self, SolverError>
    {
        let step_ok = |s: F| s > F::zero() && s.is_finite();

        if !step_ok(tau) || !sigma.iter().all(|s| step_ok(*s)) {
            log::error!("Invalid step sizes");
            return Err(ConfigError::NonPositiveStep.into());
        }
        if let Some(th) = theta {
            if !th.is_finite() {
                log::error!("Invalid extrapolation parameter");
                return Err(ConfigError::NonPositiveStep.into());
            }
        }
        if sigma.len() != partition.total() {
            log::error!("{} dual steps for {} blocks", sigma.len(), partition.total());
            return Err(ConfigError::StepCount.into());
        }
        if prob_subset.len() != partition.nsub() {
            log::error!("{} probabilities for {} subsets", prob_subset.len(), partition.nsub());
            return Err(ConfigError::ProbSum.into());
        }
        check_prob(&prob_subset)?;

        let prob = partition.ind2sub().iter().map(|j| prob_subset[*j]).collect();

        Ok(AlgorithmConfig {
            alg,
            tau,
            sigma,
            theta,
            kappa: None,
            prob_subset,
            prob,
            partition,
            niter,
        })
    }

    /// Algorithm variant.
    pub fn alg(&self) -> Algorithm
    {
        self.alg
    }

    /// Primal step \\(\tau\\).
    pub fn tau(&self) -> F
    {
        self.tau
    }

    /// Dual steps \\(\sigma_i\\), indexed by block.
    pub fn sigma(&self) -> &[F]
    {
        &self.sigma
    }

    /// Extrapolation \\(\theta\\), `None` if the variant does not extrapolate.
    pub fn theta(&self) -> Option<F>
    {
        self.theta
    }

    /// Condition value \\(\kappa\\) (\\(\kappa_{\max}\\) for stochastic variants) the steps derive from,
    /// `None` for non-accelerated or explicit configurations.
    pub fn kappa(&self) -> Option<F>
    {
        self.kappa
    }

    /// Subset selection probabilities \\(p_j\\), indexed by subset.
    pub fn prob_subset(&self) -> &[F]
    {
        &self.prob_subset
    }

    /// Probability that block `i` belongs to the drawn subset, indexed by block.
    pub fn prob(&self) -> &[F]
    {
        &self.prob
    }

    /// Partition of blocks into subsets.
    pub fn partition(&self) -> &Partition
    {
        &self.partition
    }

    /// Iteration budget.
    pub fn niter(&self) -> usize
    {
        self.niter
    }
}

//

/// Calibrates an [`AlgorithmConfig`].
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// * [`Algorithm::Deterministic`]:
///   \\(\kappa = \sqrt{1 + \\|A\\|^2 / (\mu_g \mu_f) / \rho^2}\\),
///   \\(\sigma_i = 1 / ((\kappa - 1) \mu_f)\\),
///   \\(\tau = 1 / ((\kappa - 1) \mu_g)\\),
///   \\(\theta = 1 - 2 / (1 + \kappa)\\).
/// * [`Algorithm::UniformStochastic`]:
///   \\(\kappa_j = \sqrt{1 + \\|A_{S_j}\\|^2 / (\mu_g \mu_j) / \rho^2}\\) per subset with \\(\mu_j = \min_{i \in S_j} \mu_i\\),
///   \\(p_j = 1/n\\),
///   \\(\sigma_i = 1 / ((\kappa_{\max} - 1) \mu_i)\\),
///   \\(\tau = 1 / ((n \kappa_{\max} + n - 2) \mu_g)\\),
///   \\(\theta = 1 - 2 / (n + n \kappa_{\max})\\).
/// * [`Algorithm::Pesquet`]:
///   \\(\sigma_i = \tau = \rho / \\|A\\|\\), \\(p_j = 1/n\\), no extrapolation.
///
/// Returns the configuration, or `Err` if a modulus required by an accelerated variant is not positive,
/// \\(\rho \notin (0, 1)\\), the subset number is invalid, or `norms` mismatches [`Algorithm::norm_nsub`].
/// * `alg` is the variant.
/// * `moduli` are the strong convexity moduli; its `mu_i` length defines the number of blocks.
/// * `norms` are the (safety-margined) operator norms of the [`Algorithm::norm_nsub`]-subset partition.
/// * `rho` is the square root of the step size upper bound, \\(\rho < 1\\).
/// * `niter` is the iteration budget.
pub fn calibrate<F: Float>(alg: Algorithm, moduli: &Moduli<F>, norms: &[F], rho: F, niter: usize) -> Result<AlgorithmConfig<F>, SolverError>
{
    let f0 = F::zero();
    let f1 = F::one();
    let f2 = f1 + f1;

    let nblk = moduli.mu_i.len();
    let n = alg.nsub();

    if nblk == 0 {
        log::error!("No block to calibrate");
        return Err(ConfigError::EmptyProblem.into());
    }
    if !(rho > f0 && rho < f1) {
        log::error!("rho {:?} out of (0, 1)", rho.to_f64());
        return Err(ConfigError::RhoRange.into());
    }
    let partition = Partition::new(nblk, n)?;

    if norms.len() != alg.norm_nsub() {
        log::error!("{} norms given, {} expected", norms.len(), alg.norm_nsub());
        return Err(ConfigError::NormCount.into());
    }
    if !norms.iter().all(|v| *v > f0 && v.is_finite()) {
        log::error!("Operator norms must be finite positive");
        return Err(ConfigError::NonPositiveStep.into());
    }

    let fn_ = F::from(n).unwrap();
    let prob_subset = vec![fn_.recip(); n];

    let check_mu = |mu: F| {
        if mu > f0 && mu.is_finite() {
            Ok(mu)
        }
        else {
            log::error!("{}: strong convexity modulus {:?} not positive", alg, mu.to_f64());
            Err(SolverError::from(ConfigError::ZeroStrongConvexity))
        }
    };

    let cfg = match alg {
        Algorithm::Deterministic => {
            let mu_g = check_mu(moduli.mu_g)?;
            let mu_f = check_mu(moduli.mu_f())?;

            let kappa = (f1 + norms[0].powi(2) / (mu_g * mu_f) / rho.powi(2)).sqrt();
            let sigma = vec![((kappa - f1) * mu_f).recip(); nblk];
            let tau = ((kappa - f1) * mu_g).recip();
            let theta = f1 - f2 / (f1 + kappa);

            let mut cfg = AlgorithmConfig::new(alg, tau, sigma, Some(theta), prob_subset, partition, niter)?;
            cfg.kappa = Some(kappa);
            cfg
        },
        Algorithm::UniformStochastic(_) => {
            let mu_g = check_mu(moduli.mu_g)?;
            for mu in moduli.mu_i.iter() {
                check_mu(*mu)?;
            }

            let mut kappa_max = f0;
            for (j, norm_j) in norms.iter().enumerate() {
                let mu_j = partition.subset(j).iter()
                           .fold(F::infinity(), |m, i| m.min(moduli.mu_i[*i]));
                let kappa_j = (f1 + norm_j.powi(2) / (mu_g * mu_j) / rho.powi(2)).sqrt();
                kappa_max = kappa_max.max(kappa_j);
            }

            let sigma = moduli.mu_i.iter().map(|mu| ((kappa_max - f1) * *mu).recip()).collect();
            let tau = ((fn_ * kappa_max + fn_ - f2) * mu_g).recip();
            let theta = f1 - f2 / (fn_ + fn_ * kappa_max);

            let mut cfg = AlgorithmConfig::new(alg, tau, sigma, Some(theta), prob_subset, partition, niter)?;
            cfg.kappa = Some(kappa_max);
            cfg
        },
        Algorithm::Pesquet(_) => {
            let step = rho / norms[0];
            let sigma = vec![step; nblk];

            AlgorithmConfig::new(alg, step, sigma, None, prob_subset, partition, niter)?
        },
    };

    log::debug!("{}: tau {:?}, theta {:?}, kappa {:?}", alg,
        cfg.tau.to_f64(), cfg.theta.and_then(|v| v.to_f64()), cfg.kappa.and_then(|v| v.to_f64()));

    Ok(cfg)
}
