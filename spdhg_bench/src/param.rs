use num_traits::Num;
use std::path::PathBuf;

/// Reads a number from the environment variable `e`.
///
/// Returns the value if `e` is set and parses, logging it as an override.
pub fn num_by_env<N: Num + std::fmt::Display>(e: &str) -> Option<N>
{
    if let Some(v) = std::env::var(e).ok()
                     .and_then(|s| {N::from_str_radix(&s, 10).ok()}) {
        log::info!("{}: {}", e, v);
        Some(v)
    }
    else {
        None
    }
}

//

/// Experiment parameters.
///
/// In-code constants of the comparison; see [`BenchParam::set_by_env`] for overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchParam
{
    /// Number of epochs each variant runs, an epoch being `nsub` iterations.
    pub nepoch: usize,
    /// Iterations of the deterministic run computing the saddle point.
    pub niter_target: usize,
    /// Image is `nvoxel` by `nvoxel` pixels.
    pub nvoxel: usize,
    /// Number of projection views, i.e. operator blocks.
    pub nview: usize,
    /// Seed of every random source of the experiment.
    pub seed: u64,
    /// Safety factor of operator norm estimates.
    pub tol_norm: f64,
    /// Square root of the step size upper bound, `< 1`.
    pub rho: f64,
    /// Weight of the total variation.
    pub alpha: f64,
    /// Strong convexity of the prior.
    pub mu_g: f64,
    /// Iterations of the inner prox solver of the prior.
    pub prox_niter: usize,
    /// Expected total counts of the signal.
    pub counts_desired: f64,
    /// Expected total counts of the background.
    pub counts_background: f64,
    /// Folder below which cached artifacts and outputs are written.
    pub folder_out: PathBuf,
}

impl Default for BenchParam
{
    fn default() -> Self
    {
        BenchParam {
            nepoch: 100,
            niter_target: 2000,
            nvoxel: 32,
            nview: 60,
            seed: 1807,
            tol_norm: 1.05,
            rho: 0.99,
            alpha: 5e-2,
            mu_g: 5e-1,
            prox_niter: 20,
            counts_desired: 3e6,
            counts_background: 2e6,
            folder_out: PathBuf::from("."),
        }
    }
}

impl BenchParam
{
    /// Overrides parameters by the environment variables
    /// `NEPOCH`, `NITER_TARGET`, `NVOXEL`, `NVIEW`, `SEED` and `FOLDER_OUT`.
    pub fn set_by_env(&mut self)
    {
        self.nepoch = num_by_env("NEPOCH").unwrap_or(self.nepoch);
        self.niter_target = num_by_env("NITER_TARGET").unwrap_or(self.niter_target);
        self.nvoxel = num_by_env("NVOXEL").unwrap_or(self.nvoxel);
        self.nview = num_by_env("NVIEW").unwrap_or(self.nview);
        self.seed = num_by_env("SEED").unwrap_or(self.seed);
        if let Ok(s) = std::env::var("FOLDER_OUT") {
            log::info!("FOLDER_OUT: {}", s);
            self.folder_out = PathBuf::from(s);
        }
    }

    /// Folder of artifacts depending only on the problem size.
    pub fn folder_main(&self) -> PathBuf
    {
        self.folder_out.join(format!("pet_strongly_convex_{}x{}_{}views", self.nvoxel, self.nvoxel, self.nview))
    }

    /// Folder of outputs of the runs of `nepoch` epochs.
    pub fn folder_today(&self) -> PathBuf
    {
        self.folder_main().join(format!("{}epochs", self.nepoch))
    }

    /// Folder of per-run output bundles.
    pub fn folder_bundle(&self) -> PathBuf
    {
        self.folder_today().join("bundle")
    }
}
