use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Serialize, Deserialize};
use spdhg_core::solver::Operator;
use spdhg_core::{BlockOp, NormCache, NormEntry, NormEstParam, Partition};
use crate::{BenchParam, ArtifactCache, BenchError, La};

/// Persisted operator norms of one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormsFile
{
    pub tol: f64,
    pub norms: Vec<f64>,
}

//

/// State shared by every stage of an experiment.
///
/// Holds the seed every random source is derived from, the artifact cache of the problem size,
/// and the in-memory memo of operator norms.
/// Passed explicitly; nothing of the experiment is process-wide.
pub struct ExperimentContext
{
    /// Experiment parameters.
    pub par: BenchParam,
    cache: ArtifactCache,
    norms: NormCache<f64>,
}

impl ExperimentContext
{
    /// Creates an instance, creating the folders of `par`.
    pub fn new(par: BenchParam) -> Result<Self, BenchError>
    {
        let cache = ArtifactCache::new(par.folder_main())?;
        std::fs::create_dir_all(par.folder_bundle())?;

        log::debug!("{:?}", par);

        Ok(ExperimentContext {
            par,
            cache,
            norms: NormCache::new(),
        })
    }

    /// Artifact cache keyed by the problem size.
    pub fn cache(&self) -> &ArtifactCache
    {
        &self.cache
    }

    /// Fresh random source seeded by the experiment seed.
    ///
    /// Every call restarts the same sequence,
    /// so that each stage and each run is reproducible on its own.
    pub fn rng(&self) -> Xoshiro256StarStar
    {
        Xoshiro256StarStar::seed_from_u64(self.par.seed)
    }

    /// Norm estimation parameters with the safety factor of the experiment.
    pub fn norm_est_param(&self) -> NormEstParam<f64>
    {
        NormEstParam {
            margin: self.par.tol_norm,
            .. Default::default()
        }
    }

    /// Operator norms of every subset of `partition`.
    ///
    /// Looked up in memory, then in the artifact `norms_{n}subsets`,
    /// and estimated with a fresh random source only if both miss.
    pub fn subset_norms<O>(&mut self, op: &BlockOp<La, O>, partition: &Partition) -> Result<Vec<f64>, BenchError>
    where O: Operator<La>
    {
        let par = self.norm_est_param();

        if let Some(e) = self.norms.get(partition) {
            if e.tol <= par.tol {
                return Ok(e.norms.clone());
            }
        }

        let name = format!("norms_{}subsets", partition.nsub());
        let file = match self.cache.load::<NormsFile>(&name)? {
            Some(f) if f.norms.len() == partition.nsub() => f,
            Some(f) => {
                return Err(BenchError::CacheCorruption {
                    path: self.cache.path(&name),
                    reason: format!("{} norms for {} subsets", f.norms.len(), partition.nsub()),
                });
            },
            None => {
                let mut rng = self.rng();
                let norms = self.norms.get_or_estimate(op, partition, &par, &mut rng)?;
                let f = NormsFile {tol: par.tol, norms};
                self.cache.save(&name, &f)?;
                f
            },
        };

        self.norms.insert(partition, NormEntry {tol: file.tol, norms: file.norms.clone()})?;
        Ok(file.norms)
    }
}
