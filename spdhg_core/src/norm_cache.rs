use num_traits::Float;
use std::collections::HashMap;
use rand::Rng;
use crate::solver::{LinAlg, Operator, SolverError};
use crate::{BlockOp, NormEstParam, Partition, PartitionOrder};

//

/// Operator norm estimates of one partition, with the tolerance they were estimated at.
#[derive(Debug, Clone, PartialEq)]
pub struct NormEntry<F: Float>
{
    /// Tolerance of the power method.
    pub tol: F,
    /// Norms indexed by subset, safety margin applied.
    pub norms: Vec<F>,
}

/// Memo of subset operator norms.
///
/// Keyed by the partition `(total, nsub, order)`, not by the run,
/// so that variants sharing a partition share its estimates.
/// An entry is re-estimated only when a tighter tolerance than the memoized one is requested,
/// hence the precision of an entry never decreases.
#[derive(Debug, Clone)]
pub struct NormCache<F: Float>
{
    entries: HashMap<(usize, usize, PartitionOrder), NormEntry<F>>,
}

impl<F: Float> NormCache<F>
{
    /// Creates an empty instance.
    pub fn new() -> Self
    {
        NormCache {
            entries: HashMap::new(),
        }
    }

    /// Memoized entry of `partition`, if any.
    pub fn get(&self, partition: &Partition) -> Option<&NormEntry<F>>
    {
        self.entries.get(&Self::key(partition))
    }

    /// Memoizes an entry, for example one loaded from a persisted cache.
    ///
    /// Returns `Err` if the entry has not a norm per subset.
    pub fn insert(&mut self, partition: &Partition, entry: NormEntry<F>) -> Result<(), SolverError>
    {
        if entry.norms.len() != partition.nsub() {
            log::error!("{} norms for {} subsets", entry.norms.len(), partition.nsub());
            return Err(crate::solver::ConfigError::NormCount.into());
        }

        let key = Self::key(partition);
        if let Some(cur) = self.entries.get(&key) {
            if cur.tol <= entry.tol {
                return Ok(());
            }
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Returns norms of every subset of `partition`, estimating them if not yet memoized
    /// at a tolerance of `par.tol` or tighter.
    pub fn get_or_estimate<L, O, R>(&mut self, op: &BlockOp<L, O>, partition: &Partition, par: &NormEstParam<F>, rng: &mut R) -> Result<Vec<F>, SolverError>
    where L: LinAlg<F=F>, O: Operator<L>, R: Rng
    {
        let key = Self::key(partition);

        if let Some(e) = self.entries.get(&key) {
            if e.tol <= par.tol {
                log::debug!("norms of {:?} memoized", key);
                return Ok(e.norms.clone());
            }
            log::debug!("norms of {:?} re-estimated at a tighter tolerance", key);
        }

        let norms = op.subset_norms(partition, par, rng)?;
        self.entries.insert(key, NormEntry {
            tol: par.tol,
            norms: norms.clone(),
        });
        Ok(norms)
    }

    fn key(partition: &Partition) -> (usize, usize, PartitionOrder)
    {
        (partition.total(), partition.nsub(), partition.order())
    }
}

impl<F: Float> Default for NormCache<F>
{
    fn default() -> Self
    {
        Self::new()
    }
}

//

#[test]
fn test_norm_cache1()
{
    use float_eq::assert_float_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use crate::{FloatGeneric, MatBuild};

    type L = FloatGeneric<f64>;

    let a0 = MatBuild::<L>::new((1, 2)).iter_rowmaj([3., 0.]);
    let a1 = MatBuild::<L>::new((1, 2)).iter_rowmaj([0., 4.]);
    let op = BlockOp::<L, _>::new(vec![a0, a1]).unwrap();
    let part = Partition::new(2, 2).unwrap();

    let mut rng = Xoshiro256StarStar::seed_from_u64(0);
    let mut cache = NormCache::new();

    let par = NormEstParam {max_iter: 50, tol: 1e-3, margin: 1.};
    let n1 = cache.get_or_estimate(&op, &part, &par, &mut rng).unwrap();
    assert_float_eq!(n1, vec![3., 4.], rmax_all <= 1e-6);

    // memoized: a looser request does not touch rng
    let par_loose = NormEstParam {tol: 1e-1, ..par.clone()};
    let mut rng_before = rng.clone();
    let n2 = cache.get_or_estimate(&op, &part, &par_loose, &mut rng).unwrap();
    assert_eq!(n1, n2);
    assert_eq!(rand::Rng::gen::<u64>(&mut rng), rand::Rng::gen::<u64>(&mut rng_before));

    // tighter request re-estimates and updates the tolerance
    let par_tight = NormEstParam {tol: 1e-9, ..par};
    cache.get_or_estimate(&op, &part, &par_tight, &mut rng).unwrap();
    assert_eq!(cache.get(&part).unwrap().tol, 1e-9);
}
