use num_traits::Float;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use crate::solver::{SolverError, ConfigError};

//

/// How block indices are distributed over subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionOrder
{
    /// Subset `j` takes `j, j + n, j + 2n, ...`.
    Interlaced,
    /// Subsets take contiguous ranges, the first ones one element longer if needed.
    Block,
}

/// Near-equal partition of block indices `0..total` into `n` subsets.
///
/// Subset sizes differ by at most one, and each index belongs to exactly one subset.
/// The partition is a pure function of `(total, n, order)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition
{
    order: PartitionOrder,
    sub2ind: Vec<Vec<usize>>,
    ind2sub: Vec<usize>,
}

impl Partition
{
    /// Creates an interlaced partition.
    ///
    /// Returns `Err` if `n` is zero or exceeds `total`.
    pub fn new(total: usize, n: usize) -> Result<Self, SolverError>
    {
        Partition::with_order(total, n, PartitionOrder::Interlaced)
    }

    /// Creates a partition in the given `order`.
    ///
    /// Returns `Err` if `n` is zero or exceeds `total`.
    pub fn with_order(total: usize, n: usize, order: PartitionOrder) -> Result<Self, SolverError>
    {
        if n == 0 || n > total {
            log::error!("Cannot divide {} blocks into {} subsets", total, n);
            return Err(ConfigError::SubsetExcess.into());
        }

        let sub2ind: Vec<Vec<usize>> = match order {
            PartitionOrder::Interlaced => {
                (0.. n).map(|j| (j.. total).step_by(n).collect()).collect()
            },
            PartitionOrder::Block => {
                let (q, r) = (total / n, total % n);
                let mut start = 0;
                (0.. n).map(|j| {
                    let len = if j < r {q + 1} else {q};
                    let s: Vec<usize> = (start.. start + len).collect();
                    start += len;
                    s
                }).collect()
            },
        };

        let mut ind2sub = vec![0; total];
        for (j, s) in sub2ind.iter().enumerate() {
            for &i in s {
                ind2sub[i] = j;
            }
        }

        Ok(Partition {
            order,
            sub2ind,
            ind2sub,
        })
    }

    /// Order of the partition.
    pub fn order(&self) -> PartitionOrder
    {
        self.order
    }

    /// Number of subsets.
    pub fn nsub(&self) -> usize
    {
        self.sub2ind.len()
    }

    /// Number of block indices partitioned.
    pub fn total(&self) -> usize
    {
        self.ind2sub.len()
    }

    /// Block indices of the `j`-th subset.
    pub fn subset(&self, j: usize) -> &[usize]
    {
        &self.sub2ind[j]
    }

    /// Subset containing the block index `i`.
    pub fn subset_of(&self, i: usize) -> usize
    {
        self.ind2sub[i]
    }

    /// All subsets, indexed by subset.
    pub fn sub2ind(&self) -> &[Vec<usize>]
    {
        &self.sub2ind
    }

    /// Subset of each block, indexed by block.
    pub fn ind2sub(&self) -> &[usize]
    {
        &self.ind2sub
    }
}

//

/// Subset sampler
///
/// Draws one subset per iteration from the categorical distribution \\(\lbrace p_j \rbrace\\).
/// The sequence of draws depends only on the state of `rng`,
/// so a fixed seed reproduces it exactly.
pub struct Sampler<R: Rng>
{
    rng: R,
    dist: WeightedIndex<f64>,
}

impl<R: Rng> Sampler<R>
{
    /// Creates an instance.
    ///
    /// Returns [`Sampler`], or `Err` if `prob_subset` is empty, has a negative entry, or does not sum to one.
    /// * `rng` is the seeded random source, owned by the sampler for the run.
    /// * `prob_subset` is \\(\lbrace p_j \rbrace\\).
    pub fn new<F: Float>(rng: R, prob_subset: &[F]) -> Result<Self, SolverError>
    {
        let p = check_prob(prob_subset)?;

        let dist = WeightedIndex::new(&p).map_err(|e| {
            log::error!("WeightedIndex: {}", e);
            SolverError::from(ConfigError::ProbSum)
        })?;

        Ok(Sampler {
            rng,
            dist,
        })
    }

    /// Draws the subset for iteration `k`.
    ///
    /// Returns the subset index.
    /// `k` is only for logging; draws do not depend on it.
    pub fn select(&mut self, k: usize) -> usize
    {
        let j = self.dist.sample(&mut self.rng);
        log::trace!("{}: select {}", k, j);
        j
    }
}

/// Checks probabilities are nonnegative and sum to one.
///
/// Returns them as `f64`.
pub(crate) fn check_prob<F: Float>(prob: &[F]) -> Result<Vec<f64>, SolverError>
{
    let p: Vec<f64> = prob.iter().map(|v| v.to_f64().unwrap_or(f64::NAN)).collect();

    let sum: f64 = p.iter().sum();
    let tol = 1e-9 * (p.len().max(1) as f64);

    if p.is_empty() || p.iter().any(|v| !(*v >= 0.)) || (sum - 1.).abs() > tol {
        log::error!("Invalid probabilities: sum {}", sum);
        return Err(ConfigError::ProbSum.into());
    }

    Ok(p)
}

//

#[test]
fn test_partition1()
{
    let p = Partition::new(7, 3).unwrap();

    assert_eq!(p.subset(0), &[0, 3, 6]);
    assert_eq!(p.subset(1), &[1, 4]);
    assert_eq!(p.subset(2), &[2, 5]);
    assert_eq!(p.subset_of(4), 1);

    let p = Partition::with_order(7, 3, PartitionOrder::Block).unwrap();

    assert_eq!(p.subset(0), &[0, 1, 2]);
    assert_eq!(p.subset(1), &[3, 4]);
    assert_eq!(p.subset(2), &[5, 6]);

    assert!(Partition::new(3, 4).is_err());
    assert!(Partition::new(3, 0).is_err());
}
