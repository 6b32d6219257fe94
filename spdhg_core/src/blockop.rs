use num_traits::{Float, Zero, One, ToPrimitive};
use core::marker::PhantomData;
use rand::Rng;
use crate::solver::{LinAlg, SliceLike, Operator, SolverError, ConfigError};
use crate::{Partition, splitm, splitm_mut};

//

/// Parameters of randomized operator norm estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormEstParam<F: Float>
{
    /// Max iteration number of the power method.
    pub max_iter: usize,
    /// Relative change of successive estimates to stop the power method.
    pub tol: F,
    /// Multiplicative safety margin (> 1) applied on top of the raw estimate,
    /// so that step sizes are calibrated with an upper bound of the norm.
    pub margin: F,
}

impl<F: Float> Default for NormEstParam<F>
{
    fn default() -> Self
    {
        NormEstParam {
            max_iter: 100,
            tol: F::from(1e-6).unwrap(),
            margin: F::from(1.05).unwrap(),
        }
    }
}

//

/// Block (broadcast) operator
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Stacks sub-operators \\(A_i: \mathbb{R}^n \to \mathbb{R}^{m_i}\\), \\(i=0,\ldots,B-1\\)
/// sharing the primal space:
/// \\[
/// A x = \left( A_0 x, \ldots, A_{B-1} x \right), \quad
/// A^T y = \sum_i A_i^T y_i.
/// \\]
pub struct BlockOp<L: LinAlg, O: Operator<L>>
{
    ph_l: PhantomData<L>,
    ops: Vec<O>,
    offsets: Vec<usize>,
    n: usize,
}

impl<L: LinAlg, O: Operator<L>> BlockOp<L, O>
{
    /// Creates an instance.
    ///
    /// Returns [`BlockOp`] instance, or `Err` if `ops` is empty or their column numbers differ.
    pub fn new(ops: Vec<O>) -> Result<Self, SolverError>
    {
        let n = match ops.first() {
            Some(o) => o.size().1,
            None => {
                log::error!("BlockOp needs at least one block");
                return Err(ConfigError::EmptyProblem.into());
            },
        };

        let mut offsets = Vec::with_capacity(ops.len() + 1);
        let mut m = 0;
        offsets.push(m);
        for (i, o) in ops.iter().enumerate() {
            let (mi, ni) = o.size();
            if ni != n {
                log::error!("Size mismatch: block {} has {} columns, expected {}", i, ni, n);
                return Err(SolverError::InvalidOp);
            }
            m += mi;
            offsets.push(m);
        }

        Ok(BlockOp {
            ph_l: PhantomData,
            ops,
            offsets,
            n,
        })
    }

    /// Number of blocks \\(B\\).
    pub fn len(&self) -> usize
    {
        self.ops.len()
    }

    /// Offset and length of the `i`-th dual block within the stacked dual vector.
    pub fn block_range(&self, i: usize) -> (usize, usize)
    {
        (self.offsets[i], self.offsets[i + 1] - self.offsets[i])
    }

    /// Largest dual block length.
    pub fn max_block_len(&self) -> usize
    {
        (0.. self.len()).map(|i| self.block_range(i).1).max().unwrap_or(0)
    }

    /// Calculates \\(\alpha A_i x + \beta y_i\\) for the `i`-th block only.
    pub fn op_block(&self, i: usize, alpha: L::F, x: &L::Sl, beta: L::F, y_i: &mut L::Sl)
    {
        self.ops[i].op(alpha, x, beta, y_i);
    }

    /// Calculates \\(\alpha A_i^T y_i + \beta x\\) for the `i`-th block only.
    pub fn trans_op_block(&self, i: usize, alpha: L::F, y_i: &L::Sl, beta: L::F, x: &mut L::Sl)
    {
        self.ops[i].trans_op(alpha, y_i, beta, x);
    }

    /// Estimates \\(\\|A_S\\|\\) of the sub-operator stacking blocks \\(S\\), with the safety margin applied.
    ///
    /// The power method runs on \\(A_S^T A_S = \sum_{i \in S} A_i^T A_i\\) from a random start drawn from `rng`,
    /// so the estimate is deterministic for a fixed seed.
    /// * `blocks` is \\(S\\).
    /// * `par` controls the power method.
    /// * `rng` is the random source.
    pub fn norm_est<R: Rng>(&self, blocks: &[usize], par: &NormEstParam<L::F>, rng: &mut R) -> L::F
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let n = self.n;

        if n == 0 || blocks.is_empty() {
            return f0;
        }

        let mut v_v: Vec<L::F> = (0.. n).map(|_| {
            num_traits::cast::<f64, L::F>(rng.gen::<f64>() - 0.5).unwrap_or(f0)
        }).collect();
        let mut w_v = vec![f0; n];
        let mut t_v = vec![f0; self.max_block_len()];

        let mut v = L::Sl::new_mut(&mut v_v);
        let mut w = L::Sl::new_mut(&mut w_v);
        let mut t = L::Sl::new_mut(&mut t_v);

        let nv = L::norm(&v);
        if nv > f0 {
            L::scale(nv.recip(), &mut v);
        }
        else {
            L::scale(f0, &mut v);
            v.set(0, f1);
        }

        let mut est = f0;
        let mut converged = false;
        for k in 0.. par.max_iter {
            // w = sum_i A_i^T A_i v
            L::scale(f0, &mut w);
            for &i in blocks {
                let (_, len) = self.block_range(i);
                splitm_mut!(t, (t_i; len));
                self.ops[i].op(f1, &v, f0, &mut t_i);
                self.ops[i].trans_op(f1, &t_i, f1, &mut w);
            }

            let lambda = L::norm(&w);
            let est_new = lambda.sqrt();
            log::trace!("{}: norm_est {:?}", k, est_new.to_f64());

            if lambda <= f0 {
                est = f0;
                converged = true;
                break;
            }

            L::copy(&w, &mut v);
            L::scale(lambda.recip(), &mut v);

            let diff = (est_new - est).abs();
            est = est_new;
            if diff <= par.tol * est {
                converged = true;
                break;
            }
        }

        if !converged {
            log::warn!("norm_est: power method reached max_iter {}", par.max_iter);
        }

        est * par.margin
    }

    /// Estimates norms of the sub-operators of every subset of `partition`.
    ///
    /// Returns a `Vec` in the subset order.
    /// Subsets are estimated one after another drawing from the same `rng`.
    pub fn subset_norms<R: Rng>(&self, partition: &Partition, par: &NormEstParam<L::F>, rng: &mut R) -> Result<Vec<L::F>, SolverError>
    {
        if partition.total() != self.len() {
            log::error!("Partition of {} blocks for BlockOp of {} blocks", partition.total(), self.len());
            return Err(SolverError::InvalidOp);
        }

        let norms = (0.. partition.nsub())
            .map(|j| self.norm_est(partition.subset(j), par, rng))
            .collect();
        Ok(norms)
    }
}

impl<L: LinAlg, O: Operator<L>> Operator<L> for BlockOp<L, O>
{
    fn size(&self) -> (usize, usize)
    {
        (self.offsets[self.len()], self.n)
    }

    fn op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.size().0);

        for (i, o) in self.ops.iter().enumerate() {
            let (offset, len) = self.block_range(i);
            splitm_mut!(y, (_y_done; offset), (y_i; len));
            o.op(alpha, x, beta, &mut y_i);
        }
    }

    fn trans_op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        assert_eq!(x.len(), self.size().0);
        assert_eq!(y.len(), self.n);

        L::scale(beta, y);
        for (i, o) in self.ops.iter().enumerate() {
            let (offset, len) = self.block_range(i);
            splitm!(x, (_x_done; offset), (x_i; len));
            o.trans_op(alpha, &x_i, L::F::one(), y);
        }
    }
}

//

#[test]
fn test_blockop1()
{
    use float_eq::assert_float_eq;
    use crate::{FloatGeneric, MatBuild};

    type L = FloatGeneric<f64>;

    let a0 = MatBuild::<L>::new((1, 2)).iter_rowmaj([1., 2.]);
    let a1 = MatBuild::<L>::new((2, 2)).iter_rowmaj([
        3., 0.,
        0., 4.,
    ]);
    let op = BlockOp::<L, _>::new(vec![a0, a1]).unwrap();

    assert_eq!(op.size(), (3, 2));
    assert_eq!(op.block_range(1), (1, 2));

    let y = &mut[0.; 3];
    op.op(1., &[1., 1.], 0., y);
    assert_float_eq!(y.as_ref(), [3., 3., 4.].as_ref(), abs_all <= 1e-12);

    // adjoint equals the sum of per-block adjoints
    let u = &[1., 2., 3.];
    let x = &mut[0.; 2];
    op.trans_op(1., u, 0., x);
    let x_sum = &mut[0.; 2];
    op.trans_op_block(0, 1., &u[0..1], 0., x_sum);
    op.trans_op_block(1, 1., &u[1..3], 1., x_sum);
    assert_float_eq!(x.as_ref(), x_sum.as_ref(), abs_all <= 1e-12);
    assert_float_eq!(x.as_ref(), [7., 14.].as_ref(), abs_all <= 1e-12);

    // power method: ||A_1|| = 4, ||A_0|| = sqrt(5), with the margin on top
    use rand::SeedableRng;
    let mut rng = rand_xoshiro::Xoshiro256StarStar::seed_from_u64(1807);
    let par = NormEstParam::default();
    assert_float_eq!(op.norm_est(&[1], &par, &mut rng), 4. * 1.05, r2nd <= 1e-4);
    assert_float_eq!(op.norm_est(&[0], &par, &mut rng), 5_f64.sqrt() * 1.05, r2nd <= 1e-4);
    assert_eq!(op.norm_est(&[], &par, &mut rng), 0.);
}
