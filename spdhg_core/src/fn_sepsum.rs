use num_traits::{Float, Zero};
use crate::solver::{LinAlg, SliceLike, ConvexFn, SolverError, ConfigError};
use crate::{splitm, splitm_mut};

//

/// Separable sum
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\(f(y) = \sum_i f_i(y_i)\\) over the blocks \\(y = (y_0, \ldots, y_{B-1})\\) of a stacked vector.
/// Every operation acts on each block independently,
/// so that a stochastic step can touch only the selected blocks through
/// [`SeparableSum::conj_prox_block`].
pub struct SeparableSum<L: LinAlg>
{
    fns: Vec<Box<dyn ConvexFn<L>>>,
    offsets: Vec<usize>,
}

impl<L: LinAlg> SeparableSum<L>
{
    /// Creates an instance.
    ///
    /// Returns [`SeparableSum`], or `Err` if `fns` is empty.
    pub fn new(fns: Vec<Box<dyn ConvexFn<L>>>) -> Result<Self, SolverError>
    {
        if fns.is_empty() {
            log::error!("SeparableSum needs at least one term");
            return Err(ConfigError::EmptyProblem.into());
        }

        let mut offsets = Vec::with_capacity(fns.len() + 1);
        let mut m = 0;
        offsets.push(m);
        for f in fns.iter() {
            m += f.dim();
            offsets.push(m);
        }

        Ok(SeparableSum {
            fns,
            offsets,
        })
    }

    /// Number of blocks.
    pub fn len(&self) -> usize
    {
        self.fns.len()
    }

    /// Offset and length of the `i`-th block within the stacked vector.
    pub fn block_range(&self, i: usize) -> (usize, usize)
    {
        (self.offsets[i], self.offsets[i + 1] - self.offsets[i])
    }

    /// Strong convexity moduli of the conjugates \\(f_i^\*\\), indexed by block.
    pub fn conj_moduli(&self) -> Vec<L::F>
    {
        self.fns.iter().map(|f| f.conj_strong_convexity()).collect()
    }

    /// Calculates \\({\bf prox}\_{s f_i^\*}(y_i)\\) of the `i`-th block only.
    pub fn conj_prox_block(&mut self, i: usize, step: L::F, y_i: &mut L::Sl) -> Result<(), SolverError>
    {
        self.fns[i].conj_prox(step, y_i)
    }
}

impl<L: LinAlg> ConvexFn<L> for SeparableSum<L>
{
    fn dim(&self) -> usize
    {
        self.offsets[self.len()]
    }

    fn value(&self, x: &L::Sl) -> Result<L::F, SolverError>
    {
        if x.len() != self.dim() {
            return Err(SolverError::InvalidOp);
        }

        let mut sum = L::F::zero();
        for (i, f) in self.fns.iter().enumerate() {
            let (offset, len) = self.block_range(i);
            splitm!(x, (_x_done; offset), (x_i; len));
            sum = sum + f.value(&x_i)?;
        }
        Ok(sum)
    }

    fn prox(&mut self, step: L::F, x: &mut L::Sl) -> Result<(), SolverError>
    {
        if x.len() != self.dim() {
            return Err(SolverError::InvalidOp);
        }

        for i in 0.. self.len() {
            let (offset, len) = self.block_range(i);
            splitm_mut!(x, (_x_done; offset), (x_i; len));
            self.fns[i].prox(step, &mut x_i)?;
        }
        Ok(())
    }

    fn strong_convexity(&self) -> L::F
    {
        self.fns.iter().fold(L::F::infinity(), |m, f| m.min(f.strong_convexity()))
    }

    fn smoothness(&self) -> L::F
    {
        self.fns.iter().fold(L::F::zero(), |m, f| m.max(f.smoothness()))
    }

    fn conj_strong_convexity(&self) -> L::F
    {
        self.fns.iter().fold(L::F::infinity(), |m, f| m.min(f.conj_strong_convexity()))
    }

    fn conj_prox(&mut self, step: L::F, y: &mut L::Sl) -> Result<(), SolverError>
    {
        if y.len() != self.dim() {
            return Err(SolverError::InvalidOp);
        }

        for i in 0.. self.len() {
            let (offset, len) = self.block_range(i);
            splitm_mut!(y, (_y_done; offset), (y_i; len));
            self.fns[i].conj_prox(step, &mut y_i)?;
        }
        Ok(())
    }
}

//

#[test]
fn test_fn_sepsum1()
{
    use float_eq::assert_float_eq;
    use crate::{FloatGeneric, FnSqNorm};

    type L = FloatGeneric<f64>;

    let mut f = SeparableSum::<L>::new(vec![
        Box::new(FnSqNorm::<L>::new(1., vec![1.]).unwrap()),
        Box::new(FnSqNorm::<L>::new(4., vec![0., 2.]).unwrap()),
    ]).unwrap();

    assert_eq!(f.dim(), 3);
    assert_eq!(f.block_range(1), (1, 2));
    assert_float_eq!(f.conj_moduli(), vec![1., 0.25], abs_all <= 1e-12);
    assert_float_eq!(f.conj_strong_convexity(), 0.25, abs <= 1e-12);
    assert_float_eq!(f.value(&[0., 0., 0.]).unwrap(), 0.5 + 8., abs <= 1e-12);

    // whole conj_prox equals per-block conj_prox
    let y = &mut[1., 2., 3.];
    f.conj_prox(0.5, y).unwrap();
    let y0 = &mut[1.];
    let y1 = &mut[2., 3.];
    f.conj_prox_block(0, 0.5, y0).unwrap();
    f.conj_prox_block(1, 0.5, y1).unwrap();
    assert_float_eq!(y.as_ref(), [y0[0], y1[0], y1[1]].as_ref(), abs_all <= 1e-12);

    assert!(f.value(&[0., 0.]).is_err());
}
