use num_traits::{Zero, One};
use crate::solver::{LinAlg, SliceLike, Operator, ConvexFn, Objective, SolverError};
use crate::{BlockOp, SeparableSum, Moduli};

//

/// Composite problem
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\[
/// \min_x f(Ax) + g(x), \quad f(y) = \sum_i f_i(y_i),
/// \\]
/// with \\(A\\) a [`BlockOp`] of blocks \\(A_i\\) and \\(f\\) a [`SeparableSum`] of the same block structure.
pub struct Problem<L, O, G>
where L: LinAlg, O: Operator<L>, G: ConvexFn<L>
{
    op_a: BlockOp<L, O>,
    f: SeparableSum<L>,
    g: G,
}

impl<L, O, G> Problem<L, O, G>
where L: LinAlg, O: Operator<L>, G: ConvexFn<L>
{
    /// Creates an instance.
    ///
    /// Returns [`Problem`], or `Err` with [`SolverError::InvalidOp`]
    /// if block numbers or dimensions of `op_a`, `f` and `g` mismatch.
    pub fn new(op_a: BlockOp<L, O>, f: SeparableSum<L>, g: G) -> Result<Self, SolverError>
    {
        if op_a.len() != f.len() {
            log::error!("{} operator blocks, {} terms", op_a.len(), f.len());
            return Err(SolverError::InvalidOp);
        }
        for i in 0.. op_a.len() {
            if op_a.block_range(i).1 != f.block_range(i).1 {
                log::error!("Size mismatch at block {}: {} rows, term of dim {}", i, op_a.block_range(i).1, f.block_range(i).1);
                return Err(SolverError::InvalidOp);
            }
        }
        if op_a.size().1 != g.dim() {
            log::error!("Size mismatch: {} columns, regularizer of dim {}", op_a.size().1, g.dim());
            return Err(SolverError::InvalidOp);
        }

        Ok(Problem {
            op_a,
            f,
            g,
        })
    }

    /// Operator \\(A\\).
    pub fn op_a(&self) -> &BlockOp<L, O>
    {
        &self.op_a
    }

    /// Data term \\(f\\).
    pub fn f(&self) -> &SeparableSum<L>
    {
        &self.f
    }

    /// Regularizer \\(g\\).
    pub fn g(&self) -> &G
    {
        &self.g
    }

    /// Mutable regularizer, for example to reset the warm start of its inner solver.
    pub fn g_mut(&mut self) -> &mut G
    {
        &mut self.g
    }

    pub(crate) fn parts_mut(&mut self) -> (&BlockOp<L, O>, &mut SeparableSum<L>, &mut G)
    {
        (&self.op_a, &mut self.f, &mut self.g)
    }

    /// Strong convexity moduli \\(\mu_g\\) of \\(g\\) and \\(\mu_i\\) of each \\(f_i^\*\\).
    pub fn moduli(&self) -> Moduli<L::F>
    {
        Moduli {
            mu_g: self.g.strong_convexity(),
            mu_i: self.f.conj_moduli(),
        }
    }

    /// Calculates \\(Ax\\).
    pub fn forward(&self, x: &[L::F]) -> Vec<L::F>
    {
        let mut y = vec![L::F::zero(); self.op_a.size().0];
        self.op_a.op(L::F::one(), &L::Sl::new_ref(x), L::F::zero(), &mut L::Sl::new_mut(&mut y));
        y
    }

    /// Calculates \\(A^T y\\).
    pub fn adjoint(&self, y: &[L::F]) -> Vec<L::F>
    {
        let mut x = vec![L::F::zero(); self.op_a.size().1];
        self.op_a.trans_op(L::F::one(), &L::Sl::new_ref(y), L::F::zero(), &mut L::Sl::new_mut(&mut x));
        x
    }
}

impl<L, O, G> Objective<L> for Problem<L, O, G>
where L: LinAlg, O: Operator<L>, G: ConvexFn<L>
{
    fn objective(&self, x: &L::Sl) -> Result<L::F, SolverError>
    {
        if x.len() != self.op_a.size().1 {
            return Err(SolverError::InvalidOp);
        }

        let ax = self.forward(x.get_ref());
        let val_f = self.f.value(&L::Sl::new_ref(&ax))?;
        let val_g = self.g.value(x)?;
        Ok(val_f + val_g)
    }
}
