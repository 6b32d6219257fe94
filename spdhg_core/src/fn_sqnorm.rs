use num_traits::{Float, One};
use core::marker::PhantomData;
use crate::solver::{LinAlg, SliceLike, ConvexFn, SolverError};
use crate::solver::check_step;

//

/// Squared distance
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\[
/// h(x) = \frac{a}{2} \\|x - b\\|_2^2,
/// \\]
/// strongly convex with \\(\mu = a\\) and smooth with Lipschitz constant \\(a\\).
/// Its conjugate \\(h^\*(y) = b^T y + \frac{1}{2a} \\|y\\|_2^2\\) has a closed-form prox as well.
pub struct FnSqNorm<L: LinAlg>
{
    ph_l: PhantomData<L>,
    a: L::F,
    b: Vec<L::F>,
}

impl<L: LinAlg> FnSqNorm<L>
{
    /// Creates an instance.
    ///
    /// Returns [`FnSqNorm`], or `Err` if `a` is not finite positive.
    /// * `a` is \\(a > 0\\).
    /// * `b` is the center \\(b\\), which also defines the dimension.
    pub fn new(a: L::F, b: Vec<L::F>) -> Result<Self, SolverError>
    {
        check_step(a)?;

        Ok(FnSqNorm {
            ph_l: PhantomData,
            a,
            b,
        })
    }
}

impl<L: LinAlg> ConvexFn<L> for FnSqNorm<L>
{
    fn dim(&self) -> usize
    {
        self.b.len()
    }

    fn value(&self, x: &L::Sl) -> Result<L::F, SolverError>
    {
        if x.len() != self.b.len() {
            return Err(SolverError::InvalidOp);
        }

        Ok(self.a * L::half_sqdist(x, &L::Sl::new_ref(&self.b)))
    }

    fn prox(&mut self, step: L::F, x: &mut L::Sl) -> Result<(), SolverError>
    {
        check_step(step)?;
        if x.len() != self.b.len() {
            return Err(SolverError::InvalidOp);
        }

        // (x + s a b) / (1 + s a)
        let sa = step * self.a;
        let c = (L::F::one() + sa).recip();
        for (e, b) in x.get_mut().iter_mut().zip(&self.b) {
            *e = (*e + sa * *b) * c;
        }

        Ok(())
    }

    fn strong_convexity(&self) -> L::F
    {
        self.a
    }

    fn smoothness(&self) -> L::F
    {
        self.a
    }

    fn conj_prox(&mut self, step: L::F, y: &mut L::Sl) -> Result<(), SolverError>
    {
        check_step(step)?;
        if y.len() != self.b.len() {
            return Err(SolverError::InvalidOp);
        }

        // (y - s b) / (1 + s / a)
        let c = (L::F::one() + step / self.a).recip();
        for (e, b) in y.get_mut().iter_mut().zip(&self.b) {
            *e = (*e - step * *b) * c;
        }

        Ok(())
    }
}

//

#[test]
fn test_fn_sqnorm1()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let mut f = FnSqNorm::<L>::new(2., vec![1., -1.]).unwrap();

    assert_float_eq!(f.value(&[0., 0.]).unwrap(), 2., abs <= 1e-12);
    assert_float_eq!(f.conj_strong_convexity(), 0.5, abs <= 1e-12);

    let x = &mut[3., 3.];
    f.prox(0.5, x).unwrap();
    assert_float_eq!(x.as_ref(), [2., 1.].as_ref(), abs_all <= 1e-12);

    // closed form agrees with the Moreau identity
    let y0 = [0.3, -0.7];
    let y = &mut y0.clone();
    f.conj_prox(0.8, y).unwrap();

    let w = &mut[y0[0] / 0.8, y0[1] / 0.8];
    f.prox(1. / 0.8, w).unwrap();
    let y_moreau = [y0[0] - 0.8 * w[0], y0[1] - 0.8 * w[1]];
    assert_float_eq!(y.as_ref(), y_moreau.as_ref(), abs_all <= 1e-12);

    assert!(f.prox(0., x).is_err());
    assert!(FnSqNorm::<L>::new(0., vec![0.]).is_err());
}
