use num_traits::{Float, Zero, One};
use core::marker::PhantomData;
use crate::solver::{LinAlg, SliceLike, ConvexFn, SolverError};
use crate::solver::check_step;

//

/// Smoothed Kullback-Leibler divergence
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Data term of a Poisson measurement \\(b \ge 0\\) with background \\(r > 0\\), summed over elements:
/// \\[
/// h(x) = \sum_j \phi_j(x_j), \quad
/// \phi_j(t) = \left\lbrace \begin{array}{ll}
/// t + r_j - b_j + b_j \log \frac{b_j}{t + r_j} & (t \ge 0) \\\\
/// \phi_j(0) + \phi_j'(0) t + \frac12 \phi_j''(0) t^2 & (t < 0)
/// \end{array} \right.
/// \\]
/// with \\(\phi_j'(0) = 1 - b_j / r_j\\) and \\(\phi_j''(0) = b_j / r_j^2\\).
/// The quadratic continuation makes \\(h\\) finite and smooth everywhere,
/// with Lipschitz constant \\(\max_j b_j / r_j^2\\) of \\(\nabla h\\),
/// hence \\(h^\*\\) is strongly convex with modulus \\(\min_j r_j^2 / b_j\\).
pub struct FnKLSmooth<L: LinAlg>
{
    ph_l: PhantomData<L>,
    data: Vec<L::F>,
    background: Vec<L::F>,
}

impl<L: LinAlg> FnKLSmooth<L>
{
    /// Creates an instance.
    ///
    /// Returns [`FnKLSmooth`], or `Err` with [`SolverError::OutOfDomain`]
    /// if an element of `data` is negative or an element of `background` is not positive,
    /// or with [`SolverError::InvalidOp`] if their lengths differ.
    /// * `data` is \\(b\\).
    /// * `background` is \\(r\\).
    pub fn new(data: Vec<L::F>, background: Vec<L::F>) -> Result<Self, SolverError>
    {
        if data.len() != background.len() {
            log::error!("data length {} and background length {} differ", data.len(), background.len());
            return Err(SolverError::InvalidOp);
        }
        if data.iter().any(|b| !(*b >= L::F::zero()) || !b.is_finite()) {
            log::error!("data must be nonnegative");
            return Err(SolverError::OutOfDomain);
        }
        if background.iter().any(|r| !(*r > L::F::zero()) || !r.is_finite()) {
            log::error!("background must be positive");
            return Err(SolverError::OutOfDomain);
        }

        Ok(FnKLSmooth {
            ph_l: PhantomData,
            data,
            background,
        })
    }

    /// Data \\(b\\).
    pub fn data(&self) -> &[L::F]
    {
        &self.data
    }

    /// Background \\(r\\).
    pub fn background(&self) -> &[L::F]
    {
        &self.background
    }

    fn phi(t: L::F, b: L::F, r: L::F) -> L::F
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let f2 = f1 + f1;

        let blog = |u: L::F| if b > f0 {b * (b / u).ln()} else {f0};

        if t >= f0 {
            t + r - b + blog(t + r)
        }
        else {
            let phi0 = r - b + blog(r);
            let d1 = f1 - b / r;
            let d2 = b / (r * r);
            phi0 + d1 * t + d2 * t * t / f2
        }
    }

    fn prox_elem(s: L::F, v: L::F, b: L::F, r: L::F) -> L::F
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let f2 = f1 + f1;
        let f4 = f2 + f2;

        // root of (z - v + s)(z + r) = s b on z >= 0
        let q = r + s - v;
        let disc = (s - v - r).powi(2) + f4 * s * b;
        let z = (disc.sqrt() - q) / f2;
        if z >= f0 {
            z
        }
        else {
            // stationary point of the quadratic continuation
            (v - s * (f1 - b / r)) / (f1 + s * b / (r * r))
        }
    }
}

impl<L: LinAlg> ConvexFn<L> for FnKLSmooth<L>
{
    fn dim(&self) -> usize
    {
        self.data.len()
    }

    fn value(&self, x: &L::Sl) -> Result<L::F, SolverError>
    {
        if x.len() != self.data.len() {
            return Err(SolverError::InvalidOp);
        }

        let mut sum = L::F::zero();
        for ((t, b), r) in x.get_ref().iter().zip(&self.data).zip(&self.background) {
            sum = sum + Self::phi(*t, *b, *r);
        }
        Ok(sum)
    }

    fn prox(&mut self, step: L::F, x: &mut L::Sl) -> Result<(), SolverError>
    {
        check_step(step)?;
        if x.len() != self.data.len() {
            return Err(SolverError::InvalidOp);
        }

        for ((e, b), r) in x.get_mut().iter_mut().zip(&self.data).zip(&self.background) {
            *e = Self::prox_elem(step, *e, *b, *r);
        }

        Ok(())
    }

    fn strong_convexity(&self) -> L::F
    {
        L::F::zero()
    }

    fn smoothness(&self) -> L::F
    {
        self.data.iter().zip(&self.background)
            .fold(L::F::zero(), |m, (b, r)| m.max(*b / (*r * *r)))
    }
}

//

#[test]
fn test_fn_klsmooth1()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let b = vec![2., 0., 5.];
    let r = vec![1., 0.5, 2.];
    let mut f = FnKLSmooth::<L>::new(b.clone(), r.clone()).unwrap();

    assert_float_eq!(f.smoothness(), 2., abs <= 1e-12);
    assert_float_eq!(f.conj_strong_convexity(), 0.5, abs <= 1e-12);

    // phi(b - r) = 0 at the minimizer of each element with b > r
    assert_float_eq!(f.value(&[1., 0., 3.]).unwrap(), 0.5, abs <= 1e-12);

    // continuity and C1 at 0
    let eps = 1e-7;
    let v_m = f.value(&[-eps, -eps, -eps]).unwrap();
    let v_0 = f.value(&[0., 0., 0.]).unwrap();
    let v_p = f.value(&[eps, eps, eps]).unwrap();
    assert_float_eq!(v_m, v_0, abs <= 1e-6);
    assert_float_eq!((v_p - v_0) / eps, (v_0 - v_m) / eps, abs <= 1e-5);

    // prox optimality: s h'(z) + z - v = 0, on both branches
    let s = 0.7;
    let v = [-3., 0.4, 2.5];
    let z = &mut v.clone();
    f.prox(s, z).unwrap();
    for j in 0.. 3 {
        let grad = if z[j] >= 0. {
            1. - b[j] / (z[j] + r[j])
        }
        else {
            1. - b[j] / r[j] + b[j] / (r[j] * r[j]) * z[j]
        };
        assert_float_eq!(s * grad + z[j] - v[j], 0., abs <= 1e-10);
    }
    assert!(z[0] < 0.);

    assert_eq!(FnKLSmooth::<L>::new(vec![-1.], vec![1.]).err(), Some(SolverError::OutOfDomain));
    assert_eq!(FnKLSmooth::<L>::new(vec![1.], vec![0.]).err(), Some(SolverError::OutOfDomain));
}
