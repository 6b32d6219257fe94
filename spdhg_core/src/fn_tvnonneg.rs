use num_traits::{Float, Zero, One};
use core::marker::PhantomData;
use crate::solver::{LinAlg, SliceLike, ConvexFn, SolverError};
use crate::solver::check_step;

//

/// Parameters of the inner prox solver of [`FnTVNonNeg`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProxParam<F: Float>
{
    /// Iteration number of the fast gradient projection.
    pub niter: usize,
    /// Relative change of the inner iterate to stop early, `0` to always run `niter` iterations.
    pub tol: F,
    /// Keep the dual variable between calls to warm-start the next one.
    pub warm_start: bool,
}

impl<F: Float> Default for ProxParam<F>
{
    fn default() -> Self
    {
        ProxParam {
            niter: 20,
            tol: F::zero(),
            warm_start: true,
        }
    }
}

//

/// Nonnegative total variation
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Regularizer of a row-major image \\(x\\) of `(rows, cols)` pixels:
/// \\[
/// h(x) = \alpha \sum_p \\|(Dx)_p\\|_2 + \iota_{x \ge 0}(x) + \frac{\mu}{2} \\|x\\|_2^2,
/// \\]
/// where \\(D\\) is the forward-difference gradient with zero differences at the last row and column.
///
/// The prox has no closed form.
/// It is computed by the fast gradient projection (FGP) of Beck and Teboulle on the dual of
/// \\(\min_{z \ge 0} \lambda \\|Dz\\|_{2,1} + \frac12 \\|z - v / c\\|_2^2\\)
/// with \\(c = 1 + s\mu\\), \\(\lambda = s\alpha / c\\),
/// which makes the result approximate up to [`ProxParam`].
pub struct FnTVNonNeg<L: LinAlg>
{
    ph_l: PhantomData<L>,
    shape: (usize, usize),
    alpha: L::F,
    mu: L::F,
    par: ProxParam<L::F>,
    p: Option<Vec<L::F>>,
}

impl<L: LinAlg> FnTVNonNeg<L>
{
    /// Creates an instance.
    ///
    /// Returns [`FnTVNonNeg`], or `Err` if `alpha` or `mu` is negative, or the shape is empty.
    /// * `shape` is the number of rows and columns.
    /// * `alpha` is \\(\alpha \ge 0\\).
    /// * `mu` is \\(\mu \ge 0\\).
    pub fn new(shape: (usize, usize), alpha: L::F, mu: L::F) -> Result<Self, SolverError>
    {
        let f0 = L::F::zero();

        if shape.0 == 0 || shape.1 == 0 {
            log::error!("Empty image shape {:?}", shape);
            return Err(SolverError::InvalidOp);
        }
        if !(alpha >= f0 && alpha.is_finite()) || !(mu >= f0 && mu.is_finite()) {
            log::error!("alpha and mu must be nonnegative");
            return Err(SolverError::OutOfDomain);
        }

        Ok(FnTVNonNeg {
            ph_l: PhantomData,
            shape,
            alpha,
            mu,
            par: ProxParam::default(),
            p: None,
        })
    }

    /// Changes inner solver parameters.
    ///
    /// Returns [`FnTVNonNeg`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut ProxParam<L::F>)
    {
        f(&mut self.par);
        self
    }

    /// Inner solver parameters.
    pub fn prox_param(&self) -> &ProxParam<L::F>
    {
        &self.par
    }

    /// Forgets the warm-start dual variable, so that the next prox starts from zero.
    pub fn reset_warm_start(&mut self)
    {
        self.p = None;
    }

    /// Calculates the isotropic total variation \\(\sum_p \\|(Dx)_p\\|_2\\).
    pub fn total_variation(&self, x: &[L::F]) -> L::F
    {
        let n = x.len();
        let mut d = vec![L::F::zero(); 2 * n];
        self.grad(x, &mut d);

        let (d0, d1) = d.split_at(n);
        d0.iter().zip(d1).fold(L::F::zero(), |s, (a, b)| s + a.hypot(*b))
    }

    // d = (d0, d1) = Dx
    fn grad(&self, x: &[L::F], d: &mut[L::F])
    {
        let (rows, cols) = self.shape;
        let n = rows * cols;
        let (d0, d1) = d.split_at_mut(n);

        for r in 0.. rows {
            for c in 0.. cols {
                let i = r * cols + c;
                d0[i] = if r + 1 < rows {x[i + cols] - x[i]} else {L::F::zero()};
                d1[i] = if c + 1 < cols {x[i + 1] - x[i]} else {L::F::zero()};
            }
        }
    }

    // x = alpha D^T p + beta x
    fn grad_adj(&self, alpha: L::F, p: &[L::F], beta: L::F, x: &mut[L::F])
    {
        let (rows, cols) = self.shape;
        let n = rows * cols;
        let (p0, p1) = p.split_at(n);

        for e in x.iter_mut() {
            *e = beta * *e;
        }
        for r in 0.. rows {
            for c in 0.. cols {
                let i = r * cols + c;
                if r + 1 < rows {
                    x[i + cols] = x[i + cols] + alpha * p0[i];
                    x[i] = x[i] - alpha * p0[i];
                }
                if c + 1 < cols {
                    x[i + 1] = x[i + 1] + alpha * p1[i];
                    x[i] = x[i] - alpha * p1[i];
                }
            }
        }
    }

    // z = max(b - lambda D^T q, 0)
    fn primal_of(&self, lambda: L::F, b: &[L::F], q: &[L::F], z: &mut[L::F])
    {
        z.copy_from_slice(b);
        self.grad_adj(-lambda, q, L::F::one(), z);
        for e in z.iter_mut() {
            *e = e.max(L::F::zero());
        }
    }

    // pixelwise projection onto the unit ball
    fn proj_dual(p: &mut[L::F])
    {
        let n = p.len() / 2;
        let (p0, p1) = p.split_at_mut(n);

        for (a, b) in p0.iter_mut().zip(p1.iter_mut()) {
            let nrm = a.hypot(*b);
            if nrm > L::F::one() {
                *a = *a / nrm;
                *b = *b / nrm;
            }
        }
    }

    fn fgp(&mut self, lambda: L::F, b: &[L::F], z: &mut[L::F])
    {
        let f1 = L::F::one();
        let f2 = f1 + f1;
        let f4 = f2 + f2;
        let f8 = f4 + f4;
        let n = b.len();

        let mut p = match self.p.take() {
            Some(p) if self.par.warm_start && p.len() == 2 * n => p,
            _ => vec![L::F::zero(); 2 * n],
        };
        let mut q = p.clone();
        let mut p_prev = vec![L::F::zero(); 2 * n];
        let mut z_prev = vec![L::F::zero(); n];
        let mut t = f1;
        let step = (f8 * lambda).recip();

        self.primal_of(lambda, b, &q, z);

        for k in 0.. self.par.niter {
            // p = P(q + D z(q) / (8 lambda))
            p_prev.copy_from_slice(&p);
            self.grad(z, &mut p);
            for (e, qe) in p.iter_mut().zip(&q) {
                *e = *qe + step * *e;
            }
            Self::proj_dual(&mut p);

            let t_next = (f1 + (f1 + f4 * t * t).sqrt()) / f2;
            let w = (t - f1) / t_next;
            for ((qe, pe), pp) in q.iter_mut().zip(&p).zip(&p_prev) {
                *qe = *pe + w * (*pe - *pp);
            }
            t = t_next;

            z_prev.copy_from_slice(z);
            self.primal_of(lambda, b, &q, z);

            if self.par.tol > L::F::zero() {
                let mut dz = L::F::zero();
                let mut nz = L::F::zero();
                for (a, c) in z.iter().zip(&z_prev) {
                    dz = dz + (*a - *c).powi(2);
                    nz = nz + (*a).powi(2);
                }
                if dz.sqrt() <= self.par.tol * nz.sqrt() {
                    log::trace!("fgp converged at {}", k);
                    break;
                }
            }
        }

        self.primal_of(lambda, b, &p, z);

        if self.par.warm_start {
            self.p = Some(p);
        }
    }
}

impl<L: LinAlg> ConvexFn<L> for FnTVNonNeg<L>
{
    fn dim(&self) -> usize
    {
        self.shape.0 * self.shape.1
    }

    fn value(&self, x: &L::Sl) -> Result<L::F, SolverError>
    {
        if x.len() != self.dim() {
            return Err(SolverError::InvalidOp);
        }

        let x = x.get_ref();
        if x.iter().any(|e| *e < L::F::zero()) {
            return Err(SolverError::OutOfDomain);
        }

        let f2 = L::F::one() + L::F::one();
        let sq = x.iter().fold(L::F::zero(), |s, e| s + *e * *e);
        Ok(self.alpha * self.total_variation(x) + self.mu * sq / f2)
    }

    fn prox(&mut self, step: L::F, x: &mut L::Sl) -> Result<(), SolverError>
    {
        check_step(step)?;
        if x.len() != self.dim() {
            return Err(SolverError::InvalidOp);
        }

        let c = L::F::one() + step * self.mu;
        let lambda = step * self.alpha / c;

        let b: Vec<L::F> = x.get_ref().iter().map(|e| *e / c).collect();
        let z = x.get_mut();

        if lambda > L::F::zero() {
            self.fgp(lambda, &b, z);
        }
        else {
            for (e, be) in z.iter_mut().zip(&b) {
                *e = be.max(L::F::zero());
            }
        }

        Ok(())
    }

    fn strong_convexity(&self) -> L::F
    {
        self.mu
    }
}

//

#[test]
fn test_fn_tvnonneg1()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let mut f = FnTVNonNeg::<L>::new((2, 3), 0.5, 1.).unwrap();

    let x = [
        1., 1., 2.,
        0., 1., 2.,
    ];
    // |Dx| per pixel: (1,0) (0,1) (0,0) ; (0,1) (0,1) (0,0)
    assert_float_eq!(f.total_variation(&x), 4., abs <= 1e-12);
    assert_float_eq!(f.value(&x).unwrap(), 0.5 * 4. + 0.5 * 11., abs <= 1e-12);
    assert_eq!(f.value(&[0., 0., 0., -1., 0., 0.]).err(), Some(SolverError::OutOfDomain));

    // adjoint of the discrete gradient
    let u = [0.3, -1.2, 0.5, 2., 0.1, -0.4, 0.7, 1.1, -0.6, 0.2, 0.9, -0.8];
    let mut du = [0.; 12];
    f.grad(&x, &mut du);
    let lhs: f64 = du.iter().zip(&u).map(|(a, b)| a * b).sum();
    let mut dtu = [0.; 6];
    f.grad_adj(1., &u, 0., &mut dtu);
    let rhs: f64 = dtu.iter().zip(&x).map(|(a, b)| a * b).sum();
    assert_float_eq!(lhs, rhs, abs <= 1e-12);

    // constant image: TV vanishes, prox reduces to scaling and clipping
    let z = &mut[2., 2., 2., 2., 2., 2.];
    f.prox(1., z).unwrap();
    assert_float_eq!(z.as_ref(), [1.; 6].as_ref(), abs_all <= 1e-9);

    let z = &mut[-2.; 6];
    f.prox(1., z).unwrap();
    assert_float_eq!(z.as_ref(), [0.; 6].as_ref(), abs_all <= 1e-12);

    // prox reduces the objective s h(z) + |z - v|^2 / 2 relative to v clipped
    f.reset_warm_start();
    let f_inner = FnTVNonNeg::<L>::new((2, 3), 0.5, 1.).unwrap();
    let mut f = f.par(|p| p.niter = 200);
    let v = [3., 0., 2., -1., 4., 1.];
    let z = &mut v.clone();
    f.prox(0.5, z).unwrap();
    assert!(z.iter().all(|e| *e >= 0.));
    let obj = |w: &[f64]| {
        0.5 * f_inner.value(w).unwrap()
        + w.iter().zip(&v).map(|(a, b)| (a - b).powi(2)).sum::<f64>() / 2.
    };
    let v_clip: Vec<f64> = v.iter().map(|e| e.max(0.)).collect();
    assert!(obj(&z[..]) < obj(&v_clip));
}
