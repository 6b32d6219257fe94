use float_eq::assert_float_eq;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use spdhg_core::solver::*;
use spdhg_core::*;

type La = FloatGeneric<f64>;

type AMatBuild = MatBuild<La>;
type AProblem = Problem<La, AMatBuild, FnSqNorm<La>>;
type ASolver = Solver<La>;

//

/// Records the objective value and the primal point at every iteration.
struct Recorder
{
    objs: Vec<f64>,
    xs: Vec<Vec<f64>>,
}

impl Observer<La> for Recorder
{
    fn on_iteration(&mut self, k: usize, state: &IterateState<f64>, obj: &dyn Objective<La>)
    {
        assert_eq!(k, self.objs.len());
        self.objs.push(obj.objective(&state.x).unwrap());
        self.xs.push(state.x.clone());
    }
}

impl Recorder
{
    fn new() -> Self
    {
        Recorder {objs: Vec::new(), xs: Vec::new()}
    }
}

// sum_i (1/2)|A_i x - b_i|^2 + (1/2)|x|^2
fn least_squares(mats: &[[f64; 4]], bs: &[[f64; 2]]) -> AProblem
{
    let ops = mats.iter().map(|m| AMatBuild::new((2, 2)).iter_rowmaj(*m)).collect();
    let fns: Vec<Box<dyn ConvexFn<La>>> = bs.iter().map(|b| {
        Box::new(FnSqNorm::<La>::new(1., b.to_vec()).unwrap()) as Box<dyn ConvexFn<La>>
    }).collect();

    Problem::new(
        BlockOp::new(ops).unwrap(),
        SeparableSum::new(fns).unwrap(),
        FnSqNorm::new(1., vec![0., 0.]).unwrap(),
    ).unwrap()
}

// closed-form minimizer of least_squares: (A^T A + I) x = A^T b
fn least_squares_opt(mats: &[[f64; 4]], bs: &[[f64; 2]]) -> [f64; 2]
{
    let mut m = [[1., 0.], [0., 1.]];
    let mut r = [0., 0.];
    for (a, b) in mats.iter().zip(bs) {
        for row in 0.. 2 {
            for i in 0.. 2 {
                r[i] += a[row * 2 + i] * b[row];
                for j in 0.. 2 {
                    m[i][j] += a[row * 2 + i] * a[row * 2 + j];
                }
            }
        }
    }
    let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
    [
        (m[1][1] * r[0] - m[0][1] * r[1]) / det,
        (m[0][0] * r[1] - m[1][0] * r[0]) / det,
    ]
}

fn configure(prob: &AProblem, alg: Algorithm, niter: usize) -> AlgorithmConfig<f64>
{
    let mut rng = Xoshiro256StarStar::seed_from_u64(1807);
    let part = Partition::new(prob.op_a().len(), alg.norm_nsub()).unwrap();
    let norms = prob.op_a().subset_norms(&part, &NormEstParam::default(), &mut rng).unwrap();

    calibrate(alg, &prob.moduli(), &norms, 0.99, niter).unwrap()
}

fn run(prob: &mut AProblem, cfg: &AlgorithmConfig<f64>, seed: u64, rec: &mut Recorder) -> IterateState<f64>
{
    let mut sampler = Sampler::new(Xoshiro256StarStar::seed_from_u64(seed), cfg.prob_subset()).unwrap();
    let state = IterateState::zero(prob.op_a().size());
    let observers: &mut [&mut dyn Observer<La>] = &mut [rec];

    ASolver::new().par(|p| {p.log_period = 100})
    .solve((prob, cfg, &mut sampler, observers), state)
    .unwrap()
}

const MATS: [[f64; 4]; 2] = [
    [1., 2.,
     0., 1.],
    [1., 0.,
     1., 1.],
];
const BS: [[f64; 2]; 2] = [[1., 2.], [0., -1.]];

//

#[test]
fn test_two_block_least_squares()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut prob = least_squares(&MATS, &BS);
    let moduli = prob.moduli();
    assert_float_eq!(moduli.mu_g, 1., abs <= 0.);
    assert_float_eq!(moduli.mu_i, vec![1., 1.], abs_all <= 0.);

    let cfg = configure(&prob, Algorithm::UniformStochastic(2), 1000);
    let mut rec = Recorder::new();
    let sol = run(&mut prob, &cfg, 42, &mut rec);

    let x_opt = least_squares_opt(&MATS, &BS);
    let d = ((sol.x[0] - x_opt[0]).powi(2) + (sol.x[1] - x_opt[1]).powi(2)).sqrt();
    assert!(d < 1e-6, "|x - x*| = {:e}", d);

    assert_eq!(rec.objs.len(), 1001);
}

#[test]
fn test_all_variants_converge()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let x_opt = least_squares_opt(&MATS, &BS);

    for alg in [Algorithm::Deterministic, Algorithm::UniformStochastic(2), Algorithm::Pesquet(2)] {
        let mut prob = least_squares(&MATS, &BS);
        let cfg = configure(&prob, alg, 2000);
        let mut rec = Recorder::new();
        let sol = run(&mut prob, &cfg, 7, &mut rec);

        assert_float_eq!(sol.x.as_slice(), x_opt.as_ref(), abs_all <= 1e-6);

        // saddle point: y_i = A_i x - b_i
        let ax = prob.forward(&sol.x);
        for (i, b) in BS.iter().enumerate() {
            for r in 0.. 2 {
                assert_float_eq!(sol.y[i * 2 + r], ax[i * 2 + r] - b[r], abs <= 1e-6);
            }
        }
    }
}

#[test]
fn test_reproducible()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let trajectory = |seed| {
        let mut prob = least_squares(&MATS, &BS);
        let cfg = configure(&prob, Algorithm::UniformStochastic(2), 50);
        let mut rec = Recorder::new();
        let sol = run(&mut prob, &cfg, seed, &mut rec);
        (sol, rec.xs, rec.objs)
    };

    let (s1, xs1, objs1) = trajectory(42);
    let (s2, xs2, objs2) = trajectory(42);
    assert_eq!(s1, s2);
    assert_eq!(xs1, xs2);
    assert_eq!(objs1, objs2);

    let (_, xs3, _) = trajectory(43);
    assert_ne!(xs1, xs3);
}

#[test]
fn test_deterministic_monotone()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let c = 0.15;
    let mats: Vec<[f64; 4]> = MATS.iter().map(|m| [c * m[0], c * m[1], c * m[2], c * m[3]]).collect();

    let mut prob = least_squares(&mats, &BS);
    let cfg = configure(&prob, Algorithm::Deterministic, 300);
    let mut rec = Recorder::new();
    run(&mut prob, &cfg, 0, &mut rec);

    let x_opt = least_squares_opt(&mats, &BS);
    let obj_opt = prob.objective(&x_opt).unwrap();

    let gap: Vec<f64> = rec.objs.iter().map(|o| o - obj_opt).collect();
    for k in 1.. gap.len() {
        assert!(gap[k] <= gap[k - 1] + 1e-12, "gap increased at {}: {:e} -> {:e}", k, gap[k - 1], gap[k]);
    }
    assert!(gap[300] < 1e-10 * gap[0]);
}

#[test]
fn test_unbiased_extrapolation()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mats = [
        [1., 2., 0., 1.],
        [1., 0., 1., 1.],
        [0.5, -1., 2., 0.3],
    ];
    let bs = [[1., 2.], [0., -1.], [3., 0.5]];
    let mut prob = least_squares(&mats, &bs);
    let cfg = configure(&prob, Algorithm::UniformStochastic(3), 1);
    let theta = cfg.theta().unwrap();

    let state = IterateState {
        x: vec![0.5, -0.2],
        y: vec![0.1, -0.3, 0.7, 0.2, -0.4, 0.6],
    };

    // per subset: the increment of z and the extrapolation correction of zbar
    let mut dz_sum = [0.; 2];
    let mut corr = Vec::new();
    for j in 0.. 3 {
        let mut core = PrimalDual::new(&mut prob, &cfg, state.clone()).unwrap();
        let z0 = core.z().to_vec();
        core.step(j).unwrap();

        for r in 0.. 2 {
            dz_sum[r] += core.z()[r] - z0[r];
        }
        corr.push([
            (core.zbar()[0] - core.z()[0]) / theta,
            (core.zbar()[1] - core.z()[1]) / theta,
        ]);
    }

    // exact expectation over the selection equals the full-update increment
    let mut expect = [0.; 2];
    for (j, c) in corr.iter().enumerate() {
        for r in 0.. 2 {
            expect[r] += cfg.prob_subset()[j] * c[r];
        }
    }
    assert_float_eq!(expect.as_ref(), dz_sum.as_ref(), abs_all <= 1e-12);

    // Monte Carlo average over sampled selections
    let ndraw = 20_000;
    let mut sampler = Sampler::new(Xoshiro256StarStar::seed_from_u64(42), cfg.prob_subset()).unwrap();
    let mut avg = [0.; 2];
    for k in 0.. ndraw {
        let j = sampler.select(k);
        for r in 0.. 2 {
            avg[r] += corr[j][r] / ndraw as f64;
        }
    }
    let scale = corr.iter().flat_map(|c| c.iter()).fold(0_f64, |m, v| m.max(v.abs()));
    assert_float_eq!(avg.as_ref(), dz_sum.as_ref(), abs_all <= 0.05 * scale);
}

#[test]
fn test_size_mismatch()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut prob = least_squares(&MATS, &BS);
    let cfg = configure(&prob, Algorithm::Deterministic, 1);

    let state = IterateState::zero((3, 2));
    assert!(PrimalDual::new(&mut prob, &cfg, state).is_err());

    let cfg3 = calibrate(Algorithm::UniformStochastic(3), &Moduli {mu_g: 1., mu_i: vec![1.; 3]}, &[1.; 3], 0.99, 1).unwrap();
    let state = IterateState::zero(prob.op_a().size());
    assert!(PrimalDual::new(&mut prob, &cfg3, state).is_err());
}

#[test]
fn test_pesquet_step_reads_new_iterate()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut prob = least_squares(&MATS, &BS);
    let cfg = configure(&prob, Algorithm::Pesquet(2), 1);
    assert!(cfg.theta().is_none());
    let tau = cfg.tau();
    let sigma = cfg.sigma()[0];

    let state = IterateState {
        x: vec![0.5, -0.2],
        y: vec![0.1, -0.3, 0.7, 0.2],
    };

    // x1 = prox_{tau g}(x0 - tau A^T y0), g = (1/2)|x|^2
    let z0 = prob.adjoint(&state.y);
    let x1: Vec<f64> = state.x.iter().zip(&z0).map(|(x, z)| (x - tau * z) / (1. + tau)).collect();

    // y_0 = prox_{sigma f_0^*}(y_0 + sigma A_0 x1), f_0^*(w) = (1/2)|w|^2 + b_0^T w
    let ax1 = prob.forward(&x1);
    let y0_expect: Vec<f64> = (0.. 2).map(|r| {
        (state.y[r] + sigma * ax1[r] - sigma * BS[0][r]) / (1. + sigma)
    }).collect();

    let mut core = PrimalDual::new(&mut prob, &cfg, state.clone()).unwrap();
    core.step(0).unwrap();

    assert_float_eq!(core.state().x.as_slice(), x1.as_slice(), abs_all <= 1e-12);
    assert_float_eq!(&core.state().y[0.. 2], y0_expect.as_slice(), abs_all <= 1e-12);
    // other block untouched
    assert_float_eq!(&core.state().y[2.. 4], &state.y[2.. 4], abs_all <= 0.);
    // no extrapolation
    assert_float_eq!(core.zbar(), core.z(), abs_all <= 0.);
}
