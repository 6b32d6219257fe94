use float_eq::assert_float_eq;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use spdhg_core::solver::*;
use spdhg_core::*;

//

fn moduli(mu_g: f64, mu_i: &[f64]) -> Moduli<f64>
{
    Moduli {
        mu_g,
        mu_i: mu_i.to_vec(),
    }
}

#[test]
fn test_calibrate_deterministic()
{
    let _ = env_logger::builder().is_test(true).try_init();

    for (mu_g, mu_f, norm) in [(1., 1., 1.), (0.5, 2., 10.), (1e-2, 3., 0.1), (4., 1e-3, 250.)] {
        let m = moduli(mu_g, &[mu_f * 2., mu_f, mu_f * 5.]);
        let cfg = calibrate(Algorithm::Deterministic, &m, &[norm], 0.99, 10).unwrap();
        let kappa = cfg.kappa().unwrap();

        assert_float_eq!(cfg.tau() * mu_g * (kappa - 1.), 1., rmax <= 1e-12);
        for s in cfg.sigma() {
            assert_float_eq!(s * mu_f * (kappa - 1.), 1., rmax <= 1e-12);
        }
        assert_float_eq!(cfg.theta().unwrap(), 1. - 2. / (1. + kappa), rmax <= 1e-12);
        assert_eq!(cfg.prob_subset(), &[1.]);
        assert_eq!(cfg.prob(), &[1., 1., 1.]);
        assert_eq!(cfg.partition().nsub(), 1);
    }
}

#[test]
fn test_calibrate_uniform()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mu_i = [1., 2., 0.5, 4., 1.5];
    let m = moduli(0.7, &mu_i);
    let norms = [3., 1., 2.];
    let cfg = calibrate(Algorithm::UniformStochastic(3), &m, &norms, 0.9, 30).unwrap();

    // subsets {0, 3}, {1, 4}, {2}: mu_j = 1, 1.5, 0.5
    let kappa = |norm: f64, mu: f64| (1. + norm * norm / (0.7 * mu) / 0.81).sqrt();
    let kappa_max = kappa(3., 1.).max(kappa(1., 1.5)).max(kappa(2., 0.5));
    assert_float_eq!(cfg.kappa().unwrap(), kappa_max, rmax <= 1e-12);

    let n = 3.;
    assert_float_eq!(cfg.tau() * 0.7 * (n * kappa_max + n - 2.), 1., rmax <= 1e-12);
    for (s, mu) in cfg.sigma().iter().zip(&mu_i) {
        assert_float_eq!(s * mu * (kappa_max - 1.), 1., rmax <= 1e-12);
    }
    assert_float_eq!(cfg.theta().unwrap(), 1. - 2. / (n + n * kappa_max), rmax <= 1e-12);
    assert_eq!(cfg.niter(), 30);
    assert_eq!(cfg.alg().name(), "spdhg_uni3");
}

#[test]
fn test_calibrate_pesquet_global_norm()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // zero moduli are fine for the non-accelerated variant
    let m = moduli(0., &[0.; 6]);

    assert_eq!(Algorithm::Pesquet(3).norm_nsub(), 1);
    assert_eq!(Algorithm::UniformStochastic(3).norm_nsub(), 3);

    let cfg = calibrate(Algorithm::Pesquet(3), &m, &[4.], 0.99, 5).unwrap();
    assert_float_eq!(cfg.tau(), 0.99 / 4., rmax <= 1e-15);
    assert_float_eq!(cfg.sigma(), [0.99 / 4.; 6].as_ref(), rmax_all <= 1e-15);
    assert_eq!(cfg.theta(), None);
    assert_eq!(cfg.partition().nsub(), 3);

    // per-subset norms are rejected: the step condition takes the global bound
    assert_eq!(
        calibrate(Algorithm::Pesquet(3), &m, &[2., 2., 2.], 0.99, 5).err(),
        Some(SolverError::Config(ConfigError::NormCount))
    );
}

#[test]
fn test_global_norm_bounds_subset_norms()
{
    type La = FloatGeneric<f64>;

    let blocks: Vec<MatBuild<La>> = (0.. 4).map(|i| {
        MatBuild::new((2, 3)).by_fn(|r, c| ((i + 1) * (r + 2 * c + 1)) as f64 / 7.)
    }).collect();
    let op = BlockOp::<La, _>::new(blocks).unwrap();
    let par = NormEstParam {max_iter: 500, tol: 1e-12, margin: 1.};

    let mut rng = Xoshiro256StarStar::seed_from_u64(1807);
    let global = op.subset_norms(&Partition::new(4, 1).unwrap(), &par, &mut rng).unwrap();
    let subs = op.subset_norms(&Partition::new(4, 2).unwrap(), &par, &mut rng).unwrap();

    assert_eq!(global.len(), 1);
    assert_eq!(subs.len(), 2);
    for s in subs {
        assert!(s <= global[0] * (1. + 1e-9));
    }
}

#[test]
fn test_calibrate_errors()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let cfg_err = |alg, m: &Moduli<f64>, norms: &[f64], rho| calibrate(alg, m, norms, rho, 1).err();

    let zero_mu = Some(SolverError::Config(ConfigError::ZeroStrongConvexity));
    assert_eq!(cfg_err(Algorithm::Deterministic, &moduli(0., &[1., 1.]), &[1.], 0.99), zero_mu);
    assert_eq!(cfg_err(Algorithm::Deterministic, &moduli(1., &[1., 0.]), &[1.], 0.99), zero_mu);
    assert_eq!(cfg_err(Algorithm::UniformStochastic(2), &moduli(1., &[1., 0.]), &[1., 1.], 0.99), zero_mu);
    assert_eq!(cfg_err(Algorithm::UniformStochastic(2), &moduli(1., &[1., f64::INFINITY]), &[1., 1.], 0.99), zero_mu);

    assert_eq!(cfg_err(Algorithm::Deterministic, &moduli(1., &[1.]), &[1.], 1.), Some(SolverError::Config(ConfigError::RhoRange)));
    assert_eq!(cfg_err(Algorithm::UniformStochastic(3), &moduli(1., &[1., 1.]), &[1., 1., 1.], 0.5), Some(SolverError::Config(ConfigError::SubsetExcess)));
    assert_eq!(cfg_err(Algorithm::UniformStochastic(0), &moduli(1., &[1., 1.]), &[], 0.5), Some(SolverError::Config(ConfigError::SubsetExcess)));
    assert_eq!(cfg_err(Algorithm::Deterministic, &moduli(1., &[]), &[1.], 0.5), Some(SolverError::Config(ConfigError::EmptyProblem)));

    let part = Partition::new(2, 2).unwrap();
    assert_eq!(
        AlgorithmConfig::new(Algorithm::UniformStochastic(2), 1., vec![1., 1.], None, vec![0.5, 0.6], part.clone(), 1).err(),
        Some(SolverError::Config(ConfigError::ProbSum))
    );
    assert_eq!(
        AlgorithmConfig::new(Algorithm::UniformStochastic(2), 0., vec![1., 1.], None, vec![0.5, 0.5], part.clone(), 1).err(),
        Some(SolverError::Config(ConfigError::NonPositiveStep))
    );
    assert_eq!(
        AlgorithmConfig::new(Algorithm::UniformStochastic(2), 1., vec![1., 1., 1.], None, vec![0.5, 0.5], part, 1).err(),
        Some(SolverError::Config(ConfigError::StepCount))
    );
}

#[test]
fn test_prob_and_partition_sizes()
{
    for total in 1..= 60 {
        for n in 1..= total {
            let m = moduli(1., &vec![1.; total]);
            let norms = vec![1.; n];
            let cfg = calibrate(Algorithm::UniformStochastic(n), &m, &norms, 0.99, 1).unwrap();

            assert_float_eq!(cfg.prob_subset().iter().sum::<f64>(), 1., abs <= 1e-12);

            for order in [PartitionOrder::Interlaced, PartitionOrder::Block] {
                let p = Partition::with_order(total, n, order).unwrap();
                let sizes: Vec<usize> = p.sub2ind().iter().map(|s| s.len()).collect();
                let min = sizes.iter().min().unwrap();
                let max = sizes.iter().max().unwrap();
                assert!(max - min <= 1);

                let mut all: Vec<usize> = p.sub2ind().concat();
                all.sort();
                assert_eq!(all, (0.. total).collect::<Vec<_>>());
                for (j, s) in p.sub2ind().iter().enumerate() {
                    for &i in s {
                        assert_eq!(p.subset_of(i), j);
                    }
                }
            }
        }
    }
}

#[test]
fn test_partition_7_3()
{
    let p = Partition::new(7, 3).unwrap();

    let mut sizes: Vec<usize> = p.sub2ind().iter().map(|s| s.len()).collect();
    sizes.sort();
    assert_eq!(sizes, vec![2, 2, 3]);

    let mut all: Vec<usize> = p.sub2ind().concat();
    all.sort();
    assert_eq!(all, vec![0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_sampler_reproducible()
{
    let prob = [0.2, 0.5, 0.3];

    let draws = |seed| {
        let mut s = Sampler::new(Xoshiro256StarStar::seed_from_u64(seed), &prob).unwrap();
        (0.. 1000).map(|k| s.select(k)).collect::<Vec<_>>()
    };

    let d1 = draws(42);
    assert_eq!(d1, draws(42));
    assert_ne!(d1, draws(43));

    // empirical frequencies follow the probabilities
    for (j, p) in prob.iter().enumerate() {
        let freq = d1.iter().filter(|&&v| v == j).count() as f64 / 1000.;
        assert_float_eq!(freq, *p, abs <= 0.06);
    }

    assert!(Sampler::new(Xoshiro256StarStar::seed_from_u64(0), &[0.5, 0.4]).is_err());
    assert!(Sampler::new(Xoshiro256StarStar::seed_from_u64(0), &[1.5, -0.5]).is_err());
}
