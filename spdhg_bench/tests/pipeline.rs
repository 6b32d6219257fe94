use spdhg_bench::*;
use spdhg_core::Algorithm;

fn small_param(name: &str) -> BenchParam
{
    let folder_out = std::env::temp_dir().join(format!("spdhg_bench_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&folder_out);

    BenchParam {
        nepoch: 3,
        niter_target: 50,
        nvoxel: 8,
        nview: 6,
        folder_out,
        .. Default::default()
    }
}

#[test]
fn test_projection_nonnegative()
{
    let nvoxel = 8;
    for v in 0.. 4 {
        let g = projection(nvoxel, v, 4);
        assert_eq!(g.size(), (nvoxel, nvoxel * nvoxel));

        let m: &[f64] = g.as_ref();
        assert!(m.iter().all(|e| *e >= 0.));
        // every pixel lands on the detector with its whole area
        let total: f64 = m.iter().sum();
        let h = cell_side(nvoxel);
        let det = 2. * 2_f64.sqrt() / nvoxel as f64;
        assert!((total - (nvoxel * nvoxel) as f64 * h * h / det).abs() < 1e-9);
    }
}

#[test]
fn test_gaussian_filter()
{
    let v = [0., 0., 1., 1., 0., 0.];
    let s = gaussian_filter(&v, 1.);
    assert_eq!(s.len(), v.len());
    // reflected boundaries keep the mass
    let sum: f64 = s.iter().sum();
    assert!((sum - 2.).abs() < 1e-9);
    assert!(s[2] < 1. && s[0] > 0.);

    assert_eq!(gaussian_filter(&v, 0.), v.to_vec());
}

#[test]
fn test_pipeline_small()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut ctx = ExperimentContext::new(small_param("pipeline")).unwrap();

    let geom = geometry(&ctx.par);
    let data = load_or_simulate(&ctx, &geom).unwrap();
    assert_eq!(data.data.len(), 6);
    assert!(data.background.iter().flatten().all(|r| *r > 0.));

    // reloaded, not simulated again
    assert_eq!(load_or_simulate(&ctx, &geom).unwrap(), data);

    let mut prob = build_problem(&ctx.par, geom, &data).unwrap();
    assert_eq!(prob.op_a().len(), 6);

    let target = load_or_compute_target(&mut ctx, &mut prob).unwrap();
    assert_eq!(target.x.len(), 64);
    assert!(target.x.iter().all(|v| *v >= 0.));
    assert_eq!(load_or_compute_target(&mut ctx, &mut prob).unwrap(), target);

    let algs = [Algorithm::Deterministic, Algorithm::UniformStochastic(3), Algorithm::Pesquet(2)];
    let mut outputs = Vec::new();
    for alg in algs {
        let out = run_variant(&mut ctx, &mut prob, &target, alg).unwrap();
        let n = alg.nsub();

        assert_eq!(out.alg, alg.name());
        assert_eq!(out.niter, 3 * n);
        assert_eq!(out.iter_save, (0..= 3).map(|e| e * n).collect::<Vec<_>>());
        assert_eq!(out.trace.len(), 4);
        assert_eq!(out.theta.is_none(), matches!(alg, Algorithm::Pesquet(_)));

        // runs are scoped: the same variant reproduces exactly
        let again = run_variant(&mut ctx, &mut prob, &target, alg).unwrap();
        assert_eq!(again, out);

        outputs.push(out);
    }

    for out in outputs.iter() {
        let a = analyse(out, target.obj);
        assert_eq!(a.measures["obj_rel"][0], 1.);
        assert_eq!(a.epochs, vec![0., 1., 2., 3.]);
    }

    match report(&ctx, &target, &outputs) {
        Ok(analyses) => {
            assert_eq!(analyses.len(), 3);
            assert!(ctx.par.folder_today().join("output1.svg").exists());
        },
        // laying out chart text needs a system font
        Err(BenchError::Plot(e)) => log::warn!("no chart: {}", e),
        Err(e) => panic!("{}", e),
    }
    assert!(ctx.par.folder_today().join("pdhg.png").exists());
}

#[test]
fn test_corrupt_data_is_fatal()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = ExperimentContext::new(small_param("corrupt_data")).unwrap();
    let geom = geometry(&ctx.par);

    // a bundle of another problem size
    let other = DataBundle {
        data: vec![vec![1.; 3]; 6],
        factors: vec![vec![1.; 3]; 6],
        background: vec![vec![1.; 3]; 6],
    };
    ctx.cache().save("data", &other).unwrap();

    assert!(matches!(load_or_simulate(&ctx, &geom), Err(BenchError::CacheCorruption {..})));
}

#[test]
fn test_save_and_load_output()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = ExperimentContext::new(small_param("output")).unwrap();

    let out = RunOutput {
        alg: Algorithm::UniformStochastic(10).name(),
        iter_save: vec![0, 10],
        niter: 10,
        x: vec![0.25, 1. / 3.],
        trace: Trace {records: vec![
            Record {obj: 2., dist: 1., dist_x: 0.5, dist_y: 0.5},
            Record {obj: 1.5, dist: 0.1, dist_x: 0.06, dist_y: 0.04},
        ]},
        nsub: 10,
        theta: Some(0.9),
    };
    save_output(&ctx, &out).unwrap();

    assert_eq!(load_output(&ctx, Algorithm::UniformStochastic(10)).unwrap(), out);
    assert!(matches!(load_output(&ctx, Algorithm::Pesquet(10)), Err(BenchError::CacheCorruption {..})));
}
