use float_eq::assert_float_eq;
use spdhg_bench::*;
use std::path::PathBuf;

fn temp_folder(name: &str) -> PathBuf
{
    let d = std::env::temp_dir().join(format!("spdhg_bench_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&d);
    d
}

fn sample_output() -> RunOutput
{
    let records = (0.. 4).map(|k| {
        let k = k as f64;
        Record {
            obj: 10. / 3. + (-k).exp(),
            dist: 0.1_f64.powf(k) + 1e-300,
            dist_x: 0.1_f64.powf(k),
            dist_y: 1e-300,
        }
    }).collect();

    RunOutput {
        alg: "spdhg_uni2".to_string(),
        iter_save: vec![0, 2, 4, 6],
        niter: 6,
        x: vec![1. / 3., 2_f64.sqrt(), -1e-17, 0.],
        trace: Trace {records},
        nsub: 2,
        theta: Some(0.987654321),
    }
}

#[test]
fn test_load_or_compute_once()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let cache = ArtifactCache::new(temp_folder("once")).unwrap();

    let mut calls = 0;
    let v1: Vec<f64> = cache.load_or_compute("v", || {calls += 1; Ok(vec![0.1, 0.2, 0.3])}).unwrap();
    let v2: Vec<f64> = cache.load_or_compute("v", || {calls += 1; Ok(vec![9.])}).unwrap();

    assert_eq!(calls, 1);
    assert_eq!(v1, v2);
}

#[test]
fn test_cache_corruption()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let cache = ArtifactCache::new(temp_folder("corrupt")).unwrap();

    std::fs::write(cache.path("target"), "{\"x\": [1.0, 2.0], \"y\": ").unwrap();
    let r = cache.load_or_compute::<TargetBundle, _>("target", || panic!("must not recompute"));
    assert!(matches!(r, Err(BenchError::CacheCorruption {..})));

    // well-formed JSON of another shape is corrupt too
    std::fs::write(cache.path("norms"), "{\"tol\": 1e-6}").unwrap();
    assert!(matches!(cache.load::<NormsFile>("norms"), Err(BenchError::CacheCorruption {..})));

    assert!(matches!(cache.load::<NormsFile>("absent"), Ok(None)));
}

#[test]
fn test_bundle_round_trip()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let cache = ArtifactCache::new(temp_folder("roundtrip")).unwrap();

    let target = TargetBundle {
        x: vec![0.1, 1. / 7., 3e-12],
        y: vec![-2.5e8, 1. / 3.],
        subx: vec![-0.1, 1e-310, 5.],
        suby: vec![std::f64::consts::PI, 0.7],
        obj: 1234.5678901234567,
    };
    let out = sample_output();

    cache.save("target", &target).unwrap();
    cache.save("out", &out).unwrap();
    let target2: TargetBundle = cache.load("target").unwrap().unwrap();
    let out2: RunOutput = cache.load("out").unwrap().unwrap();

    assert_eq!(target, target2);
    assert_eq!(out, out2);

    // downstream values are identical
    let a1 = analyse(&out, target.obj);
    let a2 = analyse(&out2, target2.obj);
    assert_eq!(a1.epochs, a2.epochs);
    for (meas, v) in a1.measures.iter() {
        assert_float_eq!(v.as_slice(), a2.measures[meas].as_slice(), abs_all <= 0.);
    }
}
