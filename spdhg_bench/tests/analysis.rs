use float_eq::assert_float_eq;
use spdhg_bench::*;
use spdhg_core::solver::{IterateState, Objective, Observer, SolverError};

fn output(objs: &[f64], dists: &[f64], nsub: usize) -> RunOutput
{
    let records = objs.iter().zip(dists).map(|(&obj, &d)| Record {
        obj,
        dist: d,
        dist_x: d / 2.,
        dist_y: d / 2.,
    }).collect();

    RunOutput {
        alg: "test".to_string(),
        iter_save: (0.. objs.len()).map(|k| k * nsub).collect(),
        niter: (objs.len() - 1) * nsub,
        x: vec![0.],
        trace: Trace {records},
        nsub,
        theta: None,
    }
}

#[test]
fn test_obj_rel()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let out = output(&[5., 3., 2., 1.5], &[4., 2., 1., 0.5], 10);
    let a = analyse(&out, 1.);

    assert_float_eq!(a.epochs.as_slice(), [0., 1., 2., 3.].as_ref(), abs_all <= 1e-15);
    assert_float_eq!(a.measures["obj_rel"].as_slice(), [1., 0.5, 0.25, 0.125].as_ref(), abs_all <= 1e-15);
    assert_float_eq!(relative_to_first(&a.measures["dist"]).as_slice(), [1., 0.5, 0.25, 0.125].as_ref(), abs_all <= 1e-15);
}

#[test]
fn test_nonpositive_become_nan()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // below the reference objective, and a zero distance
    let out = output(&[3., 2., 1., 0.5], &[1., 0., 1e-3, -1e-20], 1);
    let a = analyse(&out, 1.);

    let obj_rel = &a.measures["obj_rel"];
    assert_float_eq!(obj_rel[0], 1., abs <= 1e-15);
    assert_float_eq!(obj_rel[1], 0.5, abs <= 1e-15);
    assert!(obj_rel[2].is_nan());
    assert!(obj_rel[3].is_nan());

    let dist = &a.measures["dist"];
    assert_eq!(dist[0], 1.);
    assert!(dist[1].is_nan());
    assert_eq!(dist[2], 1e-3);
    assert!(dist[3].is_nan());

    // the clamp applies to every measure
    assert!(a.measures["dist_x"][1].is_nan());
    assert_eq!(a.measures["obj"][3], 0.5);

    let mut v = [1., -0., 0., f64::MIN_POSITIVE];
    assert_eq!(clamp_nonpositive(&mut v), 2);
    assert!(v[1].is_nan() && v[2].is_nan());
    assert_eq!(v[3], f64::MIN_POSITIVE);
}

struct SumObjective;

impl Objective<La> for SumObjective
{
    fn objective(&self, x: &[f64]) -> Result<f64, SolverError>
    {
        Ok(x.iter().sum())
    }
}

#[test]
fn test_trace_recorder_distances()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let target = TargetBundle {
        x: vec![1., 2.],
        y: vec![0., 0., 3.],
        subx: vec![0., 0.],
        suby: vec![0., 0., 0.],
        obj: 3.,
    };
    let mut rec = TraceRecorder::new(&target, 2);

    let state = IterateState {
        x: vec![2., 0.],
        y: vec![1., -1., 3.],
    };
    for k in 0..= 4 {
        rec.on_iteration(k, &state, &SumObjective);
    }

    let (iter_save, trace) = rec.finish().unwrap();
    assert_eq!(iter_save, vec![0, 2, 4]);

    let r = trace.records[1];
    assert_float_eq!(r.obj, 2., abs <= 0.);
    // halved squared distances
    assert_float_eq!(r.dist_x, 2.5, abs <= 1e-15);
    assert_float_eq!(r.dist_y, 1., abs <= 1e-15);
    assert_float_eq!(r.dist, 3.5, abs <= 1e-15);
}
