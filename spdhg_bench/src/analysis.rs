use std::collections::BTreeMap;
use crate::RunOutput;

/// Quality measures of one run resorted as series, ready for log-scale plots.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis
{
    pub alg: String,
    /// Recorded iterations in epochs.
    pub epochs: Vec<f64>,
    /// Series of `obj`, `dist`, `dist_x`, `dist_y` and `obj_rel`,
    /// non-positive values replaced by NaN.
    pub measures: BTreeMap<&'static str, Vec<f64>>,
}

/// Replaces non-positive values, which a log axis cannot show, by NaN.
///
/// Returns the number of values replaced.
pub fn clamp_nonpositive(v: &mut [f64]) -> usize
{
    let mut cnt = 0;
    for e in v.iter_mut() {
        if *e <= 0. {
            *e = f64::NAN;
            cnt += 1;
        }
    }
    cnt
}

/// `v` divided by its first value.
pub fn relative_to_first(v: &[f64]) -> Vec<f64>
{
    match v.first() {
        Some(&v0) => v.iter().map(|e| e / v0).collect(),
        None => Vec::new(),
    }
}

/// Analyses the output of one run against the objective value `obj_opt` of the saddle point.
///
/// Relative objective is \\((obj_k - obj^\*) / (obj_0 - obj^\*)\\).
/// Non-positive values of any measure are logged as a warning and become NaN.
pub fn analyse(out: &RunOutput, obj_opt: f64) -> Analysis
{
    let epochs = out.iter_save.iter().map(|&k| k as f64 / out.nsub as f64).collect();

    let obj = out.trace.measure(|r| r.obj);
    let obj0 = obj.first().copied().unwrap_or(f64::NAN);
    let obj_rel = obj.iter().map(|o| (o - obj_opt) / (obj0 - obj_opt)).collect();

    let mut measures = BTreeMap::new();
    measures.insert("obj", obj);
    measures.insert("dist", out.trace.measure(|r| r.dist));
    measures.insert("dist_x", out.trace.measure(|r| r.dist_x));
    measures.insert("dist_y", out.trace.measure(|r| r.dist_y));
    measures.insert("obj_rel", obj_rel);

    for (meas, v) in measures.iter_mut() {
        let cnt = clamp_nonpositive(v);
        if cnt > 0 {
            log::warn!("{} {}: {} non-positive values excluded", out.alg, meas, cnt);
        }
    }

    Analysis {
        alg: out.alg.clone(),
        epochs,
        measures,
    }
}
