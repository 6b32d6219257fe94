use spdhg_core::solver::{IterateState, Observer, Operator, Solver};
use spdhg_core::{calibrate, Algorithm, Partition, Sampler};
use crate::{ArtifactCache, BenchError, ExperimentContext, La, PetProblem, RunOutput, TargetBundle};
use crate::{Analysis, Curve, LogProgress, Snapshot, TraceRecorder, analyse, plot_semilogy, relative_to_first, save_image};

/// Variants compared, in order.
pub const VARIANTS: [Algorithm; 5] = [
    Algorithm::Deterministic,
    Algorithm::UniformStochastic(10),
    Algorithm::UniformStochastic(50),
    Algorithm::Pesquet(10),
    Algorithm::Pesquet(50),
];

/// Epochs at which the primal iterate is written as an image.
const EPOCH_PLOT: [usize; 6] = [10, 20, 30, 40, 100, 300];

/// Runs one variant for `nepoch` epochs from zero.
///
/// The configuration, iterate and sampler live only in this call.
/// Records the trace every epoch, writes snapshots of the primal iterate,
/// and returns the output bundle of the run.
pub fn run_variant(ctx: &mut ExperimentContext, prob: &mut PetProblem, target: &TargetBundle, alg: Algorithm) -> Result<RunOutput, BenchError>
{
    log::info!("======= {} =======", alg);

    let n = alg.nsub();
    let niter = ctx.par.nepoch * n;

    let norm_part = Partition::new(prob.op_a().len(), alg.norm_nsub())?;
    let norms = ctx.subset_norms(prob.op_a(), &norm_part)?;
    let cfg = calibrate(alg, &prob.moduli(), &norms, ctx.par.rho, niter)?;
    log::debug!("{}: tau {:.3e} theta {:?} kappa {:?}", alg, cfg.tau(), cfg.theta(), cfg.kappa());

    prob.g_mut().reset_warm_start();
    let state = IterateState::zero(prob.op_a().size());
    let mut sampler = Sampler::new(ctx.rng(), cfg.prob_subset())?;

    let mut progress = LogProgress::new(n);
    let mut recorder = TraceRecorder::new(target, n);
    let mut snapshot = Snapshot::new(EPOCH_PLOT.iter().map(|e| e * n).collect());

    let sol = {
        let observers: &mut [&mut dyn Observer<La>] = &mut [&mut progress, &mut recorder, &mut snapshot];

        Solver::<La>::new().par(|p| {p.log_period = 10 * n})
        .solve((&mut *prob, &cfg, &mut sampler, observers), state)?
    };

    let (iter_save, trace) = recorder.finish()?;

    let folder = ctx.par.folder_today();
    for (k, x) in snapshot.into_snaps() {
        save_image(&x, ctx.par.nvoxel, Some((0., 1.)), folder.join(format!("{}_{}.png", alg.name(), k)))?;
    }

    Ok(RunOutput {
        alg: alg.name(),
        iter_save,
        niter,
        x: sol.x,
        trace,
        nsub: n,
        theta: cfg.theta(),
    })
}

/// Persists the output bundle of a run as `{alg}_output`.
pub fn save_output(ctx: &ExperimentContext, out: &RunOutput) -> Result<(), BenchError>
{
    ArtifactCache::new(ctx.par.folder_bundle())?.save(&format!("{}_output", out.alg), out)
}

/// Loads the output bundle of the variant `alg`.
///
/// Returns `Err` with [`BenchError::CacheCorruption`] if missing or malformed,
/// since the analysis must read what the runs wrote.
pub fn load_output(ctx: &ExperimentContext, alg: Algorithm) -> Result<RunOutput, BenchError>
{
    let cache = ArtifactCache::new(ctx.par.folder_bundle())?;
    let name = format!("{}_output", alg.name());

    let out: RunOutput = cache.load(&name)?.ok_or_else(|| BenchError::CacheCorruption {
        path: cache.path(&name),
        reason: "missing".to_string(),
    })?;
    if out.iter_save.len() != out.trace.len() {
        return Err(BenchError::CacheCorruption {
            path: cache.path(&name),
            reason: format!("{} iterations for {} records", out.iter_save.len(), out.trace.len()),
        });
    }
    Ok(out)
}

//

fn positive_range<'a, I: Iterator<Item = &'a f64>>(vals: I) -> (f64, f64)
{
    let (lo, hi) = vals.filter(|v| v.is_finite() && **v > 0.)
                   .fold((f64::INFINITY, f64::NEG_INFINITY), |(l, h), &v| (l.min(v), h.max(v)));
    if lo <= hi {(0.5 * lo, 2. * hi)} else {(1e-8, 1.)}
}

/// Analyses the outputs against the saddle point and draws the comparison charts.
///
/// One chart per measure over all variants, then the relative distance to the saddle point
/// and the relative objective in the ranges of the reference figures.
/// Also writes the final primal iterate of each variant.
pub fn report(ctx: &ExperimentContext, target: &TargetBundle, outputs: &[RunOutput]) -> Result<Vec<Analysis>, BenchError>
{
    let folder = ctx.par.folder_today();
    let nepoch = ctx.par.nepoch as f64;

    for out in outputs {
        save_image(&out.x, ctx.par.nvoxel, Some((0., 1.)), folder.join(format!("{}.png", out.alg)))?;
    }

    let analyses: Vec<Analysis> = outputs.iter().map(|o| analyse(o, target.obj)).collect();

    if let Some(first) = analyses.first() {
        for meas in first.measures.keys() {
            let curves: Vec<Curve> = analyses.iter().map(|a| Curve {
                label: &a.alg,
                x: &a.epochs,
                y: &a.measures[meas],
            }).collect();
            let ylim = positive_range(curves.iter().flat_map(|c| c.y.iter()));

            plot_semilogy(folder.join(format!("linx_{}.svg", meas)), meas, &curves, (0., nepoch), ylim)?;
        }
    }

    let dist_rel: Vec<Vec<f64>> = analyses.iter().map(|a| relative_to_first(&a.measures["dist"])).collect();
    let curves: Vec<Curve> = analyses.iter().zip(&dist_rel).map(|(a, d)| Curve {
        label: &a.alg,
        x: &a.epochs,
        y: d,
    }).collect();
    plot_semilogy(folder.join("output0.svg"), "relative distance to saddle point", &curves, (0., nepoch), (1e-8, 5e-1))?;

    let curves: Vec<Curve> = analyses.iter().map(|a| Curve {
        label: &a.alg,
        x: &a.epochs,
        y: &a.measures["obj_rel"],
    }).collect();
    plot_semilogy(folder.join("output1.svg"), "relative objective", &curves, (0., nepoch), (1e-8, 1.))?;

    Ok(analyses)
}
