use spdhg_core::solver::{IterateState, Objective, Observer, Operator, Solver};
use spdhg_core::{calibrate, Algorithm, Partition, Sampler};
use crate::{BenchError, ExperimentContext, LogProgress, La, PetProblem, TargetBundle, save_image};

/// Computes a saddle point by a long deterministic PDHG run of `niter_target` iterations.
///
/// Writes the images of the saddle point and its primal subgradient beside the cache.
pub fn compute_target(ctx: &mut ExperimentContext, prob: &mut PetProblem) -> Result<TargetBundle, BenchError>
{
    let part = Partition::new(prob.op_a().len(), 1)?;
    let norms = ctx.subset_norms(prob.op_a(), &part)?;
    let cfg = calibrate(Algorithm::Deterministic, &prob.moduli(), &norms, ctx.par.rho, ctx.par.niter_target)?;
    log::info!("target: tau {:.3e} theta {:?} norm {:.3e}", cfg.tau(), cfg.theta(), norms[0]);

    prob.g_mut().reset_warm_start();
    let state = IterateState::zero(prob.op_a().size());
    let mut sampler = Sampler::new(ctx.rng(), cfg.prob_subset())?;
    let mut progress = LogProgress::new(10);
    let observers: &mut [&mut dyn Observer<La>] = &mut [&mut progress];

    let sol = Solver::<La>::new().solve((&mut *prob, &cfg, &mut sampler, observers), state)?;

    let subx: Vec<f64> = prob.adjoint(&sol.y).iter().map(|v| -v).collect();
    let suby = prob.forward(&sol.x);
    let obj = prob.objective(&sol.x)?;
    log::info!("target: objective {:.6e}", obj);

    let folder = ctx.cache().folder();
    save_image(&sol.x, ctx.par.nvoxel, Some((0., 1.)), folder.join("x_saddle.png"))?;
    save_image(&subx, ctx.par.nvoxel, None, folder.join("subx_saddle.png"))?;

    Ok(TargetBundle {
        x: sol.x,
        y: sol.y,
        subx,
        suby,
        obj,
    })
}

/// Loads the artifact `target`, or computes and saves it.
///
/// Returns `Err` with [`BenchError::CacheCorruption`] if the artifact mismatches the problem size.
pub fn load_or_compute_target(ctx: &mut ExperimentContext, prob: &mut PetProblem) -> Result<TargetBundle, BenchError>
{
    let (m, n) = prob.op_a().size();

    if let Some(t) = ctx.cache().load::<TargetBundle>("target")? {
        if t.x.len() != n || t.subx.len() != n || t.y.len() != m || t.suby.len() != m {
            return Err(BenchError::CacheCorruption {
                path: ctx.cache().path("target"),
                reason: format!("shape mismatches operator of {:?}", (m, n)),
            });
        }
        Ok(t)
    }
    else {
        let t = compute_target(ctx, prob)?;
        ctx.cache().save("target", &t)?;
        Ok(t)
    }
}
