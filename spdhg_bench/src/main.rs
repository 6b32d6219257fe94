use anyhow::Result;
use spdhg_bench::*;

/// main
fn main() -> Result<()> {
    env_logger::init();

    let mut par = BenchParam::default();
    par.set_by_env();
    let mut ctx = ExperimentContext::new(par)?;

    //----- problem and saddle point

    let geom = geometry(&ctx.par);
    let data = load_or_simulate(&ctx, &geom)?;
    let mut prob = build_problem(&ctx.par, geom, &data)?;
    let target = load_or_compute_target(&mut ctx, &mut prob)?;

    //----- runs, each from scratch

    for alg in VARIANTS {
        let out = run_variant(&mut ctx, &mut prob, &target, alg)?;
        save_output(&ctx, &out)?;
    }

    //----- analysis of what the runs persisted

    let outputs = VARIANTS.iter()
                  .map(|&alg| load_output(&ctx, alg))
                  .collect::<Result<Vec<_>, _>>()?;
    let analyses = report(&ctx, &target, &outputs)?;

    for a in analyses {
        if let Some(v) = a.measures["obj_rel"].iter().rev().find(|v| v.is_finite()) {
            log::info!("{}: last relative objective {:.3e}", a.alg, v);
        }
    }

    Ok(())
}
