use rand::Rng;
use rand_distr::Poisson;
use spdhg_core::solver::{ConvexFn, Operator};
use spdhg_core::{BlockOp, FnKLSmooth, FnTVNonNeg, MatBuild, Problem, SeparableSum};
use crate::{BenchParam, BenchError, DataBundle, ExperimentContext, La, cell_side, phantom, pixel_center, save_image};

/// Emission tomography problem
/// \\(\min_x \sum_v {\rm KL}(b_v; a_v \circ G_v x + r_v) + \alpha\,{\rm TV}(x) + \iota_{x \ge 0}(x) + \frac{\mu}{2} \\|x\\|^2\\).
pub type PetProblem = Problem<La, MatBuild<La>, FnTVNonNeg<La>>;

//

/// Parallel-beam projection of one view.
///
/// Pixel-driven: each pixel spreads its area over the two nearest detector bins,
/// so that a row approximates a line integral.
/// The detector has `nvoxel` bins covering the diagonal of the image.
pub fn projection(nvoxel: usize, view: usize, nview: usize) -> MatBuild<La>
{
    let ndet = nvoxel;
    let half = 2_f64.sqrt();
    let det = 2. * half / ndet as f64;
    let h = cell_side(nvoxel);
    let (s, c) = (std::f64::consts::PI * view as f64 / nview as f64).sin_cos();

    let mut mat = MatBuild::new((ndet, nvoxel * nvoxel));
    for r in 0.. nvoxel {
        for col in 0.. nvoxel {
            let (x, y) = pixel_center(nvoxel, r, col);
            let u = (x * c + y * s + half) / det - 0.5;
            let i0 = u.floor();
            let w = u - i0;
            let px = r * nvoxel + col;

            let area = h * h / det;
            if i0 >= 0. && (i0 as usize) < ndet {
                mat[(i0 as usize, px)] += area * (1. - w);
            }
            if i0 + 1. >= 0. && ((i0 + 1.) as usize) < ndet {
                mat[((i0 + 1.) as usize, px)] += area * w;
            }
        }
    }
    mat
}

/// Projections of every view.
pub fn geometry(par: &BenchParam) -> Vec<MatBuild<La>>
{
    (0.. par.nview).map(|v| projection(par.nvoxel, v, par.nview)).collect()
}

fn apply(mat: &MatBuild<La>, x: &[f64]) -> Vec<f64>
{
    let mut y = vec![0.; mat.size().0];
    mat.op(1., x, 0., &mut y);
    y
}

/// Gaussian smoothing with reflected boundaries, truncated at four standard deviations.
pub fn gaussian_filter(v: &[f64], sigma: f64) -> Vec<f64>
{
    let n = v.len() as isize;
    if n == 0 || sigma <= 0. {
        return v.to_vec();
    }

    let radius = (4. * sigma + 0.5) as isize;
    let kernel: Vec<f64> = (-radius..= radius).map(|k| (-(k * k) as f64 / (2. * sigma * sigma)).exp()).collect();
    let ksum: f64 = kernel.iter().sum();

    let reflect = |i: isize| {
        let m = i.rem_euclid(2 * n);
        (if m >= n {2 * n - m - 1} else {m}) as usize
    };

    (0.. n).map(|i| {
        kernel.iter().enumerate()
        .map(|(k, w)| w * v[reflect(i + k as isize - radius)])
        .sum::<f64>() / ksum
    }).collect()
}

/// Simulates the measurement of the phantom.
///
/// Attenuation-like factors are \\(\exp(-G(c \cdot {\rm support}))\\) rescaled to the desired counts,
/// the background is a smoothed sinogram support rescaled to the background counts,
/// and the data is Poisson noise of the expected counts drawn with the experiment seed.
pub fn simulate<R: Rng>(par: &BenchParam, geom: &[MatBuild<La>], rng: &mut R) -> DataBundle
{
    let truth = phantom(par.nvoxel);
    let h = cell_side(par.nvoxel);
    let support: Vec<f64> = truth.iter().map(|&v| if v > 0. {0.005 / h} else {0.}).collect();

    let sinogram: Vec<Vec<f64>> = geom.iter().map(|g| apply(g, &truth)).collect();
    let mut factors: Vec<Vec<f64>> = geom.iter().map(|g| {
        apply(g, &support).iter().map(|a| (-a).exp()).collect()
    }).collect();

    let counts_observed: f64 = factors.iter().zip(&sinogram)
                               .map(|(f, s)| f.iter().zip(s).map(|(a, b)| a * b).sum::<f64>())
                               .sum();
    let scale = par.counts_desired / counts_observed;
    for f in factors.iter_mut() {
        for a in f.iter_mut() {
            *a *= scale;
        }
    }

    let mut background: Vec<Vec<f64>> = sinogram.iter().map(|s| {
        let sup: Vec<f64> = s.iter().map(|&v| if v > 0. {1.} else {0.}).collect();
        gaussian_filter(&sup, 2. / h).iter().map(|v| 10. * v + 10.).collect()
    }).collect();
    let bsum: f64 = background.iter().flatten().sum();
    for b in background.iter_mut() {
        for v in b.iter_mut() {
            *v *= par.counts_background / bsum;
        }
    }

    let data: Vec<Vec<f64>> = factors.iter().zip(&sinogram).zip(&background).map(|((f, s), b)| {
        f.iter().zip(s).zip(b).map(|((a, g), r)| {
            match Poisson::new(a * g + r) {
                Ok(d) => rng.sample(d),
                Err(_) => 0.,
            }
        }).collect()
    }).collect();

    DataBundle {
        data,
        factors,
        background,
    }
}

/// Loads the artifact `data`, or simulates and saves it with the ground truth image.
///
/// Returns `Err` with [`BenchError::CacheCorruption`] if the artifact mismatches the problem size.
pub fn load_or_simulate(ctx: &ExperimentContext, geom: &[MatBuild<La>]) -> Result<DataBundle, BenchError>
{
    let par = &ctx.par;

    let bundle = ctx.cache().load_or_compute("data", || {
        log::info!("simulating data of {} views", par.nview);
        save_image(&phantom(par.nvoxel), par.nvoxel, Some((0., 1.)), ctx.cache().folder().join("groundtruth.png"))?;
        Ok(simulate(par, geom, &mut ctx.rng()))
    })?;

    let ndet: Vec<usize> = geom.iter().map(|g| g.size().0).collect();
    let fits = |v: &Vec<Vec<f64>>| v.len() == ndet.len() && v.iter().zip(&ndet).all(|(e, n)| e.len() == *n);
    if !(fits(&bundle.data) && fits(&bundle.factors) && fits(&bundle.background)) {
        return Err(BenchError::CacheCorruption {
            path: ctx.cache().path("data"),
            reason: format!("shape mismatches {} views of {:?} bins", ndet.len(), ndet.first()),
        });
    }

    Ok(bundle)
}

/// Builds the problem of `data` with \\(A_v = {\rm diag}(a_v) G_v\\).
pub fn build_problem(par: &BenchParam, geom: Vec<MatBuild<La>>, data: &DataBundle) -> Result<PetProblem, BenchError>
{
    let ops: Vec<MatBuild<La>> = geom.into_iter().zip(&data.factors)
                                 .map(|(g, a)| g.scale_rows(a))
                                 .collect();

    let mut fns: Vec<Box<dyn ConvexFn<La>>> = Vec::new();
    for (b, r) in data.data.iter().zip(&data.background) {
        fns.push(Box::new(FnKLSmooth::<La>::new(b.clone(), r.clone())?));
    }

    let prox_niter = par.prox_niter;
    let g = FnTVNonNeg::<La>::new((par.nvoxel, par.nvoxel), par.alpha, par.mu_g)?
            .par(|p| {p.niter = prox_niter});

    let prob = Problem::new(BlockOp::new(ops)?, SeparableSum::new(fns)?, g)?;
    Ok(prob)
}
