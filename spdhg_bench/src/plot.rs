use plotters::prelude::*;
use std::path::Path;
use crate::BenchError;

/// Writes a row-major `nvoxel` by `nvoxel` image as a grayscale PNG.
///
/// `clim` maps to black and white; the range of `x` if `None`.
pub fn save_image<P: AsRef<Path>>(x: &[f64], nvoxel: usize, clim: Option<(f64, f64)>, path: P) -> Result<(), BenchError>
{
    let (lo, hi) = clim.unwrap_or_else(|| {
        x.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(l, h), &v| (l.min(v), h.max(v)))
    });
    let span = if hi > lo {hi - lo} else {1.};

    let img = image::GrayImage::from_fn(nvoxel as u32, nvoxel as u32, |c, r| {
        let v = (x[r as usize * nvoxel + c as usize] - lo) / span;
        image::Luma([(v.max(0.).min(1.) * 255.) as u8])
    });
    img.save(path.as_ref())?;

    log::debug!("saved {}", path.as_ref().display());
    Ok(())
}

//

/// One curve of a chart.
pub struct Curve<'a>
{
    pub label: &'a str,
    pub x: &'a [f64],
    pub y: &'a [f64],
}

fn plot_err<E: std::fmt::Display>(e: E) -> BenchError
{
    BenchError::Plot(e.to_string())
}

/// Draws curves on a linear x and logarithmic y axis as an SVG chart.
///
/// Points outside `xlim` and `ylim`, including NaN, are left out.
pub fn plot_semilogy<P: AsRef<Path>>(path: P, ylabel: &str, curves: &[Curve], xlim: (f64, f64), ylim: (f64, f64)) -> Result<(), BenchError>
{
    let area = SVGBackend::new(path.as_ref(), (640, 480)).into_drawing_area();
    area.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&area)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(xlim.0..xlim.1, (ylim.0..ylim.1).log_scale())
        .map_err(plot_err)?;

    chart.configure_mesh()
        .x_desc("iterations [epochs]")
        .y_desc(ylabel)
        .y_label_formatter(&|v| format!("{:.0e}", v))
        .draw()
        .map_err(plot_err)?;

    for (k, c) in curves.iter().enumerate() {
        let color = Palette99::pick(k).to_rgba();
        let points: Vec<(f64, f64)> = c.x.iter().zip(c.y)
            .filter(|(x, y)| {
                (xlim.0..= xlim.1).contains(*x) && (ylim.0..= ylim.1).contains(*y)
            })
            .map(|(x, y)| (*x, *y))
            .collect();

        chart.draw_series(LineSeries::new(points, color.stroke_width(2)))
        .map_err(plot_err)?
        .label(c.label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    area.present().map_err(plot_err)?;
    log::debug!("saved {}", path.as_ref().display());
    Ok(())
}
