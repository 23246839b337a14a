//! Static figures for the likelihood comparison and the mixture likelihood.
//!
//! Contours are extracted with marching squares and drawn as line segments;
//! the mixture surface is drawn as a gray-scale image. Figures are PNG
//! bitmaps; text is rasterized with a bundled DejaVu Sans face.

use std::path::Path;

use ndarray::{Array1, Array2};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use tracing::info;

use crate::errors::{RecipeError, RecipeResult};
use crate::likelihood::{BinnedFit, LikelihoodComparison};
use crate::math::convert_to_stdev;
use crate::mixture::OutlierAnalysis;

/// Confidence levels of the 1, 2 and 3 sigma contours.
pub const CONFIDENCE_LEVELS: [f64; 3] = [0.683, 0.955, 0.997];

/// Pixels per inch of the figure canvas.
pub const DPI: u32 = 300;

const GRAY: RGBColor = RGBColor(128, 128, 128);

/// A straight piece of a contour line.
pub type Segment = [(f64, f64); 2];

type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

static SANS_SERIF: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Makes the bundled face available as `"sans-serif"`. Registering twice
/// replaces the entry with the same face.
fn register_fonts() -> RecipeResult<()> {
    register_font("sans-serif", FontStyle::Normal, SANS_SERIF).map_err(|_| {
        RecipeError::Plot("bundled sans-serif font could not be parsed".to_string())
    })
}

fn crossing(p: (f64, f64), q: (f64, f64), vp: f64, vq: f64, level: f64) -> (f64, f64) {
    let t = (level - vp) / (vq - vp);
    (p.0 + t * (q.0 - p.0), p.1 + t * (q.1 - p.1))
}

/// Contour segments of `z` at `level` by marching squares.
///
/// `z` is indexed `[y_index, x_index]`. Cells touching a non-finite value are
/// skipped.
pub fn contour_segments(
    x: &Array1<f64>,
    y: &Array1<f64>,
    z: &Array2<f64>,
    level: f64,
) -> Vec<Segment> {
    let (ny, nx) = z.dim();
    let mut segments = Vec::new();
    if nx < 2 || ny < 2 || x.len() != nx || y.len() != ny {
        return segments;
    }

    for i in 0..ny - 1 {
        for j in 0..nx - 1 {
            // Corners counter-clockwise from the lower left.
            let corners = [
                ((x[j], y[i]), z[[i, j]]),
                ((x[j + 1], y[i]), z[[i, j + 1]]),
                ((x[j + 1], y[i + 1]), z[[i + 1, j + 1]]),
                ((x[j], y[i + 1]), z[[i + 1, j]]),
            ];
            if corners.iter().any(|(_, v)| !v.is_finite()) {
                continue;
            }

            let mut points = Vec::with_capacity(4);
            for k in 0..4 {
                let (p, vp) = corners[k];
                let (q, vq) = corners[(k + 1) % 4];
                if (vp < level) != (vq < level) {
                    points.push(crossing(p, q, vp, vq, level));
                }
            }

            match points.len() {
                2 => segments.push([points[0], points[1]]),
                4 => {
                    // Saddle: decide the pairing from the cell centre.
                    let centre = corners.iter().map(|(_, v)| v).sum::<f64>() / 4.0;
                    if (centre < level) == (corners[0].1 < level) {
                        segments.push([points[0], points[1]]);
                        segments.push([points[2], points[3]]);
                    } else {
                        segments.push([points[3], points[0]]);
                        segments.push([points[1], points[2]]);
                    }
                }
                _ => {}
            }
        }
    }

    segments
}

/// Rate `a x + b` over `x`, zeroed outside `[xmin, xmax]`.
pub fn clipped_rate(a: f64, b: f64, x: &Array1<f64>, xmin: f64, xmax: f64) -> Array1<f64> {
    x.mapv(|xv| {
        if xv < xmin || xv > xmax {
            0.0
        } else {
            a * xv + b
        }
    })
}

fn draw_contours(
    chart: &mut Chart,
    x: &Array1<f64>,
    y: &Array1<f64>,
    confidence: &Array2<f64>,
    style: ShapeStyle,
    label: Option<&str>,
) -> RecipeResult<()> {
    for (n, &level) in CONFIDENCE_LEVELS.iter().enumerate() {
        let segments = contour_segments(x, y, confidence, level);
        let series = chart.draw_series(
            segments
                .into_iter()
                .map(|s| PathElement::new(vec![s[0], s[1]], style)),
        )?;

        if let (0, Some(label)) = (n, label) {
            series.label(label).legend(move |(px, py)| {
                PathElement::new(vec![(px, py), (px + 20, py)], style)
            });
        }
    }

    Ok(())
}

fn draw_binned_data(
    area: &Panel,
    comparison: &LikelihoodComparison,
    fit: &BinnedFit,
) -> RecipeResult<()> {
    let x = Array1::linspace(comparison.xmin - 1.0, comparison.xmax + 1.0, 1000);
    let rate = |a: f64, b: f64| {
        clipped_rate(a, b, &x, comparison.xmin, comparison.xmax) * fit.factor
    };
    let truth = rate(comparison.a_true, comparison.b_true);
    let poisson = rate(fit.poisson_ml.a, fit.poisson_ml.b);
    let gaussian = rate(fit.gaussian_ml.a, fit.gaussian_ml.b);

    let y_max = fit
        .yi
        .iter()
        .chain(truth.iter())
        .chain(poisson.iter())
        .chain(gaussian.iter())
        .cloned()
        .fold(1.0, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("{} points, {} bins", comparison.n_points, fit.nbins),
            ("sans-serif", 40),
        )
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(comparison.xmin - 1.0..comparison.xmax + 1.0, 0.0..y_max)?;

    chart.configure_mesh().x_desc("x").y_desc("y_i").draw()?;

    chart.draw_series(
        fit.xi
            .iter()
            .zip(fit.yi.iter())
            .map(|(&xv, &yv)| Circle::new((xv, yv), 6, GRAY.filled())),
    )?;

    let points = |curve: &Array1<f64>| {
        x.iter()
            .cloned()
            .zip(curve.iter().cloned())
            .collect::<Vec<(f64, f64)>>()
    };

    // True rate solid, Poisson fit dashed, Gaussian fit dash-dotted.
    chart.draw_series(LineSeries::new(points(&truth), BLACK.stroke_width(3)))?;
    chart.draw_series(DashedLineSeries::new(
        points(&poisson),
        24,
        16,
        BLACK.stroke_width(3),
    ))?;
    chart.draw_series(DashedLineSeries::new(
        points(&gaussian),
        30,
        30,
        BLACK.stroke_width(3),
    ))?;
    chart.draw_series(DottedLineSeries::new(points(&gaussian), 45, 60, |c| {
        Circle::new(c, 3, BLACK.filled())
    }))?;

    Ok(())
}

fn dotted_reference(chart: &mut Chart, from: (f64, f64), to: (f64, f64)) -> RecipeResult<()> {
    chart.draw_series(DottedLineSeries::new(vec![from, to], 0, 12, |c| {
        Circle::new(c, 2, BLACK.filled())
    }))?;

    Ok(())
}

fn draw_likelihood_contours(
    area: &Panel,
    comparison: &LikelihoodComparison,
    fit: &BinnedFit,
) -> RecipeResult<()> {
    let mut chart = ChartBuilder::on(area)
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(0.0..0.04, 0.001..0.15)?;

    chart
        .configure_mesh()
        .x_desc("a*")
        .y_desc("b*")
        .x_labels(3)
        .draw()?;

    let grid = &comparison.grid;
    draw_contours(
        &mut chart,
        &grid.x,
        &grid.y,
        &convert_to_stdev(&fit.poisson),
        BLACK.stroke_width(4),
        Some("Poisson Likelihood"),
    )?;
    draw_contours(
        &mut chart,
        &grid.x,
        &grid.y,
        &convert_to_stdev(&fit.gaussian),
        GRAY.stroke_width(2),
        Some("Gaussian Likelihood"),
    )?;

    dotted_reference(
        &mut chart,
        (comparison.a_true, 0.0),
        (comparison.a_true, 0.2),
    )?;
    dotted_reference(
        &mut chart,
        (0.0, comparison.b_true),
        (0.06, comparison.b_true),
    )?;

    chart
        .configure_series_labels()
        .label_font(("sans-serif", 32))
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Draws the two-row comparison figure: binned data with the true and fitted
/// rates on the left, Poisson and Gaussian likelihood contours on the right.
pub fn render_likelihood_comparison(
    comparison: &LikelihoodComparison,
    path: &Path,
) -> RecipeResult<()> {
    register_fonts()?;

    let side = 9 * DPI;
    let root = BitMapBackend::new(path, (side, side)).into_drawing_area();
    root.fill(&WHITE)?;

    let rows = comparison.fits.len().max(1);
    let panels = root.split_evenly((rows, 2));

    for (num, fit) in comparison.fits.iter().enumerate() {
        draw_binned_data(&panels[2 * num], comparison, fit)?;
        draw_likelihood_contours(&panels[2 * num + 1], comparison, fit)?;
    }

    root.present()?;
    info!(path = %path.display(), "likelihood comparison written");

    Ok(())
}

/// Draws the normalized mixture surface as an image with its confidence
/// contours on top.
pub fn render_mixture_likelihood(analysis: &OutlierAnalysis, path: &Path) -> RecipeResult<()> {
    register_fonts()?;

    let (width, height) = (64 * DPI / 10, 48 * DPI / 10);
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mu = &analysis.mu_axis;
    let g = &analysis.g_axis;
    let (x0, x1) = (mu[0], mu[mu.len() - 1]);
    let (y0, y1) = (g[0], g[g.len() - 1]);

    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart.configure_mesh().disable_mesh().draw()?;

    // Pixels span the axis extent evenly.
    let (ny, nx) = analysis.surface.dim();
    let dx = (x1 - x0) / nx as f64;
    let dy = (y1 - y0) / ny as f64;
    chart.draw_series(analysis.surface.indexed_iter().map(|((i, j), &v)| {
        let shade = (255.0 * (1.0 - v.clamp(0.0, 1.0))).round() as u8;
        let left = x0 + j as f64 * dx;
        let bottom = y0 + i as f64 * dy;
        Rectangle::new(
            [(left, bottom), (left + dx, bottom + dy)],
            RGBColor(shade, shade, shade).filled(),
        )
    }))?;

    let confidence = convert_to_stdev(&analysis.surface.mapv(f64::ln));
    draw_contours(&mut chart, mu, g, &confidence, RED.stroke_width(3), None)?;

    root.present()?;
    info!(path = %path.display(), "mixture likelihood written");

    Ok(())
}
