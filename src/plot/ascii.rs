//! ASCII plotting of diagnostics for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - spectrum plot: mean flux `-`, passband throughput `=`
//! - fit plot: integrated intensities `o`, one glyph per law curve

use crate::diagnostics::{DiagnosticsSink, FitDiagnostics, SpectrumDiagnostics};
use crate::domain::LawKind;

/// Diagnostics sink that renders each payload to a string.
#[derive(Debug, Clone)]
pub struct AsciiPlotter {
    pub width: usize,
    pub height: usize,
    pub spectrum: Option<String>,
    pub fit: Option<String>,
}

impl AsciiPlotter {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            spectrum: None,
            fit: None,
        }
    }
}

impl Default for AsciiPlotter {
    fn default() -> Self {
        Self::new(100, 25)
    }
}

impl DiagnosticsSink for AsciiPlotter {
    fn on_spectrum(&mut self, spectrum: SpectrumDiagnostics) {
        self.spectrum = Some(render_spectrum_plot(&spectrum, self.width, self.height));
    }

    fn on_fit(&mut self, fit: FitDiagnostics) {
        self.fit = Some(render_fit_plot(&fit, self.width, self.height));
    }
}

/// Glyph used for a law's fitted curve.
pub fn law_glyph(law: LawKind) -> char {
    match law {
        LawKind::Linear => 'l',
        LawKind::Quadratic => 'q',
        LawKind::ThreeParamNonlin => '3',
        LawKind::FourParamNonlin => '4',
    }
}

/// Render the mean spectrum with the passband overlaid.
///
/// The x-range runs from the first resampled wavelength to the plot limit
/// (or the end of the axis when no limit was found).
pub fn render_spectrum_plot(d: &SpectrumDiagnostics, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Start at the resampled axis, not 0 nm: a narrow channel would otherwise
    // collapse into the last few columns.
    let x_min = d.wavelength_nm.first().copied().unwrap_or(0.0);
    let x_max = d
        .plot_limit_nm
        .or_else(|| d.wavelength_nm.last().copied())
        .unwrap_or(1.0);
    let (x_min, x_max) = if x_max > x_min { (x_min, x_max) } else { (x_min, x_min + 1.0) };
    let (y_min, y_max) = pad_range(0.0, 1.0, 0.05);

    // The resampled axis is far denser than the plot; keep a few points per column.
    let stride = (d.wavelength_nm.len() / (width * 4)).max(1);
    let spectrum: Vec<(f64, f64)> = d
        .wavelength_nm
        .iter()
        .zip(d.mean_flux.iter())
        .step_by(stride)
        .map(|(&w, &f)| (w, f))
        .collect();
    let passband: Vec<(f64, f64)> = d
        .passband_wavelength_nm
        .iter()
        .zip(d.passband_throughput.iter())
        .map(|(&w, &s)| (w, s))
        .collect();

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &passband, (x_min, x_max), (y_min, y_max), '=');
    draw_curve(&mut grid, &spectrum, (x_min, x_max), (y_min, y_max), '-');

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: wavelength=[{x_min:.3}, {x_max:.3}] nm | normalised flux=[{y_min:.2}, {y_max:.2}]\n"
    ));
    push_grid(&mut out, grid);
    out.push_str("Legend: - mean stellar intensity | = passband\n");
    out
}

/// Render integrated intensities with every fitted law curve.
pub fn render_fit_plot(d: &FitDiagnostics, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = (0.0, 1.0);
    let all_y = d
        .integrated
        .iter()
        .chain(d.curves.iter().flat_map(|c| c.fitted.iter()));
    let (y_min, y_max) = value_range(all_y).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for curve in &d.curves {
        let mut pts: Vec<(f64, f64)> = curve.mu.iter().copied().zip(curve.fitted.iter().copied()).collect();
        pts.sort_by(|a, b| a.0.total_cmp(&b.0));
        draw_curve(&mut grid, &pts, (x_min, x_max), (y_min, y_max), law_glyph(curve.law));
    }

    for (&mu, &y) in d.mu.iter().zip(d.integrated.iter()) {
        let x = map_x(mu, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: mu=[{x_min:.3}, {x_max:.3}] | I/I0=[{y_min:.3}, {y_max:.3}]\n"
    ));
    push_grid(&mut out, grid);

    let mut legend = String::from("Legend: o integrated");
    for curve in &d.curves {
        legend.push_str(&format!(" | {} {}", law_glyph(curve.law), curve.law.name()));
    }
    out.push_str(&legend);
    out.push('\n');
    out
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

fn value_range<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && max_y.is_finite() {
        // Flat data: centre a unit-height window on it.
        Some((min_y - 0.5, max_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_range: (f64, f64), y_range: (f64, f64), ch: char) {
    if curve.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let xx = map_x(x, x_range.0, x_range.1, width);
        let yy = map_y(y, y_range.0, y_range.1, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, ch);
        } else if grid[yy][xx] == ' ' {
            grid[yy][xx] = ch;
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
