//! ASCII rendering for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Two kinds of plots:
//! - grayscale images (`render_image`, `render_strip`), autoscaled per image
//! - schedule curves over `t` (`render_schedule_plot`): `s` for the signal
//!   coefficient `sqrt(ᾱ_t)`, `n` for the noise coefficient `sqrt(1-ᾱ_t)`

use nalgebra::DMatrix;

use crate::schedule::NoiseSchedule;

/// Grayscale ramp, darkest first.
const RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const MIN_WIDTH: usize = 4;
const MIN_HEIGHT: usize = 2;

/// Render an image as `height` lines of `width` characters.
///
/// Each character is the mean of the source pixels it covers, mapped onto the
/// ramp between the image's own min and max.
pub fn render_image(image: &DMatrix<f64>, width: usize, height: usize) -> String {
    let mut out = String::new();
    for line in image_lines(image, width, height) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Render titled images side by side.
pub fn render_strip(frames: &[(String, DMatrix<f64>)], width: usize, height: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let height = height.max(MIN_HEIGHT);

    let rendered: Vec<Vec<String>> = frames
        .iter()
        .map(|(_, img)| image_lines(img, width, height))
        .collect();

    let mut out = String::new();
    let titles: Vec<String> = frames
        .iter()
        .map(|(title, _)| fit_to_width(title, width))
        .collect();
    out.push_str(titles.join("  ").trim_end());
    out.push('\n');

    for row in 0..height {
        let line: Vec<&str> = rendered.iter().map(|lines| lines[row].as_str()).collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Plot the signal and noise coefficients of a schedule against `t`.
pub fn render_schedule_plot(schedule: &NoiseSchedule, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let t_max = schedule.last_index() as f64;
    let t_span = t_max.max(1.0);

    let signal = sample_series(schedule.sqrt_alphas_cumprod(), width);
    let noise = sample_series(schedule.sqrt_one_minus_alphas_cumprod(), width);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &noise, t_span, 'n');
    draw_curve(&mut grid, &signal, t_span, 's');

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[0, {t_max:.0}] | coef=[0, 1] | s=sqrt(alpha_bar) n=sqrt(1-alpha_bar)\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn image_lines(image: &DMatrix<f64>, width: usize, height: usize) -> Vec<String> {
    let width = width.max(MIN_WIDTH);
    let height = height.max(MIN_HEIGHT);
    let (h, w) = image.shape();
    if h == 0 || w == 0 {
        return vec![" ".repeat(width); height];
    }

    let (lo, hi) = value_range(image);
    let span = hi - lo;

    (0..height)
        .map(|r| {
            let rows = block(r, height, h);
            (0..width)
                .map(|c| {
                    let cols = block(c, width, w);
                    let mut sum = 0.0;
                    let mut n = 0usize;
                    for i in rows.clone() {
                        for j in cols.clone() {
                            sum += image[(i, j)];
                            n += 1;
                        }
                    }
                    let mean = sum / n as f64;
                    let u = if span > 0.0 { (mean - lo) / span } else { 0.0 };
                    let level = (u.clamp(0.0, 1.0) * (RAMP.len() - 1) as f64).round() as usize;
                    RAMP[level]
                })
                .collect::<String>()
        })
        .collect()
}

/// Source index range covered by output cell `cell` of `cells` over `len` pixels.
fn block(cell: usize, cells: usize, len: usize) -> std::ops::Range<usize> {
    let start = (cell * len / cells).min(len - 1);
    let end = ((cell + 1) * len / cells).clamp(start + 1, len);
    start..end
}

fn value_range(image: &DMatrix<f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in image.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 0.0)
    }
}

fn fit_to_width(text: &str, width: usize) -> String {
    let mut s: String = text.chars().take(width).collect();
    let pad = width - s.chars().count();
    s.push_str(&" ".repeat(pad));
    s
}

/// `n` evenly spaced `(t, value)` samples of a per-step series.
fn sample_series(values: &[f64], n: usize) -> Vec<(f64, f64)> {
    let last = values.len().saturating_sub(1);
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let idx = (u * last as f64).round() as usize;
            (idx as f64, values[idx])
        })
        .collect()
}

fn map_x(t: f64, t_span: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (t / t_span).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = y.clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_span: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_span, width);
        let yy = map_y(y, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, ch);
        } else {
            grid[yy][x] = ch;
        }
        prev = Some((x, yy));
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
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
