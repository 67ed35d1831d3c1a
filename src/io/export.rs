//! Export per-frame results.
//!
//! - frame statistics as CSV (easy to consume in spreadsheets or scripts)
//! - images as binary 8-bit PGM, viewable with most image tools

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::DMatrix;

use crate::error::AppError;
use crate::report::FrameStats;

/// Write frame statistics to a CSV file.
pub fn write_frame_stats_csv(path: &Path, stats: &[FrameStats]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| {
            AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display()))
        })?;
    let mut w = BufWriter::new(file);

    writeln!(w, "t,signal_coef,noise_coef,mean,std,min,max,corr_with_clean")
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;
    for s in stats {
        writeln!(
            w,
            "{},{:.10},{:.10},{:.10},{:.10},{:.10},{:.10},{:.10}",
            s.t, s.signal_coef, s.noise_coef, s.mean, s.std, s.min, s.max, s.corr_with_clean
        )
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }
    w.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write an image as binary PGM (P5), linearly scaled from its min/max to 0..255.
pub fn write_pgm(path: &Path, image: &DMatrix<f64>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| {
            AppError::new(4, format!("Failed to create image '{}': {e}", path.display()))
        })?;
    let mut w = BufWriter::new(file);
    w.write_all(&encode_pgm(image))
        .and_then(|_| w.flush())
        .map_err(|e| AppError::new(4, format!("Failed to write image '{}': {e}", path.display())))?;
    Ok(())
}

fn encode_pgm(image: &DMatrix<f64>) -> Vec<u8> {
    let (h, w) = image.shape();
    let lo = image.iter().copied().filter(|v| v.is_finite()).fold(f64::INFINITY, f64::min);
    let hi = image.iter().copied().filter(|v| v.is_finite()).fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;

    let mut out = format!("P5\n{w} {h}\n255\n").into_bytes();
    out.reserve(h * w);
    for i in 0..h {
        for j in 0..w {
            let v = image[(i, j)];
            let u = if span > 0.0 && v.is_finite() { (v - lo) / span } else { 0.0 };
            out.push((u.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
    }
    out
}
