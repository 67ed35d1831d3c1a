//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the schedule/noise code stays clean and testable
//! - output changes are localized

use crate::error::DiffusionError;
use crate::report::FrameStats;
use crate::schedule::NoiseSchedule;

/// Header block describing a schedule.
pub fn format_schedule_summary(schedule: &NoiseSchedule) -> String {
    let cfg = schedule.config();
    let ac = schedule.alphas_cumprod();
    let snr = schedule.snr();
    let last = schedule.last_index();

    let mut out = String::new();
    out.push_str("=== diffrecon - linear noise schedule ===\n");
    out.push_str(&format!("Timesteps: T={}\n", schedule.timestep_count()));
    out.push_str(&format!(
        "Betas: [{:.3e} .. {:.3e}]{}\n",
        cfg.beta_start,
        cfg.beta_end,
        if cfg.beta_start > cfg.beta_end { " (decreasing)" } else { "" }
    ));
    out.push_str(&format!(
        "alpha_bar: t=0 {:.6} | t={last} {:.6e}\n",
        ac[0], ac[last]
    ));
    out.push_str(&format!(
        "SNR: t=0 {} | t={last} {}\n",
        fmt_snr(snr[0]),
        fmt_snr(snr[last])
    ));
    out
}

/// One row per requested step.
pub fn format_step_table(
    schedule: &NoiseSchedule,
    steps: &[usize],
) -> Result<String, DiffusionError> {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>6}  {:>10}  {:>12}  {:>12}  {:>14}  {:>12}\n",
        "t", "beta", "alpha_bar", "sqrt(ab)", "sqrt(1-ab)", "snr"
    ));
    let snr = schedule.snr();
    for &t in steps {
        let (c1, c2) = schedule.coefficients(t)?;
        out.push_str(&format!(
            "{:>6}  {:>10.4e}  {:>12.6e}  {:>12.6}  {:>14.6}  {:>12}\n",
            t,
            schedule.betas()[t],
            schedule.alphas_cumprod()[t],
            c1,
            c2,
            fmt_snr(snr[t])
        ));
    }
    Ok(out)
}

/// Per-frame statistics table.
pub fn format_frame_stats(stats: &[FrameStats]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>6}  {:>8}  {:>8}  {:>9}  {:>8}  {:>9}  {:>9}  {:>8}\n",
        "t", "signal", "noise", "mean", "std", "min", "max", "corr_x0"
    ));
    for s in stats {
        out.push_str(&format!(
            "{:>6}  {:>8.5}  {:>8.5}  {:>9.4}  {:>8.4}  {:>9.4}  {:>9.4}  {:>8.4}\n",
            s.t, s.signal_coef, s.noise_coef, s.mean, s.std, s.min, s.max, s.corr_with_clean
        ));
    }
    out
}

fn fmt_snr(v: f64) -> String {
    if v.is_finite() { format!("{v:.4e}") } else { "inf".to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_endpoints() {
        let s = NoiseSchedule::build(1000, 1e-4, 0.02).unwrap();
        let txt = format_schedule_summary(&s);
        assert!(txt.contains("T=1000"));
        assert!(txt.contains("t=0 0.999900"));
        assert!(txt.contains("t=999"));
        assert!(!txt.contains("decreasing"));
    }

    #[test]
    fn summary_flags_decreasing_schedule() {
        let s = NoiseSchedule::build(10, 0.02, 1e-4).unwrap();
        assert!(format_schedule_summary(&s).contains("(decreasing)"));
    }

    #[test]
    fn step_table_has_one_row_per_step() {
        let s = NoiseSchedule::build(1000, 1e-4, 0.02).unwrap();
        let txt = format_step_table(&s, &[0, 50, 999]).unwrap();
        assert_eq!(txt.lines().count(), 4);
        assert!(txt.lines().nth(1).unwrap().contains("0.999950"));
    }

    #[test]
    fn step_table_rejects_invalid_step() {
        let s = NoiseSchedule::build(10, 1e-4, 0.02).unwrap();
        assert!(format_step_table(&s, &[3, 10]).is_err());
    }

    #[test]
    fn frame_table_formats_rows() {
        let row = FrameStats {
            t: 50,
            signal_coef: 0.9,
            noise_coef: 0.4,
            mean: 0.1,
            std: 0.5,
            min: -1.0,
            max: 2.0,
            corr_with_clean: 0.8,
        };
        let txt = format_frame_stats(&[row]);
        assert_eq!(txt.lines().count(), 2);
        assert!(txt.contains("0.90000"));
    }
}
