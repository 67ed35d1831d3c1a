//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs tracing
//! - parses CLI arguments and layers them over the config file
//! - runs the schedule / forward / compare workflows
//! - prints reports/plots
//! - writes optional exports

use std::fs::create_dir_all;
use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, CompareArgs, ForwardArgs, PhantomArgs, ScheduleArgs, ScheduleCmdArgs};
use crate::domain::{ExperimentConfig, PhantomConfig, ScheduleConfig};
use crate::error::AppError;
use crate::math::linspace;
use crate::schedule::NoiseSchedule;

pub mod pipeline;
pub mod telemetry;

/// Entry point for the `diffrecon` binary.
pub fn run() -> Result<(), AppError> {
    telemetry::init_tracing();

    // `diffrecon` with no subcommand behaves like `diffrecon forward`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let base = match &cli.config {
        Some(path) => crate::io::load_experiment_config(path)?,
        None => ExperimentConfig::default(),
    };

    match cli.command {
        Command::Schedule(args) => handle_schedule(args, &base),
        Command::Forward(args) => handle_forward(args, &base),
        Command::Compare(args) => handle_compare(args, &base),
    }
}

fn handle_schedule(args: ScheduleCmdArgs, base: &ExperimentConfig) -> Result<(), AppError> {
    let config = schedule_config_from_args(&args.schedule, base.schedule);
    let schedule = NoiseSchedule::from_config(&config)?;
    let steps = args.steps.unwrap_or_else(|| spread_steps(&schedule, 5));

    println!("{}", crate::report::format_schedule_summary(&schedule));
    println!("{}", crate::report::format_step_table(&schedule, &steps)?);

    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_schedule_plot(&schedule, args.width, args.height)
        );
    }

    if let Some(path) = &args.export_json {
        crate::io::write_schedule_json(path, &schedule)?;
        info!(path = %path.display(), "wrote schedule JSON");
    }

    Ok(())
}

fn handle_forward(args: ForwardArgs, base: &ExperimentConfig) -> Result<(), AppError> {
    let schedule = schedule_config_from_args(&args.schedule, base.schedule);
    let config = pipeline::ForwardConfig {
        schedule,
        phantom: phantom_config_from_args(&args.phantom, base.phantom),
        mask: args.mask,
        steps: args
            .steps
            .clone()
            .unwrap_or_else(|| pipeline::default_steps(schedule.timestep_count)),
        noise_seed: args.noise_seed,
    };
    let run = pipeline::run_forward(&config)?;

    println!("{}", crate::report::format_schedule_summary(&run.schedule));
    println!("Mask: {}\n", config.mask.display_name());

    let mut strip = vec![("x_0".to_string(), run.clean_image()?)];
    strip.extend(run.frames()?);
    println!("{}", crate::plot::render_strip(&strip, args.width, args.height));
    println!("{}", crate::report::format_frame_stats(&run.stats));

    // Optional exports.
    if let Some(path) = &args.export_csv {
        crate::io::write_frame_stats_csv(path, &run.stats)?;
        info!(path = %path.display(), "wrote frame statistics");
    }
    if let Some(dir) = &args.save_dir {
        save_frames(dir, &strip)?;
    }

    Ok(())
}

fn handle_compare(args: CompareArgs, base: &ExperimentConfig) -> Result<(), AppError> {
    let phantom = phantom_config_from_args(&args.phantom, base.phantom);
    let views = pipeline::run_compare(&phantom)?;

    let kspace: Vec<_> = views
        .iter()
        .map(|v| (format!("K-Space: {}", v.mask.display_name()), v.kspace_log.clone()))
        .collect();
    let images: Vec<_> = views
        .iter()
        .map(|v| (format!("Image: {}", v.mask.display_name()), v.image.clone()))
        .collect();

    println!("{}", crate::plot::render_strip(&kspace, args.width, args.height));
    println!("{}", crate::plot::render_strip(&images, args.width, args.height));
    Ok(())
}

fn save_frames(dir: &Path, frames: &[(String, nalgebra::DMatrix<f64>)]) -> Result<(), AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", dir.display())))?;
    for (index, (title, image)) in frames.iter().enumerate() {
        let path = dir.join(frame_file_name(index, title));
        crate::io::write_pgm(&path, image)?;
    }
    info!(dir = %dir.display(), count = frames.len(), "saved frames");
    Ok(())
}

/// `<index>_<title>.pgm`; the strip index keeps repeated timesteps apart.
fn frame_file_name(index: usize, title: &str) -> String {
    format!("{index:02}_{}.pgm", title.replace('=', "_"))
}

/// Layer explicit flags over `base` (defaults or config file).
pub fn schedule_config_from_args(args: &ScheduleArgs, base: ScheduleConfig) -> ScheduleConfig {
    ScheduleConfig {
        timestep_count: args.timesteps.unwrap_or(base.timestep_count),
        beta_start: args.beta_start.unwrap_or(base.beta_start),
        beta_end: args.beta_end.unwrap_or(base.beta_end),
    }
}

/// Layer explicit flags over `base` (defaults or config file).
pub fn phantom_config_from_args(args: &PhantomArgs, base: PhantomConfig) -> PhantomConfig {
    PhantomConfig {
        size: args.size.unwrap_or(base.size),
        slices: args.slices.unwrap_or(base.slices),
        seed: args.seed.unwrap_or(base.seed),
        noise_level: args.noise_level.unwrap_or(base.noise_level),
    }
}

/// `count` steps spread evenly over `[0, T-1]`, deduplicated.
fn spread_steps(schedule: &NoiseSchedule, count: usize) -> Vec<usize> {
    let mut steps: Vec<usize> = linspace(0.0, schedule.last_index() as f64, count)
        .into_iter()
        .map(|v| v.round() as usize)
        .collect();
    steps.dedup();
    steps
}

/// Rewrite argv so `diffrecon` defaults to `diffrecon forward`.
///
/// Rules:
/// - `diffrecon`                      -> `diffrecon forward`
/// - `diffrecon --steps 0,10 ...`     -> `diffrecon forward --steps 0,10 ...`
/// - `diffrecon --config x.toml schedule` -> unchanged (global flag before the subcommand)
/// - `diffrecon --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("forward".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // Global flags (`--config`) may precede the subcommand, so look past them.
    let has_subcommand = argv[1..]
        .iter()
        .any(|a| matches!(a.as_str(), "schedule" | "forward" | "compare"));
    if has_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "forward flags".
    if arg1.starts_with('-') {
        argv.insert(1, "forward".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_forward() {
        assert_eq!(rewrite_args(argv(&["diffrecon"])), argv(&["diffrecon", "forward"]));
        assert_eq!(
            rewrite_args(argv(&["diffrecon", "--config", "x.toml"])),
            argv(&["diffrecon", "forward", "--config", "x.toml"])
        );
        assert_eq!(rewrite_args(argv(&["diffrecon", "--help"])), argv(&["diffrecon", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["diffrecon", "schedule"])),
            argv(&["diffrecon", "schedule"])
        );
    }

    #[test]
    fn global_config_before_subcommand_is_kept() {
        let rewritten = rewrite_args(argv(&["diffrecon", "--config", "x.toml", "schedule"]));
        assert_eq!(rewritten, argv(&["diffrecon", "--config", "x.toml", "schedule"]));

        let cli = crate::cli::Cli::try_parse_from(rewritten).unwrap();
        assert_eq!(cli.config, Some(std::path::PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Schedule(_)));
    }

    #[test]
    fn repeated_steps_get_distinct_frame_files() {
        let titles = ["x_0", "t=5", "t=5"];
        let names: Vec<String> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| frame_file_name(i, t))
            .collect();
        assert_eq!(names, vec!["00_x_0.pgm", "01_t_5.pgm", "02_t_5.pgm"]);
    }

    #[test]
    fn flags_override_config_file_values() {
        let base = ScheduleConfig {
            timestep_count: 500,
            beta_start: 1e-3,
            beta_end: 0.05,
        };
        let args = ScheduleArgs {
            timesteps: None,
            beta_start: None,
            beta_end: Some(0.03),
        };
        let cfg = schedule_config_from_args(&args, base);
        assert_eq!(cfg.timestep_count, 500);
        assert_eq!(cfg.beta_start, 1e-3);
        assert_eq!(cfg.beta_end, 0.03);

        let phantom = phantom_config_from_args(
            &PhantomArgs {
                seed: Some(1),
                ..PhantomArgs::default()
            },
            PhantomConfig::default(),
        );
        assert_eq!(phantom.seed, 1);
        assert_eq!(phantom.size, PhantomConfig::default().size);
    }

    #[test]
    fn spread_steps_cover_schedule_ends() {
        let s = NoiseSchedule::build(1000, 1e-4, 0.02).unwrap();
        assert_eq!(spread_steps(&s, 5), vec![0, 250, 500, 749, 999]);
        let tiny = NoiseSchedule::build(2, 1e-4, 0.02).unwrap();
        assert_eq!(spread_steps(&tiny, 5), vec![0, 1]);
    }
}
