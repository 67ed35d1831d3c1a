//! Command-line parsing for the diffusion forward-process explorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the schedule/noise code.
//!
//! Every numeric flag is optional: unset flags fall back to the `--config` file,
//! then to built-in defaults (see `app::schedule_config_from_args`).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::MaskKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "diffrecon",
    version,
    about = "Forward diffusion on reconstructed MRI slices (noise schedules + noising)"
)]
pub struct Cli {
    /// Experiment TOML file with optional [schedule] and [phantom] tables.
    #[arg(long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a noise schedule and print its summary, step table and coefficient plot.
    Schedule(ScheduleCmdArgs),
    /// Noise a reconstructed slice at several timesteps and show the progression.
    Forward(ForwardArgs),
    /// Show log k-space and reconstructed image for each frequency mask.
    Compare(CompareArgs),
}

/// Noise schedule parameters.
#[derive(Debug, Args, Clone, Default)]
pub struct ScheduleArgs {
    /// Total diffusion steps (T). [default: 1000]
    #[arg(short = 'T', long)]
    pub timesteps: Option<usize>,

    /// Beta at the first step. [default: 1e-4]
    #[arg(long)]
    pub beta_start: Option<f64>,

    /// Beta at the last step. [default: 0.02]
    #[arg(long)]
    pub beta_end: Option<f64>,
}

/// Synthetic measurement volume parameters.
#[derive(Debug, Args, Clone, Default)]
pub struct PhantomArgs {
    /// Image side in pixels. [default: 128]
    #[arg(long)]
    pub size: Option<usize>,

    /// Number of slices in the volume (the middle one is used). [default: 5]
    #[arg(long)]
    pub slices: Option<usize>,

    /// Phantom seed. [default: 42]
    #[arg(long)]
    pub seed: Option<u64>,

    /// Complex k-space noise relative to the peak magnitude. [default: 0]
    #[arg(long)]
    pub noise_level: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct ScheduleCmdArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,

    /// Timesteps to tabulate (comma-separated). Defaults to five evenly spread steps.
    #[arg(long, value_delimiter = ',')]
    pub steps: Option<Vec<usize>>,

    /// Disable the coefficient plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the schedule (parameters + per-step tables) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ForwardArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,

    #[command(flatten)]
    pub phantom: PhantomArgs,

    /// Frequency mask applied before reconstruction.
    #[arg(long, value_enum, default_value_t = MaskKind::None)]
    pub mask: MaskKind,

    /// Timesteps to visualize (comma-separated).
    /// Defaults to 0,50,150,400,999 scaled to the schedule length.
    #[arg(long, value_delimiter = ',')]
    pub steps: Option<Vec<usize>>,

    /// Seed for the Gaussian noise stream.
    #[arg(long, default_value_t = 0)]
    pub noise_seed: u64,

    /// Frame width (columns).
    #[arg(long, default_value_t = 32)]
    pub width: usize,

    /// Frame height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export per-frame statistics to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Save the clean image and each noised frame as PGM into this directory.
    #[arg(long = "save-dir", value_name = "DIR")]
    pub save_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub phantom: PhantomArgs,

    /// Frame width (columns).
    #[arg(long, default_value_t = 32)]
    pub width: usize,

    /// Frame height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_parses_steps_and_mask() {
        let cli = Cli::parse_from([
            "diffrecon", "forward", "--steps", "0,10,20", "--mask", "low-pass", "-T", "100",
        ]);
        let Command::Forward(args) = cli.command else {
            panic!("expected forward");
        };
        assert_eq!(args.steps, Some(vec![0, 10, 20]));
        assert_eq!(args.mask, MaskKind::LowPass);
        assert_eq!(args.schedule.timesteps, Some(100));
        assert!(args.schedule.beta_start.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["diffrecon", "schedule", "--config", "exp.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("exp.toml")));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
