//! Experiment configuration files (TOML).

use std::fs;
use std::path::Path;

use crate::domain::ExperimentConfig;
use crate::error::AppError;

/// Load an experiment TOML file. Missing tables/keys fall back to defaults.
pub fn load_experiment_config(path: &Path) -> Result<ExperimentConfig, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
    parse_experiment_config(&text)
        .map_err(|e| AppError::new(2, format!("Invalid config '{}': {e}", path.display())))
}

pub fn parse_experiment_config(text: &str) -> Result<ExperimentConfig, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PhantomConfig, ScheduleConfig};

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_experiment_config("").unwrap(), ExperimentConfig::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let cfg = parse_experiment_config(
            "[schedule]\ntimestep_count = 250\n\n[phantom]\nseed = 9\n",
        )
        .unwrap();
        assert_eq!(
            cfg.schedule,
            ScheduleConfig {
                timestep_count: 250,
                ..ScheduleConfig::default()
            }
        );
        assert_eq!(
            cfg.phantom,
            PhantomConfig {
                seed: 9,
                ..PhantomConfig::default()
            }
        );
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let err = load_experiment_config(Path::new("does/not/exist.toml")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
