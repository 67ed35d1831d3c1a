//! Read/write schedule JSON files.
//!
//! Schedule JSON is the portable record of a run's noise schedule:
//! - the three builder parameters
//! - every derived per-step table, for plotting elsewhere
//!
//! Tables are informational. [`ScheduleFile::rebuild`] always re-derives the
//! schedule from the parameters.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ScheduleConfig;
use crate::error::AppError;
use crate::schedule::NoiseSchedule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub config: ScheduleConfig,
    pub betas: Vec<f64>,
    pub alphas: Vec<f64>,
    pub alphas_cumprod: Vec<f64>,
    pub sqrt_alphas_cumprod: Vec<f64>,
    pub sqrt_one_minus_alphas_cumprod: Vec<f64>,
}

impl ScheduleFile {
    pub fn from_schedule(schedule: &NoiseSchedule) -> Self {
        Self {
            tool: "diffrecon".to_string(),
            generated: Utc::now(),
            config: *schedule.config(),
            betas: schedule.betas().to_vec(),
            alphas: schedule.alphas().to_vec(),
            alphas_cumprod: schedule.alphas_cumprod().to_vec(),
            sqrt_alphas_cumprod: schedule.sqrt_alphas_cumprod().to_vec(),
            sqrt_one_minus_alphas_cumprod: schedule.sqrt_one_minus_alphas_cumprod().to_vec(),
        }
    }

    pub fn rebuild(&self) -> Result<NoiseSchedule, AppError> {
        Ok(NoiseSchedule::from_config(&self.config)?)
    }
}

/// Write a schedule JSON file.
pub fn write_schedule_json(path: &Path, schedule: &NoiseSchedule) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| {
            AppError::new(4, format!("Failed to create schedule JSON '{}': {e}", path.display()))
        })?;
    serde_json::to_writer_pretty(file, &ScheduleFile::from_schedule(schedule))
        .map_err(|e| AppError::new(4, format!("Failed to write schedule JSON: {e}")))?;
    Ok(())
}

/// Read a schedule JSON file.
pub fn read_schedule_json(path: &Path) -> Result<ScheduleFile, AppError> {
    let file = File::open(path)
        .map_err(|e| {
            AppError::new(2, format!("Failed to open schedule JSON '{}': {e}", path.display()))
        })?;
    let schedule: ScheduleFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid schedule JSON: {e}")))?;
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_rebuilds_identical_schedule() {
        let s = NoiseSchedule::build(50, 1e-4, 0.02).unwrap();
        let path =
            std::env::temp_dir().join(format!("diffrecon_schedule_{}.json", std::process::id()));
        write_schedule_json(&path, &s).unwrap();
        let file = read_schedule_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(file.tool, "diffrecon");
        assert_eq!(file.betas.len(), 50);
        assert_eq!(file.rebuild().unwrap(), s);
    }

    #[test]
    fn rebuild_rejects_tampered_config() {
        let mut file = ScheduleFile::from_schedule(&NoiseSchedule::build(5, 1e-4, 0.02).unwrap());
        file.config.beta_end = 1.5;
        assert_eq!(file.rebuild().unwrap_err().exit_code(), 2);
    }
}
