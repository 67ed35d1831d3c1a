//! Error types.
//!
//! Two layers:
//!
//! - [`DiffusionError`]: what the schedule builder and forward noiser return.
//!   Each failure category is its own variant so callers can match on it.
//! - [`AppError`]: what the binary reports. It pairs a message with the
//!   process exit code.

use thiserror::Error;

/// Errors raised by the diffusion core (schedule construction, forward noising,
/// signal construction).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiffusionError {
    /// Invalid schedule parameters.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A timestep index outside `[0, timestep_count - 1]`.
    #[error("timestep index {index} is out of range for a schedule of {timestep_count} steps")]
    TimestepOutOfRange { index: usize, timestep_count: usize },

    /// Two quantities that must agree in size do not.
    #[error("shape mismatch ({what}): expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    /// A signal whose shape does not describe its data buffer.
    #[error("invalid signal: {message}")]
    InvalidSignal { message: String },
}

impl DiffusionError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<DiffusionError> for AppError {
    fn from(err: DiffusionError) -> Self {
        let code = match err {
            DiffusionError::Configuration { .. } => 2,
            _ => 3,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_map_to_usage_exit_code() {
        let err: AppError = DiffusionError::configuration("bad beta").into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("bad beta"));
    }

    #[test]
    fn index_errors_map_to_data_exit_code() {
        let err: AppError = DiffusionError::TimestepOutOfRange {
            index: 10,
            timestep_count: 10,
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("10 steps"));
    }
}
