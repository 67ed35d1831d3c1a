//! Input/output helpers.
//!
//! - experiment TOML loading (`config`)
//! - schedule JSON read/write (`schedule`)
//! - frame CSV and PGM image exports (`export`)

pub mod config;
pub mod export;
pub mod schedule;

pub use config::*;
pub use export::*;
pub use schedule::*;
