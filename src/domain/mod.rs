//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration values (`ScheduleConfig`, `PhantomConfig`, `ExperimentConfig`)
//! - the k-space mask selector (`MaskKind`)
//! - batched signal tensors (`Signal`) and their element type (`Scalar`)

pub mod signal;
pub mod types;

pub use signal::*;
pub use types::*;
