//! Small numeric helpers shared by the schedule builder.

pub mod spacing;

pub use spacing::*;
