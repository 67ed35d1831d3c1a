//! Noise schedule construction.
//!
//! The schedule is built once per configuration and then only read. Every
//! forward-noising call borrows it; nothing mutates it after `build`.

pub mod builder;

pub use builder::*;
