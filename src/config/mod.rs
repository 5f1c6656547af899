//! Configuration module
//!
//! Handles map feature switches, detection thresholds and region layout.

pub mod settings;

pub use settings::{AmbushMode, ConfigError, Settings};
