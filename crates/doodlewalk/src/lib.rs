//! Doodlewalk - headless runner for hand-drawn walking creatures

pub mod config;
pub mod headless;

pub use config::{RunConfig, RunnerConfig};
pub use headless::{run_headless, RunSummary, ShapeFile};
