//! Headless creature runs
//!
//! Loads a drawing from a RON shape file (or uses the built-in demo), builds
//! the creature on the rapier backend and drives it for a fixed number of
//! ticks, logging progress along the way.

mod runner;
mod shapes;

pub use runner::{run_headless, RunSummary};
pub use shapes::ShapeFile;
