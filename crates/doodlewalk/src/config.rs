//! Runner configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `doodlewalk.ron` file, or the file passed with `--config` (if exists)
//! 3. Environment variables prefixed with `DOODLEWALK_`
//!
//! Example environment variable: `DOODLEWALK_CREATURE__GAIT__STUCK_LIMIT=150`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use doodlewalk_creature::{CreatureConfig, EngineConfig};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Main runner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub creature: CreatureConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub run: RunConfig,
}

/// Headless run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulation ticks to run
    pub ticks: u64,
    /// Seed for every stochastic choice (colors, gait setup, adaptation)
    pub seed: u64,
    /// Physics runs on every N-th frame; the others only re-render
    pub physics_every: u32,
    /// Log a progress line every N ticks (0 disables)
    pub report_every: u64,
    /// Where the main body's centroid is placed when no shape file says otherwise
    pub baseline: Vec2,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 3000,
            seed: 0,
            physics_every: 3,
            report_every: 600,
            baseline: Vec2::new(400.0, 300.0),
        }
    }
}

impl RunnerConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `path`, or `doodlewalk.ron` in the working directory (if exists)
    /// 3. Environment variables prefixed with `DOODLEWALK_` (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults =
            Config::try_from(&RunnerConfig::default()).context("Failed to encode default configuration")?;

        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("doodlewalk")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .add_source(defaults)
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (DOODLEWALK_RUN__TICKS, etc.)
            .add_source(
                Environment::with_prefix("DOODLEWALK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
