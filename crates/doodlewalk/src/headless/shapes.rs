//! Drawings stored as RON shape files
//!
//! A shape file is what the drawing surface hands over: finished, ordered
//! point lists, one per closed stroke, plus an optional placement.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeFile {
    /// Main-body centroid placement; the run config's baseline when absent
    #[serde(default)]
    pub baseline: Option<Vec2>,
    pub shapes: Vec<Vec<Vec2>>,
}

impl ShapeFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read shape file {}", path.display()))?;
        let file: ShapeFile = ron::from_str(&text)
            .with_context(|| format!("Failed to parse shape file {}", path.display()))?;
        log::info!(
            "Loaded {} shapes from {}",
            file.shapes.len(),
            path.display()
        );
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize shapes")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write shape file {}", path.display()))
    }

    /// Built-in four-legged doodle: a rounded torso with two legs per side
    pub fn demo() -> Self {
        let torso: Vec<Vec2> = (0..12)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / 12.0;
                Vec2::new(100.0 + angle.cos() * 45.0, 100.0 + angle.sin() * 22.0)
            })
            .collect();

        let leg = |top: Vec2, lean: f32| {
            vec![
                top,
                top + Vec2::new(6.0, 0.0),
                top + Vec2::new(6.0 + lean, 30.0),
                top + Vec2::new(lean, 30.0),
            ]
        };

        Self {
            baseline: None,
            shapes: vec![
                torso,
                leg(Vec2::new(56.0, 108.0), -4.0),
                leg(Vec2::new(72.0, 124.0), -2.0),
                leg(Vec2::new(122.0, 124.0), 2.0),
                leg(Vec2::new(138.0, 108.0), 4.0),
            ],
        }
    }
}
