//! Tuning for assembly, gait, contact tracking and separation correction
//!
//! Every section deserializes with `#[serde(default)]`, so config files
//! only need to name the values they change.

use serde::{Deserialize, Serialize};

use crate::traits::MaterialProperties;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    pub assembly: AssemblyConfig,
    pub gait: GaitConfig,
    pub contact: ContactConfig,
    pub separation: SeparationConfig,
}

/// How the main body is picked among the drawn polygons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MainBodySelection {
    /// Largest shoelace area
    #[default]
    Area,
    /// Most vertices (cheap, but a densely drawn small shape wins)
    VertexCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub main_body_selection: MainBodySelection,
    /// Shared no-self-collision group for every part of one creature
    pub collision_group: u32,
    pub body_friction: f32,
    pub body_restitution: f32,
    pub body_air_friction: f32,
    /// Body density = clamp(area / divisor, min, max)
    pub body_density_divisor: f32,
    pub body_density_min: f32,
    pub body_density_max: f32,
    pub appendage_friction: f32,
    pub appendage_restitution: f32,
    pub appendage_air_friction: f32,
    pub appendage_density_divisor: f32,
    pub appendage_density_min: f32,
    pub appendage_density_max: f32,
    pub primary_stiffness: f32,
    pub stabilizer_stiffness: f32,
    pub joint_damping: f32,
    /// Distance of the stabilizing anchors from the primary anchor
    pub stabilizer_offset: f32,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            main_body_selection: MainBodySelection::Area,
            collision_group: 1,
            body_friction: 0.7,
            body_restitution: 0.1,
            body_air_friction: 0.02,
            body_density_divisor: 5000.0,
            body_density_min: 0.1,
            body_density_max: 0.2,
            appendage_friction: 0.4,
            appendage_restitution: 0.2,
            appendage_air_friction: 0.03,
            appendage_density_divisor: 30000.0,
            appendage_density_min: 0.002,
            appendage_density_max: 0.01,
            primary_stiffness: 1.0,
            stabilizer_stiffness: 0.7,
            joint_damping: 0.5,
            stabilizer_offset: 5.0,
        }
    }
}

impl AssemblyConfig {
    /// Heavy, grippy, low-bounce material for the torso
    pub fn body_material(&self, area: f32) -> MaterialProperties {
        MaterialProperties {
            friction: self.body_friction,
            restitution: self.body_restitution,
            density: (area / self.body_density_divisor)
                .clamp(self.body_density_min, self.body_density_max),
            air_friction: self.body_air_friction,
            collision_group: Some(self.collision_group),
        }
    }

    /// Lighter, draggier material for limbs
    pub fn appendage_material(&self, area: f32) -> MaterialProperties {
        MaterialProperties {
            friction: self.appendage_friction,
            restitution: self.appendage_restitution,
            density: (area / self.appendage_density_divisor)
                .clamp(self.appendage_density_min, self.appendage_density_max),
            air_friction: self.appendage_air_friction,
            collision_group: Some(self.collision_group),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitConfig {
    /// Hill-climbing adaptation when true, fixed oscillators otherwise
    pub adaptive: bool,
    /// Oscillator clock advance per tick
    pub simulation_speed: f32,
    /// Bound of the per-tick random adaptation delta
    pub learning_rate: f32,
    /// Accumulated adaptation is clamped to +/- this
    pub max_adaptation: f32,
    pub forward_bias: f32,
    pub appendage_bias_factor: f32,
    pub body_bias_factor: f32,
    /// Force scale = 1 / (1 + coefficient * mass)
    pub mass_scale_coefficient: f32,
    pub max_amplitude: f32,
    pub amplitude_boost: f32,
    pub success_threshold: f32,
    pub stuck_threshold: f32,
    pub stuck_limit: u32,
    pub randomize_probability: f32,
    /// Weight of the current value when blending toward a remembered snapshot
    pub blend_keep: f32,
    pub history_limit: usize,
    /// Extra jitter oscillator chance per body part
    pub jitter_probability: f32,
    pub direction_x_min: f32,
    pub direction_x_max: f32,
    pub direction_y_min: f32,
    pub direction_y_max: f32,
    /// Same-side limbs in the same phase are scaled by this
    pub sync_damping: f32,
    /// Preferred horizontal distance of a limb from the body centre
    pub ideal_limb_offset: f32,
    pub centering_coefficient: f32,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            adaptive: true,
            simulation_speed: 0.005,
            learning_rate: 0.0001,
            max_adaptation: 0.01,
            forward_bias: 0.05,
            appendage_bias_factor: 0.05,
            body_bias_factor: 0.01,
            mass_scale_coefficient: 50.0,
            max_amplitude: 0.005,
            amplitude_boost: 1.05,
            success_threshold: 0.5,
            stuck_threshold: 0.1,
            stuck_limit: 100,
            randomize_probability: 0.3,
            blend_keep: 0.7,
            history_limit: 50,
            jitter_probability: 0.3,
            direction_x_min: -1.5,
            direction_x_max: 1.5,
            direction_y_min: -1.0,
            direction_y_max: 0.5,
            sync_damping: 0.8,
            ideal_limb_offset: 50.0,
            centering_coefficient: 0.0002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Ticks a part keeps animating after it leaves the ground
    pub decay_window: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self { decay_window: 20.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// Largest allowed gap between paired attachment points
    pub tolerance: f32,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self { tolerance: 2.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CreatureConfig::default();
        assert_eq!(config.gait.stuck_limit, 100);
        assert_eq!(config.contact.decay_window, 20.0);
        assert_eq!(config.separation.tolerance, 2.0);
        assert_eq!(config.assembly.main_body_selection, MainBodySelection::Area);
    }

    #[test]
    fn test_density_clamped() {
        let config = AssemblyConfig::default();
        assert_eq!(config.body_material(100.0).density, 0.1);
        assert_eq!(config.body_material(1_000_000.0).density, 0.2);
        assert!((config.body_material(750.0).density - 0.15).abs() < 1e-6);
        assert_eq!(config.appendage_material(10.0).density, 0.002);
        assert_eq!(config.appendage_material(1e9).density, 0.01);
    }

    #[test]
    fn test_appendage_lighter_and_draggier_than_body() {
        let config = AssemblyConfig::default();
        let body = config.body_material(2000.0);
        let leg = config.appendage_material(2000.0);
        assert!(leg.density < body.density);
        assert!(leg.air_friction > body.air_friction);
        assert_eq!(leg.collision_group, body.collision_group);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: CreatureConfig =
            ron::from_str("(gait: (stuck_limit: 40), separation: (tolerance: 3.5))").unwrap();
        assert_eq!(config.gait.stuck_limit, 40);
        assert_eq!(config.gait.simulation_speed, 0.005);
        assert_eq!(config.separation.tolerance, 3.5);
        assert_eq!(config.contact, ContactConfig::default());
    }
}
