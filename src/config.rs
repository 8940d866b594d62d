//! Configuration for a stone field and its viewer.
//!
//! Every value defaults to the stock floating-stones scene, so an empty
//! JSON object `{}` is a complete config. Missing fields fall back to those
//! defaults when loading.

use crate::error::ConfigError;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of stones in the default field.
pub const STONE_COUNT: u32 = 30;
/// Peak repulsion, reached when the attractor sits on a stone.
pub const MOUSE_POWER: f32 = 0.5;
/// Repulsion falls linearly to zero at this distance.
pub const MOUSE_RADIUS: f32 = 8.0;
/// Height stones float back up to.
pub const FLOOR_Y: f32 = 0.0;

/// Axis-aligned box stones are scattered in at startup.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpawnBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl SpawnBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Vertical extent of the box.
    pub fn height_range(&self) -> f32 {
        self.max.y - self.min.y
    }
}

impl Default for SpawnBounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(-10.0, 5.0, -10.0),
            max: Vec3::new(10.0, 15.0, 10.0),
        }
    }
}

/// Constants of the per-tick update rule.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForceConfig {
    /// Distance at which repulsion reaches zero.
    pub mouse_radius: f32,
    /// Repulsion at zero distance.
    pub mouse_power: f32,
    /// Push scale on x and z.
    pub lateral_push: f32,
    /// Push scale on y. Half the lateral scale keeps the field flat.
    pub vertical_push: f32,
    /// Added to `velocity.y` each tick while below the floor.
    pub buoyancy: f32,
    /// Multiplies `velocity.y` each tick while at or above the floor.
    pub settle: f32,
    /// Multiplies the whole velocity each tick.
    pub damping: f32,
    /// Radians added to rotation x and y each tick.
    pub spin: Vec2,
    /// Half extent of each initial velocity component.
    pub initial_speed: f32,
    /// Upper bound of the initial x/y rotation.
    pub initial_tumble: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            mouse_radius: MOUSE_RADIUS,
            mouse_power: MOUSE_POWER,
            lateral_push: 0.1,
            vertical_push: 0.05,
            buoyancy: 0.01,
            settle: 0.98,
            damping: 0.98,
            spin: Vec2::new(0.001, 0.002),
            initial_speed: 0.25,
            initial_tumble: PI,
        }
    }
}

/// How display frames map to simulation ticks.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum TickMode {
    /// One tick per displayed frame. Speed follows the refresh rate.
    #[default]
    PerFrame,
    /// Ticks at a fixed wall-clock rate, at most `max_catch_up` per frame.
    FixedRate { hz: f32, max_catch_up: u32 },
}

/// Window, camera and lighting for the viewer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Vertical field of view.
    pub fov_y_degrees: f32,
    pub eye: Vec3,
    pub target: Vec3,
    pub near: f32,
    pub far: f32,
    /// Distance along the pointer ray where the attractor is placed.
    pub attractor_depth: f32,
    /// Uniform scale applied to the stone template.
    pub stone_scale: f32,
    pub ambient: f32,
    /// Position of the directional light; it shines toward the origin.
    pub light_position: Vec3,
    pub light_intensity: f32,
    pub stone_color: Vec3,
    pub clear_color: [f64; 4],
    /// OBJ file to use as the stone template. A procedural rock is used when unset.
    pub mesh_path: Option<PathBuf>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "Stone Field".into(),
            width: 1280,
            height: 720,
            fov_y_degrees: 60.0,
            eye: Vec3::new(0.0, 15.0, 40.0),
            target: Vec3::new(0.0, 5.0, 0.0),
            near: 0.1,
            far: 100.0,
            attractor_depth: 25.0,
            stone_scale: 3.0,
            ambient: 0.7,
            light_position: Vec3::new(10.0, 20.0, 10.0),
            light_intensity: 1.0,
            stone_color: Vec3::new(0.55, 0.52, 0.5),
            clear_color: [0.02, 0.02, 0.05, 1.0],
            mesh_path: None,
        }
    }
}

impl ViewConfig {
    /// True when every float (camera, lighting, scale, colors) is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.fov_y_degrees,
            self.near,
            self.far,
            self.attractor_depth,
            self.stone_scale,
            self.ambient,
            self.light_intensity,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.eye.is_finite()
            && self.target.is_finite()
            && self.light_position.is_finite()
            && self.stone_color.is_finite()
            && self.clear_color.iter().all(|c| c.is_finite())
    }
}

/// Complete stone field configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    pub stone_count: u32,
    pub floor_y: f32,
    pub spawn: SpawnBounds,
    pub forces: ForceConfig,
    /// Fixed RNG seed. `None` scatters differently every run.
    pub seed: Option<u64>,
    pub tick: TickMode,
    pub view: ViewConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            stone_count: STONE_COUNT,
            floor_y: FLOOR_Y,
            spawn: SpawnBounds::default(),
            forces: ForceConfig::default(),
            seed: None,
            tick: TickMode::default(),
            view: ViewConfig::default(),
        }
    }
}

impl FieldConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would break the simulation's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.forces;
        let finite = [
            f.mouse_radius,
            f.mouse_power,
            f.lateral_push,
            f.vertical_push,
            f.buoyancy,
            f.settle,
            f.damping,
            f.initial_speed,
            f.initial_tumble,
            self.floor_y,
        ]
        .iter()
        .all(|v| v.is_finite())
            && f.spin.is_finite()
            && self.spawn.min.is_finite()
            && self.spawn.max.is_finite()
            && self.view.is_finite();
        if !finite {
            return Err(invalid("all numeric values must be finite"));
        }
        if f.mouse_radius <= 0.0 {
            return Err(invalid("forces.mouse_radius must be positive"));
        }
        for (name, factor) in [("forces.damping", f.damping), ("forces.settle", f.settle)] {
            if factor <= 0.0 || factor >= 1.0 {
                return Err(invalid(format!("{name} must be in (0, 1), got {factor}")));
            }
        }
        if f.initial_speed < 0.0 {
            return Err(invalid("forces.initial_speed must not be negative"));
        }
        if !self.spawn.min.cmple(self.spawn.max).all() {
            return Err(invalid("spawn.min must not exceed spawn.max on any axis"));
        }
        if self.spawn.min.y < self.floor_y {
            return Err(invalid("spawn box must start at or above floor_y"));
        }
        if let TickMode::FixedRate { hz, max_catch_up } = self.tick {
            if !(hz.is_finite() && hz > 0.0) {
                return Err(invalid("tick rate must be positive"));
            }
            if max_catch_up == 0 {
                return Err(invalid("tick max_catch_up must be at least 1"));
            }
        }

        let v = &self.view;
        if !(v.attractor_depth.is_finite() && v.attractor_depth > 0.0) {
            return Err(invalid("view.attractor_depth must be positive"));
        }
        if !(v.near > 0.0 && v.near < v.far) {
            return Err(invalid("view requires 0 < near < far"));
        }
        if !(v.fov_y_degrees > 0.0 && v.fov_y_degrees < 180.0) {
            return Err(invalid("view.fov_y_degrees must be in (0, 180)"));
        }
        if v.eye == v.target {
            return Err(invalid("view.eye and view.target must differ"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scene() {
        let config = FieldConfig::default();
        assert_eq!(config.stone_count, 30);
        assert_eq!(config.forces.mouse_radius, 8.0);
        assert_eq!(config.forces.mouse_power, 0.5);
        assert_eq!(config.forces.vertical_push * 2.0, config.forces.lateral_push);
        assert_eq!(config.spawn.height_range(), 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = FieldConfig::from_json("{}").expect("empty object should parse");
        assert_eq!(config, FieldConfig::default());
    }

    #[test]
    fn test_partial_forces_keep_other_defaults() {
        let config = FieldConfig::from_json(r#"{ "forces": { "mouse_radius": 4.0 } }"#).unwrap();
        assert_eq!(config.forces.mouse_radius, 4.0);
        assert_eq!(config.forces.damping, 0.98);
    }

    #[test]
    fn test_fixed_rate_json() {
        let config =
            FieldConfig::from_json(r#"{ "tick": { "FixedRate": { "hz": 60.0, "max_catch_up": 4 } } }"#).unwrap();
        assert_eq!(config.tick, TickMode::FixedRate { hz: 60.0, max_catch_up: 4 });
    }

    #[test]
    fn test_rejects_undamped() {
        let mut config = FieldConfig::default();
        config.forces.damping = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_spawn_below_floor() {
        let mut config = FieldConfig::default();
        config.floor_y = 6.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_radius() {
        let mut config = FieldConfig::default();
        config.forces.mouse_radius = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_nan() {
        let mut config = FieldConfig::default();
        config.forces.buoyancy = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_catch_up() {
        let result = FieldConfig::from_json(r#"{ "tick": { "FixedRate": { "hz": 60.0, "max_catch_up": 0 } } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_overflowing_view() {
        // 1e39 does not fit in an f32 and parses as infinity.
        let result = FieldConfig::from_json(r#"{ "view": { "eye": [0.0, 1e39, 40.0] } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        let result = FieldConfig::from_json(r#"{ "view": { "stone_scale": 1e39 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(FieldConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_save_load() {
        let path = std::env::temp_dir().join(format!("stonefield-config-{}.json", std::process::id()));
        let mut config = FieldConfig::default();
        config.seed = Some(7);
        config.stone_count = 12;
        config.save(&path).unwrap();
        let loaded = FieldConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = SpawnBounds::default();
        assert!(bounds.contains(Vec3::new(0.0, 5.0, 0.0)));
        assert!(bounds.contains(bounds.max));
        assert!(!bounds.contains(Vec3::new(0.0, 4.9, 0.0)));
    }
}
