//! The stone field simulation.
//!
//! A fixed population of stones is pushed away from a single attractor
//! point (the pointer projected into the scene) and drifts back up toward
//! a floor height. Stones never interact with each other, so each one is
//! stepped independently in [`step`].

use crate::config::{FieldConfig, ForceConfig, SpawnBounds};
use crate::error::ConfigError;
use crate::spawn::SpawnContext;
use crate::stone::{Stone, StoneInstance};
use glam::Vec3;

/// Simulation context for one stone field.
///
/// Owned by the caller; several fields can run side by side.
///
/// ```ignore
/// let mut field = StoneField::initialize(30, SpawnBounds::default(), 0.0);
/// field.set_attractor(Vec3::new(0.0, 8.0, 0.0));
/// field.tick();
/// let instances = field.instances(3.0);
/// ```
#[derive(Debug, Clone)]
pub struct StoneField {
    stones: Vec<Stone>,
    attractor: Vec3,
    floor_y: f32,
    forces: ForceConfig,
    ticks: u64,
}

impl StoneField {
    /// Scatter `count` stones inside `bounds` with default forces.
    pub fn initialize(count: u32, bounds: SpawnBounds, floor_y: f32) -> Self {
        let mut ctx = SpawnContext::new(count);
        Self::spawn(&mut ctx, bounds, floor_y, ForceConfig::default())
    }

    /// Validate `config` and build the field it describes.
    pub fn from_config(config: &FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut ctx = match config.seed {
            Some(seed) => SpawnContext::seeded(config.stone_count, seed),
            None => SpawnContext::new(config.stone_count),
        };
        Ok(Self::spawn(&mut ctx, config.spawn, config.floor_y, config.forces))
    }

    /// Scatter stones using an existing spawn context.
    pub fn spawn(ctx: &mut SpawnContext, bounds: SpawnBounds, floor_y: f32, forces: ForceConfig) -> Self {
        let stones = (0..ctx.count)
            .map(|_| {
                Stone::new(
                    ctx.random_in_box(bounds.min, bounds.max),
                    ctx.random_velocity(forces.initial_speed),
                    ctx.random_rotation(forces.initial_tumble),
                )
            })
            .collect::<Vec<_>>();
        log::debug!("spawned {} stones above floor {}", stones.len(), floor_y);
        Self::from_stones(stones, floor_y, forces)
    }

    /// Build a field from explicit stones.
    pub fn from_stones(stones: Vec<Stone>, floor_y: f32, forces: ForceConfig) -> Self {
        Self {
            stones,
            attractor: Vec3::ZERO,
            floor_y,
            forces,
            ticks: 0,
        }
    }

    /// Move the attractor. The newest point wins; it is read by the next tick.
    ///
    /// Non-finite points are dropped so they can never reach stone state.
    pub fn set_attractor(&mut self, point: Vec3) {
        if !point.is_finite() {
            log::warn!("ignoring non-finite attractor {:?}", point);
            return;
        }
        self.attractor = point;
    }

    #[inline]
    pub fn attractor(&self) -> Vec3 {
        self.attractor
    }

    /// Advance every stone by one step.
    pub fn tick(&mut self) {
        let attractor = self.attractor;
        for stone in &mut self.stones {
            step(stone, attractor, self.floor_y, &self.forces);
        }
        self.ticks += 1;
    }

    /// Run `ticks` steps back to back.
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    #[inline]
    pub fn stones(&self) -> &[Stone] {
        &self.stones
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }

    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.floor_y
    }

    #[inline]
    pub fn forces(&self) -> &ForceConfig {
        &self.forces
    }

    /// Ticks run since the field was built.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Per-stone transforms for the renderer.
    pub fn instances(&self, scale: f32) -> Vec<StoneInstance> {
        self.stones
            .iter()
            .map(|s| StoneInstance::from_stone(s, scale))
            .collect()
    }
}

/// Advance a single stone by one tick.
pub fn step(stone: &mut Stone, attractor: Vec3, floor_y: f32, forces: &ForceConfig) {
    let d = stone.position - attractor;
    let distance = d.length();

    // Zero distance has no direction; skip rather than divide by it.
    if distance > 0.0 && distance < forces.mouse_radius {
        let force = (1.0 - distance / forces.mouse_radius) * forces.mouse_power;
        let scale = Vec3::new(forces.lateral_push, forces.vertical_push, forces.lateral_push);
        stone.velocity += (d / distance) * force * scale;
    }

    if stone.position.y < floor_y {
        stone.velocity.y += forces.buoyancy;
    } else {
        stone.velocity.y *= forces.settle;
    }

    stone.velocity *= forces.damping;
    stone.position += stone.velocity;

    stone.rotation.x += forces.spin.x;
    stone.rotation.y += forces.spin.y;
}
