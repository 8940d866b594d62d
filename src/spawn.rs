//! Spawn context for stone initialization.
//!
//! Wraps the RNG used to scatter stones so that a configured seed gives a
//! reproducible field and no seed gives a different field every run.

use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random helpers used while populating a [`StoneField`](crate::StoneField).
///
/// ```ignore
/// let mut ctx = SpawnContext::seeded(30, 7);
/// let position = ctx.random_in_box(bounds.min, bounds.max);
/// let velocity = ctx.random_velocity(0.25);
/// ```
pub struct SpawnContext {
    /// Total number of stones being spawned.
    pub count: u32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Context seeded from the system clock.
    pub fn new(count: u32) -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(count, seed)
    }

    /// Context with a fixed seed; the same seed always yields the same field.
    pub fn seeded(count: u32, seed: u64) -> Self {
        Self {
            count,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` when the range is empty.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.rng.gen::<f32>()
    }

    // ========== Stone helpers ==========

    /// Uniform point inside the axis-aligned box `[min, max]`.
    pub fn random_in_box(&mut self, min: Vec3, max: Vec3) -> Vec3 {
        Vec3::new(
            self.random_range(min.x, max.x),
            self.random_range(min.y, max.y),
            self.random_range(min.z, max.z),
        )
    }

    /// Velocity with each component uniform in `[-half_extent, half_extent)`.
    pub fn random_velocity(&mut self, half_extent: f32) -> Vec3 {
        Vec3::new(
            self.random_range(-half_extent, half_extent),
            self.random_range(-half_extent, half_extent),
            self.random_range(-half_extent, half_extent),
        )
    }

    /// Tumble about x and y in `[0, max_angle)`; z is left at zero.
    pub fn random_rotation(&mut self, max_angle: f32) -> Vec3 {
        Vec3::new(
            self.random_range(0.0, max_angle),
            self.random_range(0.0, max_angle),
            0.0,
        )
    }
}
