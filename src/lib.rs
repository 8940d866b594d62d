//! # stonefield
//!
//! A field of floating stones that scatter away from the mouse pointer and
//! drift back up to a floor height.
//!
//! The simulation ([`StoneField`]) is a plain value with no window or GPU
//! dependency. The [`run`] function wraps it in a winit window with a wgpu
//! instanced renderer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use stonefield::prelude::*;
//!
//! fn main() {
//!     env_logger::init();
//!     let config = FieldConfig::default();
//!     if let Err(e) = stonefield::run(config) {
//!         log::error!("{}", e);
//!     }
//! }
//! ```
//!
//! ## Driving the simulation yourself
//!
//! ```ignore
//! let mut field = StoneField::initialize(30, SpawnBounds::default(), 0.0);
//!
//! // Whenever the pointer moves:
//! field.set_attractor(camera.project_pointer(ndc, 25.0));
//!
//! // Once per frame:
//! field.tick();
//! for stone in field.stones() {
//!     // position + rotation go to the renderer
//! }
//! ```
//!
//! ## The update rule
//!
//! Each tick, for every stone independently:
//!
//! 1. Within `mouse_radius` of the attractor the stone is pushed away with
//!    linear falloff; the vertical push is half the lateral push.
//! 2. Below the floor it gains a little upward velocity, otherwise its
//!    vertical velocity settles toward zero.
//! 3. All velocity is damped, then added to the position.
//! 4. The stone spins a little on x and y.

pub mod camera;
pub mod config;
pub mod error;
mod gpu;
pub mod input;
pub mod mesh;
mod simulation;
mod spawn;
pub mod stone;
pub mod time;
mod window;

pub use camera::{Camera, Ray};
pub use config::{FieldConfig, ForceConfig, SpawnBounds, TickMode, ViewConfig};
pub use config::{FLOOR_Y, MOUSE_POWER, MOUSE_RADIUS, STONE_COUNT};
pub use error::{ConfigError, GpuError, MeshError, ViewerError};
pub use glam::{Vec2, Vec3};
pub use mesh::{LoadState, MeshLoad, MeshSource, StoneMesh};
pub use simulation::{step, StoneField};
pub use spawn::SpawnContext;
pub use stone::{Stone, StoneInstance};
pub use time::{TickClock, Time};
pub use window::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use stonefield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::config::{FieldConfig, ForceConfig, SpawnBounds, TickMode, ViewConfig};
    pub use crate::simulation::StoneField;
    pub use crate::stone::Stone;
    pub use crate::{Vec2, Vec3};
}
