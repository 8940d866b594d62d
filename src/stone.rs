//! The stone record and its GPU instance form.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// One simulated stone.
///
/// Physics state lives here, in the simulation's own collection, not on
/// any render object. The renderer only ever sees [`StoneInstance`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stone {
    /// World-space position.
    pub position: Vec3,
    /// World units per tick.
    pub velocity: Vec3,
    /// XYZ Euler angles in radians. Purely cosmetic.
    pub rotation: Vec3,
}

impl Stone {
    pub fn new(position: Vec3, velocity: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            velocity,
            rotation,
        }
    }

    /// A stone at rest with no rotation.
    pub fn at_rest(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO, Vec3::ZERO)
    }

    /// Velocity magnitude.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// True when no component of position, velocity or rotation is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.rotation.is_finite()
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Model matrix: translate, rotate, then uniform scale.
    pub fn model_matrix(&self, scale: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(scale), self.orientation(), self.position)
    }
}

/// Per-instance data uploaded to the vertex buffer each frame.
///
/// Laid out as four `vec4<f32>` columns (locations 2..=5 in the shader).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct StoneInstance {
    pub model: [[f32; 4]; 4],
}

impl StoneInstance {
    pub fn from_stone(stone: &Stone, scale: f32) -> Self {
        Self {
            model: stone.model_matrix(scale).to_cols_array_2d(),
        }
    }
}
