//! Perspective camera and pointer projection.

use crate::config::ViewConfig;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Point `distance` units along the ray.
    #[inline]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Fixed look-at perspective camera.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn from_view(view: &ViewConfig, aspect: f32) -> Self {
        Self {
            eye: view.eye,
            target: view.target,
            up: Vec3::Y,
            fov_y: view.fov_y_degrees.to_radians(),
            aspect,
            near: view.near,
            far: view.far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Follow a window resize. Zero-sized (minimized) windows are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Ray from the eye through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv_vp = self.view_proj().inverse();

        // wgpu clip space puts the near plane at z = 0.
        let near = unproject(inv_vp, Vec4::new(ndc.x, ndc.y, 0.0, 1.0));
        let far = unproject(inv_vp, Vec4::new(ndc.x, ndc.y, 1.0, 1.0));

        let direction = (far - near).normalize_or_zero();
        let direction = if direction == Vec3::ZERO {
            (self.target - self.eye).normalize_or_zero()
        } else {
            direction
        };

        Ray {
            origin: self.eye,
            direction,
        }
    }

    /// World point `depth` units from the eye along the pointer's ray.
    pub fn project_pointer(&self, ndc: Vec2, depth: f32) -> Vec3 {
        self.ray_from_ndc(ndc).at(depth)
    }
}

fn unproject(inv_vp: Mat4, clip: Vec4) -> Vec3 {
    let world = inv_vp * clip;
    world.truncate() / world.w
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::from_view(&ViewConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = camera();
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        let expected = (cam.target - cam.eye).normalize();
        assert!(ray.direction.abs_diff_eq(expected, 1e-4), "{:?}", ray.direction);
        assert_eq!(ray.origin, cam.eye);
    }

    #[test]
    fn test_project_pointer_distance() {
        let cam = camera();
        let p = cam.project_pointer(Vec2::new(0.3, -0.4), 25.0);
        assert!((p.distance(cam.eye) - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_right_of_screen_is_positive_x() {
        let cam = camera();
        let right = cam.project_pointer(Vec2::new(1.0, 0.0), 25.0);
        let left = cam.project_pointer(Vec2::new(-1.0, 0.0), 25.0);
        assert!(right.x > 0.0 && left.x < 0.0);
        let up = cam.project_pointer(Vec2::new(0.0, 1.0), 25.0);
        let center = cam.project_pointer(Vec2::ZERO, 25.0);
        assert!(up.y > center.y);
    }

    #[test]
    fn test_ray_is_unit() {
        let cam = camera();
        for ndc in [Vec2::new(-1.0, -1.0), Vec2::new(0.5, 0.9), Vec2::new(1.0, 1.0)] {
            let ray = cam.ray_from_ndc(ndc);
            assert!((ray.direction.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_set_aspect_ignores_zero() {
        let mut cam = camera();
        cam.set_aspect(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_aspect(0, 400);
        assert_eq!(cam.aspect, 2.0);
    }
}
