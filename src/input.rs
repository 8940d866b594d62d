//! Pointer tracking for the stone field.
//!
//! Only the cursor matters here: its position in normalized device
//! coordinates is what gets projected into the scene as the attractor.
//!
//! NDC origin is the window center, x increases to the right, y increases
//! upward, both in `[-1, 1]`.

use glam::Vec2;
use winit::event::WindowEvent;

/// Cursor state for one window.
#[derive(Debug, Default)]
pub struct Pointer {
    position: Option<Vec2>,
    ndc: Option<Vec2>,
    window_size: (u32, u32),
}

impl Pointer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: (width, height),
            ..Default::default()
        }
    }

    /// Cursor position in physical pixels, if it is over the window.
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Cursor position in NDC, if it is over the window.
    pub fn ndc(&self) -> Option<Vec2> {
        self.ndc
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Convert a pixel position to NDC. `None` for a zero-sized window.
    pub fn ndc_from_pixels(position: Vec2, (w, h): (u32, u32)) -> Option<Vec2> {
        if w == 0 || h == 0 {
            return None;
        }
        Some(Vec2::new(
            (position.x / w as f32) * 2.0 - 1.0,
            1.0 - (position.y / h as f32) * 2.0, // Y flipped
        ))
    }

    /// Record a cursor move. Returns the new NDC position.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<Vec2> {
        let position = Vec2::new(x, y);
        self.position = Some(position);
        self.ndc = Self::ndc_from_pixels(position, self.window_size);
        self.ndc
    }

    pub fn cursor_left(&mut self) {
        self.position = None;
        self.ndc = None;
    }

    /// Record a resize. The NDC of a stationary cursor changes with it.
    pub fn resized(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        if let Some(position) = self.position {
            self.ndc = Self::ndc_from_pixels(position, self.window_size);
        }
    }

    /// Process a winit window event.
    ///
    /// Returns the cursor's NDC position when the event moved it.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Vec2> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_left();
                None
            }
            WindowEvent::Resized(size) => {
                self.resized(size.width, size.height);
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_origin() {
        let mut pointer = Pointer::new(800, 600);
        let ndc = pointer.cursor_moved(400.0, 300.0).unwrap();
        assert!(ndc.abs_diff_eq(Vec2::ZERO, 1e-6));
    }

    #[test]
    fn test_corners() {
        let size = (800, 600);
        let top_left = Pointer::ndc_from_pixels(Vec2::ZERO, size).unwrap();
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));
        let bottom_right = Pointer::ndc_from_pixels(Vec2::new(800.0, 600.0), size).unwrap();
        assert_eq!(bottom_right, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_zero_size_window() {
        let mut pointer = Pointer::new(0, 0);
        assert!(pointer.cursor_moved(10.0, 10.0).is_none());
        assert_eq!(pointer.position(), Some(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_resize_rescales_ndc() {
        let mut pointer = Pointer::new(800, 600);
        pointer.cursor_moved(400.0, 300.0);
        pointer.resized(1600, 600);
        let ndc = pointer.ndc().unwrap();
        assert!((ndc.x - (-0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_cursor_left_clears() {
        let mut pointer = Pointer::new(800, 600);
        pointer.cursor_moved(1.0, 1.0);
        pointer.cursor_left();
        assert!(pointer.ndc().is_none());
        assert!(pointer.position().is_none());
    }

    #[test]
    fn test_resize_event() {
        let mut pointer = Pointer::new(800, 600);
        let event = WindowEvent::Resized(winit::dpi::PhysicalSize::new(1024, 768));
        assert!(pointer.handle_event(&event).is_none());
        assert_eq!(pointer.window_size(), (1024, 768));
    }
}
