/*
 * Camera Module
 *
 * Orbit camera for viewing the flock. It circles a target point at a given
 * distance (yaw about the vertical axis, pitch above the horizon) and
 * projects world points to screen space with a simple perspective divide.
 */

use nannou::prelude::*;

use crate::util;
use crate::vector3::Vector3;

// Points closer to the eye than this are not drawn
const NEAR_PLANE: f32 = 0.5;
const ORBIT_SPEED: f32 = 0.01; // radians per pixel of drag
const MAX_PITCH: f32 = 1.5;
const FOLLOW_RATE: f32 = 0.05;

pub struct Camera {
    pub target: Vector3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            target: Vector3::ZERO,
            yaw: 0.6,
            pitch: 0.3,
            distance: 200.0,
            min_distance: 10.0,
            max_distance: 2000.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        }
    }

    // World point in camera space: eye on +z looking down -z, y up
    fn to_view(&self, point: Vector3) -> Vector3 {
        (point - self.target)
            .rotate_xz_about_y(self.yaw)
            .rotate_yz_about_x(self.pitch)
    }

    /// Distance in front of the eye, along the view direction.
    pub fn depth(&self, point: Vector3) -> f32 {
        self.distance - self.to_view(point).z
    }

    /// Pixels per world unit at the given depth.
    pub fn scale_at(&self, depth: f32, window_rect: Rect) -> f32 {
        window_rect.h() / depth.max(NEAR_PLANE)
    }

    // Convert a point from world space to screen space; None when behind the eye
    pub fn world_to_screen(&self, point: Vector3, window_rect: Rect) -> Option<Vec2> {
        let view = self.to_view(point);
        let depth = self.distance - view.z;
        if depth < NEAR_PLANE {
            return None;
        }
        let scale = self.scale_at(depth, window_rect);
        Some(vec2(view.x * scale, view.y * scale) + window_rect.xy())
    }

    // Handle mouse wheel events: scrolling up moves closer
    pub fn zoom(&mut self, scroll_delta: Vec2) {
        let zoom_factor = 1.0 - scroll_delta.y * 0.1;
        self.distance = (self.distance * zoom_factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    // Orbit around the target while dragging
    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            if delta.length_squared() > 0.0 {
                self.yaw += delta.x * ORBIT_SPEED;
                self.pitch = (self.pitch - delta.y * ORBIT_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
                self.last_cursor_pos = position;
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }

    /// Ease the target toward `point` (used to keep the flock in view).
    pub fn follow(&mut self, point: Vector3) {
        self.target = util::interpolate(FOLLOW_RATE, self.target, point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::from_w_h(800.0, 600.0)
    }

    #[test]
    fn target_projects_to_window_center() {
        let camera = Camera::new();
        let screen = camera.world_to_screen(Vector3::ZERO, window()).unwrap();
        assert!(screen.length() < 1.0e-4);
        assert!((camera.depth(Vector3::ZERO) - 200.0).abs() < 1.0e-4);
    }

    #[test]
    fn nearer_points_spread_wider() {
        let mut camera = Camera::new();
        camera.yaw = 0.0;
        camera.pitch = 0.0;
        let far = camera.world_to_screen(Vector3::new(1.0, 0.0, -50.0), window()).unwrap();
        let near = camera.world_to_screen(Vector3::new(1.0, 0.0, 50.0), window()).unwrap();
        assert!(near.x > far.x && far.x > 0.0);
        assert!(camera.world_to_screen(Vector3::new(0.0, 0.0, 300.0), window()).is_none());
    }

    #[test]
    fn zoom_and_orbit_stay_in_range() {
        let mut camera = Camera::new();
        for _ in 0..100 {
            camera.zoom(vec2(0.0, 1.0));
        }
        assert_eq!(camera.distance, camera.min_distance);
        camera.start_drag(Vec2::ZERO);
        camera.drag(vec2(0.0, -10_000.0));
        assert_eq!(camera.pitch, MAX_PITCH);
        camera.end_drag();
        assert!(!camera.is_dragging);
    }
}
