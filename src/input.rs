/*
 * Input Module
 *
 * Window event handlers:
 * - Orbit the camera with a left-button drag
 * - Zoom with the mouse wheel or trackpad
 * - Space pauses, R resets the flock
 * - Raw events are forwarded to egui
 */

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};
use tracing::{error, info};

use crate::app::Model;

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    let new_pos = Vec2::new(pos.x, pos.y);
    if model.camera.is_dragging {
        model.camera.drag(new_pos);
    }
    model.mouse_position = new_pos;
}

// Mouse pressed event handler
pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    // Clicks on the control panel belong to egui
    if button == MouseButton::Left && !model.egui.ctx().is_pointer_over_area() {
        model.camera.start_drag(model.mouse_position);
    }
}

// Mouse released event handler
pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.camera.end_drag();
    }
}

// Mouse wheel event handler for zooming
pub fn mouse_wheel(_app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    match delta {
        MouseScrollDelta::LineDelta(x, y) => model.camera.zoom(vec2(x, y)),
        MouseScrollDelta::PixelDelta(pos) => model.camera.zoom(vec2(pos.x as f32, pos.y as f32) * 0.01),
    }
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }
    match key {
        Key::Space => {
            model.params.pause_simulation = !model.params.pause_simulation;
            info!(paused = model.params.pause_simulation, "toggled pause");
        }
        Key::R => {
            if let Err(err) = model.flock.reset() {
                error!(%err, "failed to reset flock");
            }
        }
        _ => {}
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
