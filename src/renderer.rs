/*
 * Renderer Module
 *
 * Draws the flock: every boid's body triangle is projected through the
 * orbit camera and painted back to front, shaded by depth. Debug mode adds
 * the first boid's neighbor links and the metrics overlay.
 */

use nannou::prelude::*;
use tracing::error;

use crate::agent::Steerable;
use crate::app::Model;
use crate::camera::Camera;
use crate::flock::Flock;
use crate::ui;
use crate::vector3::Vector3;
use crate::BOID_SIZE;

/// A boid body in screen space.
pub struct ProjectedBoid {
    pub index: usize,
    pub depth: f32,
    pub points: [Vec2; 3],
}

// Project every boid whose triangle lies fully in front of the camera,
// farthest first.
pub fn project_boids(flock: &Flock, camera: &Camera, window_rect: Rect) -> Vec<ProjectedBoid> {
    let mut projected: Vec<ProjectedBoid> = flock
        .boids()
        .iter()
        .enumerate()
        .filter_map(|(index, boid)| {
            let [nose, left, right] = boid.body_triangle(BOID_SIZE);
            let points = [
                camera.world_to_screen(nose, window_rect)?,
                camera.world_to_screen(left, window_rect)?,
                camera.world_to_screen(right, window_rect)?,
            ];
            Some(ProjectedBoid {
                index,
                depth: camera.depth(boid.position()),
                points,
            })
        })
        .collect();
    projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    projected
}

// Nearer boids are brighter
fn shade(depth: f32, camera: &Camera) -> Rgb<f32> {
    let t = (depth / (camera.distance * 2.0)).clamp(0.0, 1.0);
    let v = 0.95 - 0.6 * t;
    rgb(v, v, v * 0.9 + 0.1)
}

fn draw_axes(draw: &Draw, camera: &Camera, window_rect: Rect) {
    let length = 20.0;
    let axes = [
        (Vector3::X, rgba(0.6, 0.2, 0.2, 1.0)),
        (Vector3::Y, rgba(0.2, 0.6, 0.2, 1.0)),
        (Vector3::Z, rgba(0.2, 0.2, 0.6, 1.0)),
    ];
    for (axis, color) in axes {
        let start = camera.world_to_screen(Vector3::ZERO, window_rect);
        let end = camera.world_to_screen(axis * length, window_rect);
        if let (Some(start), Some(end)) = (start, end) {
            draw.line().start(start).end(end).color(color).stroke_weight(1.0);
        }
    }
}

// Lines from the first boid to its cached neighbors
fn draw_neighbor_links(draw: &Draw, model: &Model, window_rect: Rect) {
    let boids = model.flock.boids();
    let Some(first) = boids.first() else {
        return;
    };
    let Some(from) = model.camera.world_to_screen(first.position(), window_rect) else {
        return;
    };
    for &other in first.cached_neighbors() {
        if let Some(to) = boids
            .get(other)
            .and_then(|boid| model.camera.world_to_screen(boid.position(), window_rect))
        {
            draw.line().start(from).end(to).color(YELLOW).stroke_weight(1.0);
        }
    }
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    draw_axes(&draw, &model.camera, window_rect);

    for projected in project_boids(&model.flock, &model.camera, window_rect) {
        let color = if model.params.show_debug && projected.index == 0 {
            rgb(1.0, 0.8, 0.2)
        } else {
            shade(projected.depth, &model.camera)
        };
        draw.polygon().color(color).points(projected.points);
    }

    if model.params.show_debug {
        draw_neighbor_links(&draw, model, window_rect);
        ui::draw_debug_info(&draw, &model.debug_info, window_rect);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!(?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        error!(?err, "failed to draw control panel");
    }
}
