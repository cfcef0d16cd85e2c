/*
 * UI Module
 *
 * Control panel built with nannou_egui. Sliders edit a FlockParams in place;
 * the caller compares against the previous frame's copy to decide what the
 * flock needs to do.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::FlockParams;

// Update the UI and return whether the flock should be reset and whether any
// parameter changed
pub fn update_ui(egui: &mut Egui, params: &mut FlockParams, debug_info: &DebugInfo) -> (bool, bool) {
    let mut should_reset_boids = false;
    let previous = params.clone();

    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Boids", |ui| {
                ui.add(egui::Slider::new(&mut params.num_boids, FlockParams::num_boids_range()).text("Number of Boids"));
                ui.add(egui::Slider::new(&mut params.max_speed, FlockParams::max_speed_range()).text("Max Speed"));
                ui.add(egui::Slider::new(&mut params.max_force, FlockParams::max_force_range()).text("Max Force"));
                ui.add(egui::Slider::new(&mut params.min_speed_ratio, 0.0..=1.0).text("Min Speed Ratio"));
                ui.horizontal(|ui| {
                    ui.label("Seed");
                    ui.add(egui::DragValue::new(&mut params.seed));
                });
                if ui.button("Reset Boids").clicked() {
                    should_reset_boids = true;
                }
            });

            ui.collapsing("Flocking Behavior", |ui| {
                let tuning = &mut params.tuning;
                ui.add(egui::Slider::new(&mut tuning.weight_forward, FlockParams::weight_range()).text("Forward Weight"));
                ui.add(egui::Slider::new(&mut tuning.weight_separate, FlockParams::weight_range()).text("Separation Weight"));
                ui.add(egui::Slider::new(&mut tuning.weight_align, FlockParams::weight_range()).text("Alignment Weight"));
                ui.add(egui::Slider::new(&mut tuning.weight_cohere, FlockParams::weight_range()).text("Cohesion Weight"));
                ui.add(egui::Slider::new(&mut tuning.weight_wander, FlockParams::wander_weight_range()).text("Wander Weight"));
                ui.separator();
                ui.add(egui::Slider::new(&mut tuning.max_dist_separate, FlockParams::distance_range()).text("Separation Distance"));
                ui.add(egui::Slider::new(&mut tuning.max_dist_align, FlockParams::distance_range()).text("Alignment Distance"));
                ui.add(egui::Slider::new(&mut tuning.max_dist_cohere, FlockParams::distance_range()).text("Cohesion Distance"));
                ui.add(egui::Slider::new(&mut tuning.neighbor_count, 0..=20).text("Neighbors"));
            });

            ui.collapsing("Camera Controls", |ui| {
                ui.label("Orbit: click and drag");
                ui.label("Zoom: mouse wheel");
                ui.checkbox(&mut params.follow_flock, "Follow Flock Center");
            });

            ui.collapsing("Performance", |ui| {
                ui.checkbox(&mut params.enable_parallel, "Enable Parallel Processing");
                ui.separator();
                for line in debug_info.lines() {
                    ui.label(line);
                }
            });

            ui.checkbox(&mut params.show_debug, "Show Debug Info");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation (Space)");
        });

    let params_changed = params.detect_changes(&previous).any;
    (should_reset_boids, params_changed)
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect) {
    let lines = debug_info.lines();
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 220.0;
    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width + margin;
    let text_y = window_rect.top() - margin;

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);
        draw.text(text)
            .x_y(text_x + 80.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
