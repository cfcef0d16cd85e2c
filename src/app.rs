/*
 * Application Module
 *
 * Window driver: builds the window and control panel, then advances the flock
 * with a fixed time step. Frame time is accumulated and consumed in whole
 * simulation steps so the flock evolves the same way at any frame rate.
 */

use std::time::{Duration, Instant};

use clap::Parser;
use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{error, info, warn};

use crate::camera::Camera;
use crate::cli::Cli;
use crate::debug::DebugInfo;
use crate::flock::Flock;
use crate::input;
use crate::params::FlockParams;
use crate::renderer;
use crate::ui;

// Frames slower than this many steps drop the remaining backlog instead of
// trying to catch up
const MAX_STEPS_PER_FRAME: usize = 5;

// Main model for the application
pub struct Model {
    pub flock: Flock,
    // Edited by the control panel, pushed to the flock when it changes
    pub params: FlockParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
    // Fixed timestep physics variables
    pub physics_accumulator: Duration,
    pub last_update_time: Instant,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let params = Cli::parse().flock_params();
    let flock = match Flock::new(params.clone()) {
        Ok(flock) => flock,
        Err(err) => {
            error!(%err, "cannot create flock");
            std::process::exit(2);
        }
    };

    let window_id = app
        .new_window()
        .title("flock3d")
        .size(1280, 800)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .key_pressed(input::key_pressed)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to build window");
    let window = app.window(window_id).expect("window was just created");
    let egui = Egui::from_window(&window);

    info!(boids = flock.len(), seed = params.seed, "viewer started");

    Model {
        flock,
        params,
        egui,
        debug_info: DebugInfo::default(),
        camera: Camera::new(),
        mouse_position: Vec2::ZERO,
        physics_accumulator: Duration::ZERO,
        last_update_time: Instant::now(),
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let (should_reset_boids, params_changed) = ui::update_ui(&mut model.egui, &mut model.params, &model.debug_info);

    if params_changed {
        if let Err(err) = model.flock.apply_params(model.params.clone()) {
            warn!(%err, "parameter change rejected");
            model.params = model.flock.params().clone();
        }
    }
    if should_reset_boids {
        if let Err(err) = model.flock.reset() {
            error!(%err, "failed to reset flock");
        }
    }

    let current_time = Instant::now();
    let frame_time = current_time.duration_since(model.last_update_time);
    model.last_update_time = current_time;

    if model.params.pause_simulation {
        model.physics_accumulator = Duration::ZERO;
        model.debug_info.physics_updates_per_frame = 0;
    } else {
        run_fixed_steps(model, frame_time);
    }

    if model.params.follow_flock && !model.flock.is_empty() {
        model.camera.follow(model.flock.centroid());
    }

    model.debug_info.record_flock(&model.flock);
    model.debug_info.drawn_boids = renderer::project_boids(&model.flock, &model.camera, app.window_rect()).len();
}

fn run_fixed_steps(model: &mut Model, frame_time: Duration) {
    let step_size = Duration::from_secs_f32(model.params.time_step);
    model.physics_accumulator += frame_time;

    let mut physics_updates_this_frame = 0;
    while model.physics_accumulator >= step_size {
        if physics_updates_this_frame == MAX_STEPS_PER_FRAME {
            model.physics_accumulator = Duration::ZERO;
            break;
        }
        if let Err(err) = model.flock.step(model.params.time_step) {
            error!(%err, "simulation step failed, pausing");
            model.params.pause_simulation = true;
            model.physics_accumulator = Duration::ZERO;
            break;
        }
        model.physics_accumulator -= step_size;
        physics_updates_this_frame += 1;
    }
    model.debug_info.physics_updates_per_frame = physics_updates_this_frame;
}
