/*
 * Headless Runner
 *
 * Steps a flock at its fixed time step without opening a window, logging
 * progress through tracing and returning a short summary.
 */

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::agent::Steerable;
use crate::error::SteerError;
use crate::flock::Flock;
use crate::params::FlockParams;
use crate::vector3::Vector3;

// Progress line every this many steps
const LOG_INTERVAL: u64 = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessReport {
    pub seed: u32,
    pub boids: usize,
    pub steps: u64,
    pub simulated_seconds: f32,
    pub elapsed: Duration,
    pub centroid: Vector3,
    pub mean_speed: f32,
    pub fastest: f32,
}

impl fmt::Display for HeadlessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seed={} boids={} steps={} simulated={:.2}s wall={:.1}ms centroid={} mean_speed={:.3} fastest={:.3}",
            self.seed,
            self.boids,
            self.steps,
            self.simulated_seconds,
            self.elapsed.as_secs_f64() * 1000.0,
            self.centroid,
            self.mean_speed,
            self.fastest,
        )
    }
}

pub fn run(params: FlockParams, steps: u64) -> Result<HeadlessReport, SteerError> {
    let time_step = params.time_step;
    let mut flock = Flock::new(params)?;
    info!(boids = flock.len(), steps, parallel = flock.params().enable_parallel, "headless run started");

    let started = Instant::now();
    for step in 1..=steps {
        flock.step(time_step)?;
        if step % LOG_INTERVAL == 0 {
            debug!(step, mean_speed = flock.mean_speed(), centroid = %flock.centroid(), "progress");
        }
    }

    let report = HeadlessReport {
        seed: flock.params().seed,
        boids: flock.len(),
        steps: flock.step_count(),
        simulated_seconds: time_step * steps as f32,
        elapsed: started.elapsed(),
        centroid: flock.centroid(),
        mean_speed: flock.mean_speed(),
        fastest: flock.boids().iter().map(|boid| boid.speed()).fold(0.0, f32::max),
    };
    info!(%report, "headless run finished");
    Ok(report)
}
