/*
 * Debug Information Module
 *
 * Frame metrics shown in the control panel and the on-screen overlay:
 * - FPS and frame time
 * - Simulation steps run this frame and in total
 * - Flock size and mean speed
 */

use std::time::Duration;

use crate::flock::Flock;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub physics_updates_per_frame: usize,
    pub step_count: u64,
    pub boid_count: usize,
    pub mean_speed: f32,
    pub drawn_boids: usize,
}

impl DebugInfo {
    /// Refresh the flock statistics after this frame's steps.
    pub fn record_flock(&mut self, flock: &Flock) {
        self.step_count = flock.step_count();
        self.boid_count = flock.len();
        self.mean_speed = flock.mean_speed();
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Steps this frame: {}", self.physics_updates_per_frame),
            format!("Total steps: {}", self.step_count),
            format!("Boids: {} ({} drawn)", self.boid_count, self.drawn_boids),
            format!("Mean speed: {:.2}", self.mean_speed),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FlockParams;

    #[test]
    fn records_flock_statistics() {
        let params = FlockParams {
            num_boids: 5,
            enable_parallel: false,
            ..FlockParams::default()
        };
        let mut flock = Flock::new(params).unwrap();
        flock.step(1.0 / 60.0).unwrap();
        let mut info = DebugInfo::default();
        info.record_flock(&flock);
        assert_eq!(info.step_count, 1);
        assert_eq!(info.boid_count, 5);
        assert_eq!(info.mean_speed, flock.mean_speed());
        assert_eq!(info.lines().len(), 6);
        assert_eq!(info.lines()[3], "Total steps: 1");
    }
}
