/*
 * Simulation Parameters Module
 *
 * FlockParams holds every adjustable setting of a flock: population, agent
 * limits, behavior tuning, seed, and the viewer toggles edited from the UI.
 * It also provides validation, change detection between frames, and the
 * slider ranges the UI uses.
 */

use crate::error::SteerError;
use crate::random::DEFAULT_SEED;

/// Weights and perception settings of the combined flocking behavior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorTuning {
    pub weight_forward: f32,
    pub weight_separate: f32,
    pub weight_align: f32,
    pub weight_cohere: f32,
    pub weight_wander: f32,
    pub max_dist_separate: f32,
    pub max_dist_align: f32,
    pub max_dist_cohere: f32,
    // Cosine of the widest angle from forward at which a neighbor counts fully
    pub angle_separate: f32,
    pub angle_align: f32,
    pub angle_cohere: f32,
    pub neighbor_count: usize,
    // Seconds between nearest-neighbor refreshes (0 refreshes every step)
    pub neighbor_refresh_rate: f32,
}

impl Default for BehaviorTuning {
    fn default() -> Self {
        Self {
            weight_forward: 4.0,
            weight_separate: 23.0,
            weight_align: 12.0,
            weight_cohere: 18.0,
            weight_wander: 0.1,
            max_dist_separate: 7.5,
            max_dist_align: 100.0,
            max_dist_cohere: 100.0,
            angle_separate: -0.707, // 135 degrees
            angle_align: 0.940,     // 20 degrees
            angle_cohere: 0.0,      // 90 degrees
            neighbor_count: 7,
            neighbor_refresh_rate: 0.5,
        }
    }
}

impl BehaviorTuning {
    /// Tuning that steers by wander alone, ignoring neighbors.
    pub fn wander_only() -> Self {
        Self {
            weight_forward: 0.0,
            weight_separate: 0.0,
            weight_align: 0.0,
            weight_cohere: 0.0,
            weight_wander: 1.0,
            neighbor_count: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SteerError> {
        let non_negative = [
            ("weight_forward", self.weight_forward),
            ("weight_separate", self.weight_separate),
            ("weight_align", self.weight_align),
            ("weight_cohere", self.weight_cohere),
            ("weight_wander", self.weight_wander),
            ("neighbor_refresh_rate", self.neighbor_refresh_rate),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SteerError::parameter(name, format!("must be finite and >= 0, got {value}")));
            }
        }
        for (name, value) in [
            ("max_dist_separate", self.max_dist_separate),
            ("max_dist_align", self.max_dist_align),
            ("max_dist_cohere", self.max_dist_cohere),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SteerError::parameter(name, format!("must be finite and > 0, got {value}")));
            }
        }
        for (name, value) in [
            ("angle_separate", self.angle_separate),
            ("angle_align", self.angle_align),
            ("angle_cohere", self.angle_cohere),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(SteerError::parameter(name, format!("cosine must be in [-1, 1], got {value}")));
            }
        }
        Ok(())
    }
}

// Parameters for the simulation that can be adjusted via UI or CLI
#[derive(Clone, Debug, PartialEq)]
pub struct FlockParams {
    pub num_boids: usize,
    pub seed: u32,
    pub max_speed: f32,
    pub max_force: f32,
    pub min_speed_ratio: f32, // min_speed = max_speed * ratio, used by anti-stall
    pub spawn_radius: f32,
    pub time_step: f32,
    pub tuning: BehaviorTuning,
    // Performance settings
    pub enable_parallel: bool,
    // Viewer toggles
    pub show_debug: bool,
    pub pause_simulation: bool,
    pub follow_flock: bool,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            num_boids: 200,
            seed: DEFAULT_SEED,
            max_speed: 20.0,
            max_force: 100.0,
            min_speed_ratio: 0.3,
            spawn_radius: 50.0,
            time_step: 1.0 / 60.0,
            tuning: BehaviorTuning::default(),
            enable_parallel: true,
            show_debug: false,
            pause_simulation: false,
            follow_flock: true,
        }
    }
}

/// What changed between two parameter sets, as far as the flock cares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParamChanges {
    pub num_boids: bool,
    pub seed: bool,
    pub limits: bool,
    pub any: bool,
}

impl FlockParams {
    pub fn min_speed(&self) -> f32 {
        self.max_speed * self.min_speed_ratio
    }

    pub fn validate(&self) -> Result<(), SteerError> {
        SteerError::check_limit("max_speed", self.max_speed)?;
        SteerError::check_limit("max_force", self.max_force)?;
        if !(0.0..=1.0).contains(&self.min_speed_ratio) {
            return Err(SteerError::parameter(
                "min_speed_ratio",
                format!("must be in [0, 1], got {}", self.min_speed_ratio),
            ));
        }
        // Spawning samples [-r, r), whose width 2r must be finite too
        if !(self.spawn_radius > 0.0 && (2.0 * self.spawn_radius).is_finite()) {
            return Err(SteerError::parameter(
                "spawn_radius",
                format!("must be > 0 with a finite spawn cube width, got {}", self.spawn_radius),
            ));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SteerError::parameter(
                "time_step",
                format!("must be finite and > 0, got {}", self.time_step),
            ));
        }
        self.tuning.validate()
    }

    // Compare against the parameters of the previous frame
    pub fn detect_changes(&self, previous: &FlockParams) -> ParamChanges {
        let num_boids = self.num_boids != previous.num_boids;
        let seed = self.seed != previous.seed;
        let limits = self.max_speed != previous.max_speed
            || self.max_force != previous.max_force
            || self.min_speed_ratio != previous.min_speed_ratio;
        ParamChanges {
            num_boids,
            seed,
            limits,
            any: self != previous,
        }
    }

    // Get parameter ranges for UI sliders
    pub fn num_boids_range() -> std::ops::RangeInclusive<usize> {
        1..=2000
    }

    pub fn max_speed_range() -> std::ops::RangeInclusive<f32> {
        1.0..=100.0
    }

    pub fn max_force_range() -> std::ops::RangeInclusive<f32> {
        0.0..=300.0
    }

    pub fn weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=50.0
    }

    pub fn wander_weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=2.0
    }

    pub fn distance_range() -> std::ops::RangeInclusive<f32> {
        1.0..=200.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(FlockParams::default().validate(), Ok(()));
        assert_eq!(BehaviorTuning::wander_only().validate(), Ok(()));
        assert!((FlockParams::default().min_speed() - 6.0).abs() < 1.0e-5);
    }

    #[test]
    fn rejects_bad_values() {
        let mut params = FlockParams::default();
        params.max_force = -1.0;
        assert!(matches!(params.validate(), Err(SteerError::InvalidLimit { name: "max_force", .. })));

        let mut params = FlockParams::default();
        params.time_step = 0.0;
        assert!(matches!(params.validate(), Err(SteerError::InvalidParameter { name: "time_step", .. })));

        let mut params = FlockParams::default();
        params.tuning.angle_align = 2.0;
        assert!(matches!(params.validate(), Err(SteerError::InvalidParameter { name: "angle_align", .. })));

        let mut params = FlockParams::default();
        params.tuning.max_dist_separate = 0.0;
        assert!(params.validate().is_err());

        for spawn_radius in [0.0, f32::INFINITY, f32::MAX, f32::MAX / 1.5] {
            let params = FlockParams {
                spawn_radius,
                ..FlockParams::default()
            };
            assert!(
                matches!(params.validate(), Err(SteerError::InvalidParameter { name: "spawn_radius", .. })),
                "spawn_radius {spawn_radius} accepted"
            );
        }
        let params = FlockParams {
            spawn_radius: f32::MAX / 4.0,
            ..FlockParams::default()
        };
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn change_detection() {
        let previous = FlockParams::default();
        assert_eq!(previous.detect_changes(&previous), ParamChanges::default());

        let mut current = previous.clone();
        current.num_boids += 1;
        current.max_speed = 30.0;
        let changes = current.detect_changes(&previous);
        assert!(changes.num_boids && changes.limits && changes.any);
        assert!(!changes.seed);

        let mut toggled = previous.clone();
        toggled.show_debug = true;
        let changes = toggled.detect_changes(&previous);
        assert!(changes.any && !changes.limits && !changes.num_boids);
    }
}
