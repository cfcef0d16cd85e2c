/*
 * Boid Module
 *
 * A Boid is an Agent that flies with its flock. Each simulation step it
 * combines these steering components into one force:
 * 1. Forward: keep flying ahead
 * 2. Separation: avoid crowding neighbors
 * 3. Alignment: steer toward the average heading of neighbors
 * 4. Cohesion: steer toward the center of neighbors
 * 5. Wander: a slowly drifting random push
 *
 * The combined force is low-pass filtered, corrected to prevent stalls, then
 * stored until the flock applies it (plan/apply split, so every boid plans
 * against the same view of its neighbors).
 */

use crate::agent::{Agent, Steerable};
use crate::error::SteerError;
use crate::params::BehaviorTuning;
use crate::random::RandomSequence;
use crate::util::{self, Blender};
use crate::vector3::Vector3;

/// How far the wander state moves per call, relative to its unit radius.
pub const WANDER_RATE: f32 = 0.2;
pub const STEERING_SMOOTHNESS: f32 = 0.8;
pub const DEFAULT_MAX_SPEED: f32 = 20.0;
pub const DEFAULT_MAX_FORCE: f32 = 100.0;
pub const DEFAULT_MIN_SPEED_RATIO: f32 = 0.3;

// Anti-stall starts acting at this multiple of min_speed
const STALL_PREVENTION_MARGIN: f32 = 1.5;
const STALL_FORWARD_FRACTION: f32 = 0.9;

/// What other boids may see of a boid while steering: a copy taken before
/// anyone moves this step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoidSnapshot {
    pub position: Vector3,
    pub forward: Vector3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boid {
    agent: Agent,
    wander_state: Vector3,
    min_speed: f32,
    steer_memory: Blender<Vector3>,
    // Set during the plan phase, consumed by the apply phase
    next_steer: Vector3,
    cached_neighbors: Vec<usize>,
    time_since_neighbor_refresh: f32,
}

impl Default for Boid {
    fn default() -> Self {
        Self::new()
    }
}

impl Boid {
    /// Boid with flocking limits, cruising at its minimum speed.
    pub fn new() -> Self {
        let min_speed = DEFAULT_MAX_SPEED * DEFAULT_MIN_SPEED_RATIO;
        let agent = Agent::with_fixed_limits(DEFAULT_MAX_SPEED, DEFAULT_MAX_FORCE, min_speed);
        Self::with_agent(agent, min_speed)
    }

    /// Wrap an existing agent, keeping its pose, speed and limits.
    pub fn with_agent(agent: Agent, min_speed: f32) -> Self {
        Self {
            agent,
            wander_state: Vector3::ZERO,
            min_speed,
            steer_memory: Blender::new(),
            next_steer: Vector3::ZERO,
            cached_neighbors: Vec::new(),
            time_since_neighbor_refresh: 0.0,
        }
    }

    pub fn min_speed(&self) -> f32 {
        self.min_speed
    }

    pub fn set_min_speed(&mut self, min_speed: f32) -> Result<(), SteerError> {
        self.min_speed = SteerError::check_limit("min_speed", min_speed)?;
        Ok(())
    }

    pub fn wander_state(&self) -> Vector3 {
        self.wander_state
    }

    pub fn next_steer(&self) -> Vector3 {
        self.next_steer
    }

    pub fn cached_neighbors(&self) -> &[usize] {
        &self.cached_neighbors
    }

    pub fn snapshot(&self) -> BoidSnapshot {
        BoidSnapshot {
            position: self.position(),
            forward: self.forward(),
        }
    }

    /// Forget cached neighbors so the next plan recomputes them.
    pub fn invalidate_neighbors(&mut self) {
        self.cached_neighbors.clear();
        self.time_since_neighbor_refresh = 0.0;
    }

    /// Wander aimlessly via a slowly varying steering force.
    ///
    /// The wander state performs a random walk on the unit sphere; the result
    /// points roughly forward and is at most `max_force` long (it is not
    /// force-limited here, `steer` does that).
    pub fn wander_steer(&mut self, rng: &mut RandomSequence) -> Vector3 {
        let step = rng.random_unit_vector() * WANDER_RATE;
        self.wander_state = (self.wander_state + step).normalize();
        (self.wander_state + self.forward()) * (self.max_force() * 0.5)
    }

    // Return weight related to neighbor's position relative to my forward axis.
    pub fn angle_weight(&self, neighbor: &BoidSnapshot, cos_angle_threshold: f32) -> f32 {
        let offset = neighbor.position - self.position();
        let projection_onto_forward = offset.normalize_or_zero().dot(self.forward());
        if projection_onto_forward > cos_angle_threshold {
            1.0
        } else {
            0.1
        }
    }

    // Falls off as 1/dist and fades to zero at max_dist. Coincident
    // neighbors have no direction and get no weight.
    fn distance_weight(dist: f32, max_dist: f32) -> f32 {
        if dist <= 0.0 {
            return 0.0;
        }
        (1.0 / dist) * (1.0 - util::unit_sigmoid_on_01(dist / max_dist))
    }

    /// Unit direction away from nearby neighbors, or zero.
    pub fn steer_to_separate(&self, neighbors: &[BoidSnapshot], max_dist: f32, cos_threshold: f32) -> Vector3 {
        let mut direction = Vector3::ZERO;
        for neighbor in neighbors {
            let offset = self.position() - neighbor.position;
            let weight = Self::distance_weight(offset.length(), max_dist);
            if weight > 0.0 {
                direction += offset * (weight * self.angle_weight(neighbor, cos_threshold));
            }
        }
        direction.normalize_or_zero()
    }

    /// Unit direction that turns toward the neighbors' headings, or zero.
    pub fn steer_to_align(&self, neighbors: &[BoidSnapshot], max_dist: f32, cos_threshold: f32) -> Vector3 {
        let mut direction = Vector3::ZERO;
        for neighbor in neighbors {
            let heading_offset = neighbor.forward - self.forward();
            let dist = (neighbor.position - self.position()).length();
            let weight = Self::distance_weight(dist, max_dist);
            if weight > 0.0 {
                direction += heading_offset.normalize_or_zero() * (weight * self.angle_weight(neighbor, cos_threshold));
            }
        }
        direction.normalize_or_zero()
    }

    /// Unit direction toward the weighted center of neighbors, or zero when
    /// no neighbor carries weight.
    pub fn steer_to_cohere(&self, neighbors: &[BoidSnapshot], max_dist: f32, cos_threshold: f32) -> Vector3 {
        let mut neighbor_center = Vector3::ZERO;
        let mut total_weight = 0.0;
        for neighbor in neighbors {
            let dist = (neighbor.position - self.position()).length();
            let weight = Self::distance_weight(dist, max_dist) * self.angle_weight(neighbor, cos_threshold);
            neighbor_center += neighbor.position * weight;
            total_weight += weight;
        }
        if total_weight <= 0.0 {
            return Vector3::ZERO;
        }
        (neighbor_center / total_weight - self.position()).normalize_or_zero()
    }

    /// Weighted sum of all steering components, smoothed and stall-corrected.
    pub fn steer_to_flock(&mut self, neighbors: &[BoidSnapshot], wander: Vector3, tuning: &BehaviorTuning) -> Vector3 {
        let f = self.forward() * tuning.weight_forward;
        let s = self.steer_to_separate(neighbors, tuning.max_dist_separate, tuning.angle_separate)
            * tuning.weight_separate;
        let a = self.steer_to_align(neighbors, tuning.max_dist_align, tuning.angle_align) * tuning.weight_align;
        let c = self.steer_to_cohere(neighbors, tuning.max_dist_cohere, tuning.angle_cohere) * tuning.weight_cohere;
        let w = wander * tuning.weight_wander;
        let combined = self.steer_memory.blend(f + s + a + c + w, STEERING_SMOOTHNESS);
        self.anti_stall_adjustment(combined)
    }

    /// Keep a slow boid from braking further: when near `min_speed` and the
    /// steering points backward, keep only its lateral part and add a
    /// moderate forward push.
    pub fn anti_stall_adjustment(&self, raw_steering: Vector3) -> Vector3 {
        let forward = self.forward();
        if self.speed() < self.min_speed * STALL_PREVENTION_MARGIN && raw_steering.dot(forward) < 0.0 {
            let ahead = forward * (self.max_force() * STALL_FORWARD_FRACTION);
            return ahead + raw_steering.perpendicular_component(forward);
        }
        raw_steering
    }

    /// Indices of the `n` boids nearest to boid `index`, closest first.
    /// Brute force over the whole snapshot; ties keep index order.
    pub fn nearest_neighbor_indices(index: usize, snapshot: &[BoidSnapshot], n: usize) -> Vec<usize> {
        let Some(me) = snapshot.get(index) else {
            return Vec::new();
        };
        let mut by_distance: Vec<(f32, usize)> = snapshot
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != index)
            .map(|(other, boid)| ((boid.position - me.position).length_squared(), other))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        by_distance.into_iter().take(n).map(|(_, other)| other).collect()
    }

    /// Cached nearest neighbors, recomputed once `refresh_rate` seconds have
    /// passed or when the cache no longer fits the flock.
    pub fn nearest_neighbors(
        &mut self,
        index: usize,
        snapshot: &[BoidSnapshot],
        n: usize,
        refresh_rate: f32,
        time_step: f32,
    ) -> &[usize] {
        self.time_since_neighbor_refresh += time_step;
        let wanted = n.min(snapshot.len().saturating_sub(1));
        let stale = self.cached_neighbors.len() != wanted
            || self.cached_neighbors.iter().any(|&other| other >= snapshot.len() || other == index);
        if stale || self.time_since_neighbor_refresh > refresh_rate {
            self.cached_neighbors = Self::nearest_neighbor_indices(index, snapshot, n);
            self.time_since_neighbor_refresh = 0.0;
        }
        &self.cached_neighbors
    }

    /// Determine and store the steering force for this step. `index` is this
    /// boid's position in `snapshot`.
    pub fn plan_next_steer(
        &mut self,
        index: usize,
        snapshot: &[BoidSnapshot],
        rng: &mut RandomSequence,
        tuning: &BehaviorTuning,
        time_step: f32,
    ) -> Vector3 {
        let neighbors: Vec<BoidSnapshot> = self
            .nearest_neighbors(index, snapshot, tuning.neighbor_count, tuning.neighbor_refresh_rate, time_step)
            .iter()
            .map(|&other| snapshot[other])
            .collect();
        let wander = self.wander_steer(rng);
        self.next_steer = self.steer_to_flock(&neighbors, wander, tuning);
        self.next_steer
    }

    /// Apply the steering force stored by `plan_next_steer`.
    pub fn apply_next_steer(&mut self, time_step: f32) -> Result<(), SteerError> {
        self.agent.steer(self.next_steer, time_step)
    }

    /// Body outline for drawing: nose, then the two wingtips.
    pub fn body_triangle(&self, size: f32) -> [Vector3; 3] {
        let p = self.position();
        let f = self.forward() * size;
        let s = self.side() * size;
        [p + f, p - f + s, p - f - s]
    }
}

impl Steerable for Boid {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_space::LocalSpace;
    use approx::assert_relative_eq;

    fn snapshot_at(position: Vector3, forward: Vector3) -> BoidSnapshot {
        BoidSnapshot { position, forward }
    }

    // Boid at the origin heading +z
    fn boid_at_origin() -> Boid {
        Boid::new()
    }

    #[test]
    fn new_boid_cruises_at_min_speed() {
        let boid = Boid::new();
        assert_eq!(boid.max_speed(), 20.0);
        assert_eq!(boid.max_force(), 100.0);
        assert_relative_eq!(boid.min_speed(), 6.0);
        assert_relative_eq!(boid.speed(), 6.0);
        assert_eq!(boid.wander_state(), Vector3::ZERO);
    }

    #[test]
    fn default_limits_pass_validation() {
        let min_speed = DEFAULT_MAX_SPEED * DEFAULT_MIN_SPEED_RATIO;
        let mut checked = Agent::with_limits(1.0, DEFAULT_MAX_SPEED, DEFAULT_MAX_FORCE).unwrap();
        checked.set_speed(min_speed).unwrap();
        assert_eq!(Boid::new().agent(), &checked);
        assert_eq!(SteerError::check_limit("min_speed", min_speed), Ok(min_speed));
    }

    #[test]
    fn wander_stays_bounded() {
        let mut boid = Boid::with_agent(Agent::new(), 0.0);
        let mut rng = RandomSequence::default();
        let max_force = boid.max_force();
        for _ in 0..10_000 {
            let w = boid.wander_steer(&mut rng);
            let state_length = boid.wander_state().length();
            assert!((0.99..=1.01).contains(&state_length), "wander state length {state_length}");
            assert!(w.length() <= max_force + 1.0e-4, "wander force {w}");
        }
    }

    #[test]
    fn wander_is_reproducible() {
        let mut a = Boid::new();
        let mut b = Boid::new();
        let mut rng_a = RandomSequence::new(77);
        let mut rng_b = RandomSequence::new(77);
        for _ in 0..50 {
            assert_eq!(a.wander_steer(&mut rng_a), b.wander_steer(&mut rng_b));
        }
    }

    #[test]
    fn angle_weight_favors_neighbors_ahead() {
        let boid = boid_at_origin();
        let ahead = snapshot_at(Vector3::new(0.0, 0.0, 5.0), Vector3::Z);
        let behind = snapshot_at(Vector3::new(0.0, 0.0, -5.0), Vector3::Z);
        assert_eq!(boid.angle_weight(&ahead, 0.0), 1.0);
        assert_eq!(boid.angle_weight(&behind, 0.0), 0.1);
    }

    #[test]
    fn separation_points_away_from_neighbor() {
        let boid = boid_at_origin();
        let neighbors = [snapshot_at(Vector3::new(1.0, 0.0, 0.0), Vector3::Z)];
        let s = boid.steer_to_separate(&neighbors, 7.5, -0.707);
        assert!(s.is_equal_within_epsilon(-Vector3::X));
        // Beyond max distance there is nothing to avoid.
        assert_eq!(boid.steer_to_separate(&neighbors, 0.5, -0.707), Vector3::ZERO);
    }

    #[test]
    fn alignment_turns_toward_neighbor_heading() {
        let boid = boid_at_origin();
        let neighbors = [snapshot_at(Vector3::new(0.0, 0.0, 2.0), Vector3::X)];
        let a = boid.steer_to_align(&neighbors, 100.0, 0.94);
        assert!(a.is_equal_within_epsilon(Vector3::new(1.0, 0.0, -1.0).normalize()));
    }

    #[test]
    fn cohesion_heads_for_neighbor_center() {
        let boid = boid_at_origin();
        let neighbors = [
            snapshot_at(Vector3::new(2.0, 0.0, 5.0), Vector3::Z),
            snapshot_at(Vector3::new(-2.0, 0.0, 5.0), Vector3::Z),
        ];
        let c = boid.steer_to_cohere(&neighbors, 100.0, 0.0);
        assert!(c.is_equal_within_epsilon(Vector3::Z));
        assert_eq!(boid.steer_to_cohere(&[], 100.0, 0.0), Vector3::ZERO);
    }

    #[test]
    fn coincident_neighbors_are_ignored() {
        let boid = boid_at_origin();
        let neighbors = [snapshot_at(Vector3::ZERO, Vector3::X)];
        assert_eq!(boid.steer_to_separate(&neighbors, 7.5, -0.707), Vector3::ZERO);
        assert_eq!(boid.steer_to_align(&neighbors, 100.0, 0.94), Vector3::ZERO);
        assert_eq!(boid.steer_to_cohere(&neighbors, 100.0, 0.0), Vector3::ZERO);
    }

    #[test]
    fn lone_boid_flies_forward() {
        let mut boid = boid_at_origin();
        let steering = boid.steer_to_flock(&[], Vector3::ZERO, &BehaviorTuning::default());
        assert_eq!(steering, Vector3::Z * 4.0);
    }

    #[test]
    fn steering_is_smoothed_between_steps() {
        let mut boid = boid_at_origin();
        let mut tuning = BehaviorTuning::wander_only();
        let first = boid.steer_to_flock(&[], Vector3::X, &tuning);
        assert_eq!(first, Vector3::X);
        tuning.weight_wander = 0.0;
        let second = boid.steer_to_flock(&[], Vector3::X, &tuning);
        // 20% of the new (zero) value, 80% of the previous one
        assert!(second.is_equal_within_epsilon(Vector3::X * 0.8));
    }

    #[test]
    fn anti_stall_replaces_braking_with_forward_push() {
        let mut agent = Agent::with_limits(1.0, 20.0, 100.0).unwrap();
        agent.set_speed(1.0).unwrap();
        let slow = Boid::with_agent(agent.clone(), 6.0);
        let adjusted = slow.anti_stall_adjustment(Vector3::new(1.0, 0.0, -1.0));
        assert!(adjusted.is_equal_within_epsilon(Vector3::new(1.0, 0.0, 90.0)));

        // Forward-pointing steering passes through.
        let ahead = Vector3::new(1.0, 0.0, 1.0);
        assert_eq!(slow.anti_stall_adjustment(ahead), ahead);

        agent.set_speed(15.0).unwrap();
        let fast = Boid::with_agent(agent, 6.0);
        let braking = Vector3::new(1.0, 0.0, -1.0);
        assert_eq!(fast.anti_stall_adjustment(braking), braking);
    }

    #[test]
    fn nearest_neighbors_sorted_by_distance() {
        let snapshot: Vec<BoidSnapshot> = [0.0, 1.0, 2.0, 3.0, 10.0]
            .iter()
            .map(|&x| snapshot_at(Vector3::new(x, 0.0, 0.0), Vector3::Z))
            .collect();
        assert_eq!(Boid::nearest_neighbor_indices(2, &snapshot, 2), vec![1, 3]);
        assert_eq!(Boid::nearest_neighbor_indices(0, &snapshot, 10), vec![1, 2, 3, 4]);
        assert!(Boid::nearest_neighbor_indices(9, &snapshot, 3).is_empty());
    }

    #[test]
    fn neighbor_cache_refreshes_on_schedule() {
        let mut boid = boid_at_origin();
        let mut snapshot: Vec<BoidSnapshot> = [0.0, 1.0, 5.0]
            .iter()
            .map(|&x| snapshot_at(Vector3::new(x, 0.0, 0.0), Vector3::Z))
            .collect();
        assert_eq!(boid.nearest_neighbors(0, &snapshot, 1, 0.5, 0.1), &[1]);

        // Boid 2 moves closer, but the cache is still fresh.
        snapshot[2].position = Vector3::new(0.5, 0.0, 0.0);
        assert_eq!(boid.nearest_neighbors(0, &snapshot, 1, 0.5, 0.1), &[1]);
        for _ in 0..5 {
            boid.nearest_neighbors(0, &snapshot, 1, 0.5, 0.1);
        }
        assert_eq!(boid.cached_neighbors(), &[2]);

        // A shrunken flock forces a refresh immediately.
        snapshot.truncate(2);
        assert_eq!(boid.nearest_neighbors(0, &snapshot, 1, 0.5, 0.0), &[1]);
    }

    #[test]
    fn plan_then_apply_moves_the_boid() {
        let mut boid = boid_at_origin();
        let snapshot = vec![boid.snapshot()];
        let mut rng = RandomSequence::default();
        let planned = boid.plan_next_steer(0, &snapshot, &mut rng, &BehaviorTuning::default(), 1.0 / 60.0);
        assert_eq!(planned, boid.next_steer());
        assert!(planned.dot(Vector3::Z) > 0.0);
        boid.apply_next_steer(1.0 / 60.0).unwrap();
        assert!(boid.position().z > 0.0);
        assert!(boid.agent().local_space().is_orthonormal(1.0e-5));
    }

    #[test]
    fn body_triangle_follows_pose() {
        let mut agent = Agent::new();
        agent.set_local_space(LocalSpace::new(
            Vector3::X,
            Vector3::Y,
            Vector3::Z,
            Vector3::new(1.0, 2.0, 3.0),
        ));
        let boid = Boid::with_agent(agent, 0.0);
        let [nose, left, right] = boid.body_triangle(0.5);
        assert_eq!(nose, Vector3::new(1.0, 2.0, 3.5));
        assert_eq!(left, Vector3::new(1.5, 2.0, 2.5));
        assert_eq!(right, Vector3::new(0.5, 2.0, 2.5));
    }
}
