/*
 * Flock Module
 *
 * Owns the boids and advances them one simulation step at a time:
 * 1. Snapshot every boid's position and heading
 * 2. Plan: each boid computes its steering force against the snapshot
 * 3. Apply: each boid integrates its own planned force
 *
 * No boid ever reads another boid's half-updated state, so the order boids
 * are visited in does not matter. Each boid also owns its random stream,
 * forked from a master sequence seeded by `FlockParams::seed`, which lets the
 * optional rayon path produce exactly the same flock as the sequential one.
 */

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::agent::{Agent, Steerable};
use crate::boid::{Boid, BoidSnapshot};
use crate::error::SteerError;
use crate::local_space::LocalSpace;
use crate::params::FlockParams;
use crate::random::RandomSequence;
use crate::vector3::Vector3;

pub struct Flock {
    boids: Vec<Boid>,
    // One stream per boid, same index
    streams: Vec<RandomSequence>,
    // Drives spawning and forks the per-boid streams
    rng: RandomSequence,
    params: FlockParams,
    step_count: u64,
}

impl Flock {
    pub fn new(params: FlockParams) -> Result<Self, SteerError> {
        params.validate()?;
        let mut flock = Self {
            boids: Vec::with_capacity(params.num_boids),
            streams: Vec::with_capacity(params.num_boids),
            rng: RandomSequence::new(params.seed),
            params,
            step_count: 0,
        };
        flock.spawn_boids(flock.params.num_boids)?;
        debug!(boids = flock.boids.len(), seed = flock.params.seed, "flock spawned");
        Ok(flock)
    }

    // Reset boids to their seeded starting state
    pub fn reset(&mut self) -> Result<(), SteerError> {
        self.rng = RandomSequence::new(self.params.seed);
        self.boids.clear();
        self.streams.clear();
        self.step_count = 0;
        self.spawn_boids(self.params.num_boids)?;
        debug!(boids = self.boids.len(), seed = self.params.seed, "flock reset");
        Ok(())
    }

    /// Grow or shrink the flock. Surviving boids keep their state; new ones
    /// are spawned from the master sequence.
    pub fn resize(&mut self, num_boids: usize) -> Result<(), SteerError> {
        if num_boids < self.boids.len() {
            self.boids.truncate(num_boids);
            self.streams.truncate(num_boids);
        } else {
            self.spawn_boids(num_boids - self.boids.len())?;
        }
        self.params.num_boids = num_boids;
        for boid in &mut self.boids {
            boid.invalidate_neighbors();
        }
        debug!(boids = num_boids, "flock resized");
        Ok(())
    }

    /// Adopt new parameters, doing only the work the change requires.
    pub fn apply_params(&mut self, params: FlockParams) -> Result<(), SteerError> {
        params.validate()?;
        let changes = params.detect_changes(&self.params);
        self.params = params;
        if changes.seed {
            return self.reset();
        }
        if changes.limits {
            let (max_speed, max_force, min_speed) =
                (self.params.max_speed, self.params.max_force, self.params.min_speed());
            for boid in &mut self.boids {
                boid.agent_mut().set_max_speed(max_speed)?;
                boid.agent_mut().set_max_force(max_force)?;
                boid.set_min_speed(min_speed)?;
            }
        }
        if changes.num_boids {
            self.resize(self.params.num_boids)?;
        }
        Ok(())
    }

    fn spawn_boids(&mut self, count: usize) -> Result<(), SteerError> {
        for _ in 0..count {
            let boid = self.spawn_boid()?;
            let stream = self.rng.fork();
            self.boids.push(boid);
            self.streams.push(stream);
        }
        Ok(())
    }

    // Random position in a cube around the origin, random heading, flying at
    // minimum speed.
    fn spawn_boid(&mut self) -> Result<Boid, SteerError> {
        let r = self.params.spawn_radius;
        let position = Vector3::new(
            self.rng.gen_range(-r..r),
            self.rng.gen_range(-r..r),
            self.rng.gen_range(-r..r),
        );
        let forward = self.rng.random_unit_vector();
        let up = forward.find_perpendicular();
        let side = forward.cross(up).normalize();

        let mut agent = Agent::with_limits(1.0, self.params.max_speed, self.params.max_force)?;
        agent.set_local_space(LocalSpace::new(side, up, forward, position));
        agent.set_speed(self.params.min_speed())?;
        Ok(Boid::with_agent(agent, self.params.min_speed()))
    }

    /// Advance every boid by `time_step` seconds.
    ///
    /// A step either moves every boid or none of them. If any planned force is
    /// not finite the error is returned before applying; planning state
    /// (wander, steering memory, neighbor caches, random streams) has still
    /// advanced.
    pub fn step(&mut self, time_step: f32) -> Result<(), SteerError> {
        if !(time_step.is_finite() && time_step >= 0.0) {
            return Err(SteerError::InvalidTimeStep(time_step));
        }
        let snapshot: Vec<BoidSnapshot> = self.boids.iter().map(Boid::snapshot).collect();
        let tuning = self.params.tuning;

        if self.params.enable_parallel {
            self.boids
                .par_iter_mut()
                .zip(self.streams.par_iter_mut())
                .enumerate()
                .for_each(|(i, (boid, rng))| {
                    boid.plan_next_steer(i, &snapshot, rng, &tuning, time_step);
                });
            self.check_planned_forces()?;
            self.boids
                .par_iter_mut()
                .try_for_each(|boid| boid.apply_next_steer(time_step))?;
        } else {
            for (i, (boid, rng)) in self.boids.iter_mut().zip(self.streams.iter_mut()).enumerate() {
                boid.plan_next_steer(i, &snapshot, rng, &tuning, time_step);
            }
            self.check_planned_forces()?;
            for boid in &mut self.boids {
                boid.apply_next_steer(time_step)?;
            }
        }

        self.step_count += 1;
        trace!(step = self.step_count, mean_speed = self.mean_speed(), "flock stepped");
        Ok(())
    }

    fn check_planned_forces(&self) -> Result<(), SteerError> {
        for boid in &self.boids {
            SteerError::check_vector("planned steering force", boid.next_steer())?;
        }
        Ok(())
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Average boid position, or the origin for an empty flock.
    pub fn centroid(&self) -> Vector3 {
        if self.boids.is_empty() {
            return Vector3::ZERO;
        }
        self.boids.iter().map(|boid| boid.position()).sum::<Vector3>() / self.boids.len() as f32
    }

    pub fn mean_speed(&self) -> f32 {
        if self.boids.is_empty() {
            return 0.0;
        }
        self.boids.iter().map(|boid| boid.speed()).sum::<f32>() / self.boids.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params(enable_parallel: bool) -> FlockParams {
        FlockParams {
            num_boids: 24,
            spawn_radius: 10.0,
            enable_parallel,
            ..FlockParams::default()
        }
    }

    #[test]
    fn spawns_valid_boids() {
        let params = small_params(false);
        let flock = Flock::new(params.clone()).unwrap();
        assert_eq!(flock.len(), 24);
        for boid in flock.boids() {
            assert!(boid.agent().local_space().is_orthonormal(1.0e-5));
            assert!((boid.speed() - params.min_speed()).abs() < 1.0e-5);
            let p = boid.position();
            assert!(p.x.abs() <= 10.0 && p.y.abs() <= 10.0 && p.z.abs() <= 10.0);
        }
    }

    #[test]
    fn rejects_invalid_params() {
        let params = FlockParams {
            max_speed: f32::NAN,
            ..FlockParams::default()
        };
        assert!(Flock::new(params).is_err());

        let huge_cube = FlockParams {
            spawn_radius: f32::MAX,
            ..FlockParams::default()
        };
        assert!(matches!(
            Flock::new(huge_cube),
            Err(SteerError::InvalidParameter { name: "spawn_radius", .. })
        ));
    }

    #[test]
    fn largest_valid_spawn_cube_spawns() {
        let params = FlockParams {
            num_boids: 8,
            spawn_radius: f32::MAX / 4.0,
            ..FlockParams::default()
        };
        let flock = Flock::new(params).unwrap();
        assert!(flock.boids().iter().all(|boid| boid.position().is_finite()));
    }

    #[test]
    fn same_seed_same_flight() {
        let mut a = Flock::new(small_params(false)).unwrap();
        let mut b = Flock::new(small_params(false)).unwrap();
        for _ in 0..30 {
            a.step(1.0 / 60.0).unwrap();
            b.step(1.0 / 60.0).unwrap();
        }
        assert_eq!(a.boids(), b.boids());
        assert_eq!(a.step_count(), 30);

        let mut other = small_params(false);
        other.seed = 7;
        let c = Flock::new(other).unwrap();
        let fresh = Flock::new(small_params(false)).unwrap();
        assert_ne!(c.boids(), fresh.boids());
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut sequential = Flock::new(small_params(false)).unwrap();
        let mut parallel = Flock::new(small_params(true)).unwrap();
        for _ in 0..60 {
            sequential.step(1.0 / 60.0).unwrap();
            parallel.step(1.0 / 60.0).unwrap();
        }
        assert_eq!(sequential.boids(), parallel.boids());
    }

    #[test]
    fn steps_keep_invariants() {
        let mut flock = Flock::new(small_params(true)).unwrap();
        for _ in 0..200 {
            flock.step(1.0 / 60.0).unwrap();
            for boid in flock.boids() {
                assert!(boid.speed() >= 0.0 && boid.speed() <= boid.max_speed());
                assert!(boid.position().is_finite());
                assert!(boid.agent().local_space().is_orthonormal(1.0e-4));
            }
        }
    }

    #[test]
    fn invalid_time_step_changes_nothing() {
        let mut flock = Flock::new(small_params(false)).unwrap();
        let before = flock.boids().to_vec();
        assert_eq!(flock.step(f32::INFINITY), Err(SteerError::InvalidTimeStep(f32::INFINITY)));
        assert_eq!(flock.step_count(), 0);
        assert_eq!(flock.boids(), &before[..]);
    }

    #[test]
    fn bad_planned_force_moves_no_boid() {
        for enable_parallel in [false, true] {
            let mut flock = Flock::new(small_params(enable_parallel)).unwrap();
            // Corrupt the last boid's heading so only its plan goes non-finite
            let last = flock.boids.len() - 1;
            let mut ls = *flock.boids[last].agent().local_space();
            ls.set_ijkp(ls.i(), ls.j(), Vector3::new(f32::NAN, 0.0, 0.0), ls.p());
            flock.boids[last].agent_mut().set_local_space(ls);
            let positions: Vec<Vector3> = flock.boids()[..last].iter().map(|boid| boid.position()).collect();
            let speeds: Vec<f32> = flock.boids()[..last].iter().map(|boid| boid.speed()).collect();

            assert!(matches!(
                flock.step(1.0 / 60.0),
                Err(SteerError::NonFiniteVector { .. })
            ));
            assert_eq!(flock.step_count(), 0);
            for (i, boid) in flock.boids()[..last].iter().enumerate() {
                assert_eq!(boid.position(), positions[i]);
                assert_eq!(boid.speed(), speeds[i]);
            }
        }
    }

    #[test]
    fn resize_keeps_existing_boids() {
        let mut flock = Flock::new(small_params(false)).unwrap();
        let first = flock.boids()[0].agent().clone();
        flock.resize(40).unwrap();
        assert_eq!(flock.len(), 40);
        assert_eq!(flock.params().num_boids, 40);
        assert_eq!(flock.boids()[0].agent(), &first);
        flock.resize(3).unwrap();
        assert_eq!(flock.len(), 3);
        flock.step(1.0 / 60.0).unwrap();
        flock.resize(0).unwrap();
        assert!(flock.is_empty());
        flock.step(1.0 / 60.0).unwrap();
        assert_eq!(flock.centroid(), Vector3::ZERO);
        assert_eq!(flock.mean_speed(), 0.0);
    }

    #[test]
    fn reset_restores_the_seeded_start() {
        let fresh = Flock::new(small_params(false)).unwrap();
        let mut flock = Flock::new(small_params(false)).unwrap();
        for _ in 0..10 {
            flock.step(1.0 / 60.0).unwrap();
        }
        flock.reset().unwrap();
        assert_eq!(flock.boids(), fresh.boids());
        assert_eq!(flock.step_count(), 0);
    }

    #[test]
    fn new_limits_reach_every_boid() {
        let mut flock = Flock::new(small_params(false)).unwrap();
        let mut params = flock.params().clone();
        params.max_speed = 4.0;
        params.max_force = 2.0;
        params.num_boids = 30;
        flock.apply_params(params).unwrap();
        assert_eq!(flock.len(), 30);
        for boid in &flock.boids()[..24] {
            assert_eq!(boid.max_speed(), 4.0);
            assert_eq!(boid.max_force(), 2.0);
            assert!(boid.speed() <= 4.0);
        }

        let mut bad = flock.params().clone();
        bad.time_step = -1.0;
        assert!(flock.apply_params(bad).is_err());
    }
}
