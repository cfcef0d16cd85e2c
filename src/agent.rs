/*
 * Agent Module
 *
 * A steerable agent: a local coordinate space (pose) plus simple forward
 * flight dynamics. Each call to `steer` clamps the steering force, converts it
 * to a velocity change, and replaces the whole pose.
 *
 * Frame convention: side = forward x up. A turn re-derives side from the new
 * forward and the previous up, then re-derives up from side and forward, so
 * the agent does not bank.
 */

use std::fmt;

use tracing::trace;

use crate::error::SteerError;
use crate::local_space::LocalSpace;
use crate::util;
use crate::vector3::Vector3;

pub const DEFAULT_MASS: f32 = 1.0;
pub const DEFAULT_MAX_SPEED: f32 = 10.0;
pub const DEFAULT_MAX_FORCE: f32 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    ls: LocalSpace,     // Local coordinate space (position, orientation)
    mass: f32,          // Normally left at 1
    speed: f32,         // Current forward speed (m/s)
    max_speed: f32,     // Speed upper limit (m/s)
    max_force: f32,     // Steering force upper limit
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            ls: LocalSpace::default(),
            mass: DEFAULT_MASS,
            speed: 0.0,
            max_speed: DEFAULT_MAX_SPEED,
            max_force: DEFAULT_MAX_FORCE,
        }
    }
}

impl Agent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mass: f32, max_speed: f32, max_force: f32) -> Result<Self, SteerError> {
        let mut agent = Self::default();
        agent.set_mass(mass)?;
        agent.set_max_speed(max_speed)?;
        agent.set_max_force(max_force)?;
        Ok(agent)
    }

    // For limits fixed in code, which must be finite and non-negative.
    // Speed is clipped to max_speed.
    pub(crate) fn with_fixed_limits(max_speed: f32, max_force: f32, speed: f32) -> Self {
        debug_assert!(SteerError::check_limit("max_speed", max_speed).is_ok());
        debug_assert!(SteerError::check_limit("max_force", max_force).is_ok());
        Self {
            speed: util::clip(speed, 0.0, max_speed),
            max_speed,
            max_force,
            ..Self::default()
        }
    }

    pub fn local_space(&self) -> &LocalSpace {
        &self.ls
    }

    /// Place the agent. The frame is taken as given; callers supply an
    /// orthonormal basis.
    pub fn set_local_space(&mut self, ls: LocalSpace) {
        self.ls = ls;
    }

    pub fn side(&self) -> Vector3 {
        self.ls.i()
    }

    pub fn up(&self) -> Vector3 {
        self.ls.j()
    }

    pub fn forward(&self) -> Vector3 {
        self.ls.k()
    }

    pub fn position(&self) -> Vector3 {
        self.ls.p()
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn max_force(&self) -> f32 {
        self.max_force
    }

    pub fn velocity(&self) -> Vector3 {
        self.forward() * self.speed
    }

    pub fn set_mass(&mut self, mass: f32) -> Result<(), SteerError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SteerError::InvalidMass(mass));
        }
        self.mass = mass;
        Ok(())
    }

    /// Set the speed limit; the current speed is clipped to the new limit.
    pub fn set_max_speed(&mut self, max_speed: f32) -> Result<(), SteerError> {
        self.max_speed = SteerError::check_limit("max_speed", max_speed)?;
        self.speed = util::clip(self.speed, 0.0, self.max_speed);
        Ok(())
    }

    pub fn set_max_force(&mut self, max_force: f32) -> Result<(), SteerError> {
        self.max_force = SteerError::check_limit("max_force", max_force)?;
        Ok(())
    }

    /// Set the current speed, clipped to [0, max_speed].
    pub fn set_speed(&mut self, speed: f32) -> Result<(), SteerError> {
        let speed = SteerError::check_limit("speed", speed)?;
        self.speed = util::clip(speed, 0.0, self.max_speed);
        Ok(())
    }

    /// Advance the agent by `time_step` while applying `steering_force`.
    pub fn steer(&mut self, steering_force: Vector3, time_step: f32) -> Result<(), SteerError> {
        SteerError::check_vector("steering force", steering_force)?;
        if !(time_step.is_finite() && time_step >= 0.0) {
            return Err(SteerError::InvalidTimeStep(time_step));
        }
        // Limit steering force by max force (simulates power or thrust limit).
        let limited_force = steering_force.truncate(self.max_force);
        // Adjust force by mass to get acceleration.
        let acceleration = limited_force / self.mass;
        self.update_speed_and_local_space(acceleration * time_step);
        Ok(())
    }

    /// Apply a velocity change: update speed, then rebuild the frame around
    /// the new heading and advance position by one step of the new speed.
    ///
    /// At zero resulting speed the heading is undefined, so orientation and
    /// position are left exactly as they were.
    pub fn update_speed_and_local_space(&mut self, velocity_delta: Vector3) {
        let new_velocity = self.velocity() + velocity_delta;
        let new_speed = new_velocity.length();
        self.speed = util::clip(new_speed, 0.0, self.max_speed);

        if self.speed > 0.0 {
            let new_forward = new_velocity / new_speed;
            let new_side = self.side_for_heading(new_forward);
            let new_up = new_side.cross(new_forward).normalize();
            let new_position = self.position() + (new_forward * self.speed);
            self.ls.set_ijkp(new_side, new_up, new_forward, new_position);
        }
        trace!(speed = self.speed, pose = %self.ls, "agent updated");
    }

    // Side axis for a new heading: normalize(forward x old up). Only when that
    // cross product is exactly zero (heading on the old up axis) does the old
    // side, with its forward part removed, stand in.
    fn side_for_heading(&self, new_forward: Vector3) -> Vector3 {
        let side = new_forward.cross(self.up());
        let largest = side.x.abs().max(side.y.abs()).max(side.z.abs());
        if largest > 0.0 {
            // Rescale first so tiny cross products do not underflow in length()
            let side = (side / largest).normalize();
            if side.is_finite() {
                return side;
            }
        }
        let fallback = self.side().perpendicular_component(new_forward);
        if fallback.is_zero_length() {
            new_forward.find_perpendicular()
        } else {
            fallback.normalize()
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s={} {}", self.speed, self.ls)
    }
}

/// Capabilities shared by anything built around an `Agent`.
///
/// Types embed an `Agent` and expose it through `agent`/`agent_mut`; the
/// provided methods forward to it.
pub trait Steerable {
    fn agent(&self) -> &Agent;
    fn agent_mut(&mut self) -> &mut Agent;

    fn side(&self) -> Vector3 {
        self.agent().side()
    }

    fn up(&self) -> Vector3 {
        self.agent().up()
    }

    fn forward(&self) -> Vector3 {
        self.agent().forward()
    }

    fn position(&self) -> Vector3 {
        self.agent().position()
    }

    fn speed(&self) -> f32 {
        self.agent().speed()
    }

    fn velocity(&self) -> Vector3 {
        self.agent().velocity()
    }

    fn max_speed(&self) -> f32 {
        self.agent().max_speed()
    }

    fn max_force(&self) -> f32 {
        self.agent().max_force()
    }

    fn steer(&mut self, steering_force: Vector3, time_step: f32) -> Result<(), SteerError> {
        self.agent_mut().steer(steering_force, time_step)
    }
}

impl Steerable for Agent {
    fn agent(&self) -> &Agent {
        self
    }

    fn agent_mut(&mut self) -> &mut Agent {
        self
    }
}
