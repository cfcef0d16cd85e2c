/*
 * flock3d - Module Definitions
 *
 * Core steering engine (vectors, local spaces, agents, boids, the flock)
 * plus the nannou viewer modules that drive and draw it.
 */

// Re-export key components for easier access
pub use agent::{Agent, Steerable};
pub use boid::{Boid, BoidSnapshot};
pub use error::SteerError;
pub use flock::Flock;
pub use local_space::LocalSpace;
pub use params::{BehaviorTuning, FlockParams};
pub use random::RandomSequence;
pub use vector3::Vector3;

// Steering engine
pub mod agent;
pub mod boid;
pub mod error;
pub mod flock;
pub mod local_space;
pub mod params;
pub mod random;
pub mod util;
pub mod vector3;

// Drivers
pub mod app;
pub mod camera;
pub mod cli;
pub mod debug;
pub mod headless;
pub mod input;
pub mod renderer;
pub mod ui;

// Half-length of a boid body, in world units
pub const BOID_SIZE: f32 = 0.5;
