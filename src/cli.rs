/*
 * Command Line Module
 *
 * Startup options for the flock viewer and the headless runner. Anything set
 * here can still be changed from the control panel once the window is open.
 */

use clap::Parser;

use crate::params::FlockParams;
use crate::random::DEFAULT_SEED;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "flock3d")]
#[command(about = "3-D boid flocking with a deterministic steering engine", long_about = None)]
pub struct Cli {
    /// Master seed; the same seed replays the same flock
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u32,

    /// Number of boids to spawn
    #[arg(short, long, default_value_t = 200)]
    pub boids: usize,

    /// Run without a window and log a summary
    #[arg(long)]
    pub headless: bool,

    /// Simulation steps to run in headless mode
    #[arg(long, default_value_t = 600)]
    pub steps: u64,

    /// Disable rayon and step boids on one thread
    #[arg(long)]
    pub sequential: bool,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn flock_params(&self) -> FlockParams {
        FlockParams {
            num_boids: self.boids,
            seed: self.seed,
            enable_parallel: !self.sequential,
            ..FlockParams::default()
        }
    }
}
