/*
 * Random Sequence Module
 *
 * Deterministic pseudo-random generator for reproducible simulations. Each
 * instance owns a 32 bit state advanced by an integer avalanche hash (not
 * cryptographic). Two sequences built from the same seed produce identical
 * streams, which is what lets a flock be replayed exactly.
 *
 * RandomSequence also implements rand's RngCore and SeedableRng so it can
 * drive rand distributions (Rng::gen_range and friends).
 */

use rand::{RngCore, SeedableRng};

use crate::util::{interpolate, rehash32bits};
use crate::vector3::Vector3;

pub const DEFAULT_SEED: u32 = 1_234_567_890;

// Rejection sampling accepts ~52% of candidates; hitting this means the
// generator is broken, not unlucky.
const MAX_REJECTION_ITERATIONS: usize = 10_000;

const FORK_MIX: u32 = 0x9e37_79b9;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomSequence {
    state: u32,
}

impl Default for RandomSequence {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RandomSequence {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Reset to a given seed.
    pub fn set_state(&mut self, seed: u32) {
        self.state = seed;
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Derive an independent child sequence, advancing this one by one step.
    pub fn fork(&mut self) -> Self {
        // Seeding with the raw next value would make the child replay the
        // parent's own stream one step ahead.
        Self::new(self.next_uint32() ^ FORK_MIX)
    }

    pub fn next_uint32(&mut self) -> u32 {
        self.state = rehash32bits(self.state);
        self.state
    }

    /// 31 bit non-negative value (top bit masked off).
    pub fn next_positive_int(&mut self) -> i32 {
        (self.next_uint32() & 0x7fff_ffff) as i32
    }

    /// Uniform on [0, 1).
    pub fn uniform_float01(&mut self) -> f32 {
        // 24 bits fill an f32 mantissa exactly, so the result never rounds up to 1.
        (self.next_uint32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Uniform between `a` and `b`.
    pub fn uniform_float(&mut self, a: f32, b: f32) -> f32 {
        interpolate(self.uniform_float01(), a, b)
    }

    /// Uniform integer between the bounds, inclusive, given in either order.
    pub fn uniform_int(&mut self, a: i32, b: i32) -> i32 {
        let (lo, hi) = (a.min(b) as i64, a.max(b) as i64);
        let span = (hi - lo + 1) as u64;
        (lo + (self.next_uint32() as u64 % span) as i64) as i32
    }

    pub fn uniform_bool(&mut self) -> bool {
        self.next_uint32() & 0x8000_0000 != 0
    }

    /// Random point in an axis aligned box, given two opposite corners.
    pub fn random_point_in_box(&mut self, a: Vector3, b: Vector3) -> Vector3 {
        let x = self.uniform_float(a.x.min(b.x), a.x.max(b.x));
        let y = self.uniform_float(a.y.min(b.y), a.y.max(b.y));
        let z = self.uniform_float(a.z.min(b.z), a.z.max(b.z));
        Vector3::new(x, y, z)
    }

    /// Random point inside the unit radius sphere centered on the origin.
    pub fn random_point_in_unit_sphere(&mut self) -> Vector3 {
        let corner = Vector3::new(1.0, 1.0, 1.0);
        for _ in 0..MAX_REJECTION_ITERATIONS {
            let v = self.random_point_in_box(-corner, corner);
            if v.length() <= 1.0 {
                return v;
            }
        }
        panic!("random_point_in_unit_sphere: no sample accepted in {MAX_REJECTION_ITERATIONS} tries");
    }

    /// Uniformly distributed direction on the unit sphere.
    pub fn random_unit_vector(&mut self) -> Vector3 {
        for _ in 0..MAX_REJECTION_ITERATIONS {
            let v = self.random_point_in_unit_sphere();
            let m = v.length();
            if m > 0.0 {
                return v / m;
            }
        }
        panic!("random_unit_vector: no nonzero sample in {MAX_REJECTION_ITERATIONS} tries");
    }
}

impl RngCore for RandomSequence {
    fn next_u32(&mut self) -> u32 {
        self.next_uint32()
    }

    fn next_u64(&mut self) -> u64 {
        let low = self.next_uint32() as u64;
        let high = self.next_uint32() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_uint32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for RandomSequence {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
