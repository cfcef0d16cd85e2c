/*
 * Utility Module
 *
 * Small scalar helpers shared by the steering code: clipping, interval tests,
 * epsilon comparison, linear interpolation, the integer hash behind
 * RandomSequence, and a low-pass filter for per-step values.
 */

use std::ops::{Add, Mul};

/// Tolerance used by the "within epsilon" predicates on `f32` values.
pub const EPSILON: f32 = 1.0e-6;

/// Linear interpolation: `alpha == 0` gives `p`, `alpha == 1` gives `q`.
pub fn interpolate<T>(alpha: f32, p: T, q: T) -> T
where
    T: Mul<f32, Output = T> + Add<Output = T>,
{
    (p * (1.0 - alpha)) + (q * alpha)
}

/// Constrain `x` to lie between two bounds given in either order.
pub fn clip(x: f32, bound0: f32, bound1: f32) -> f32 {
    let min = bound0.min(bound1);
    let max = bound0.max(bound1);
    let mut clipped = x;
    if clipped < min {
        clipped = min;
    }
    if clipped > max {
        clipped = max;
    }
    clipped
}

pub fn clip01(x: f32) -> f32 {
    clip(x, 0.0, 1.0)
}

/// True when `x` is between the bounds (inclusive, either order).
pub fn between(x: f32, a: f32, b: f32) -> bool {
    a.min(b) <= x && x <= a.max(b)
}

pub fn within_epsilon(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

/// Smooth ramp from 0 to 1 over the unit interval, flat at both ends.
/// Inputs outside [0, 1] are clipped.
pub fn unit_sigmoid_on_01(x: f32) -> f32 {
    (1.0 - (clip01(x) * std::f32::consts::PI).cos()) * 0.5
}

// Robert Jenkins' 32 bit integer hash (as popularized by Thomas Wang).
pub fn rehash32bits(value: u32) -> u32 {
    let mut a = value;
    a = a.wrapping_add(0x7ed5_5d16).wrapping_add(a << 12);
    a = (a ^ 0xc761_c23c) ^ (a >> 19);
    a = a.wrapping_add(0x1656_67b1).wrapping_add(a << 5);
    a = a.wrapping_add(0xd3a2_646c) ^ (a << 9);
    a = a.wrapping_add(0xfd70_46c5).wrapping_add(a << 3);
    a = (a ^ 0xb55a_4f09) ^ (a >> 16);
    a
}

/// Blends per-step values into an accumulator for low-pass filtering.
///
/// `smoothness` around 0.8-0.9 is typical; 1 freezes the value, 0 disables
/// smoothing. The first blended value is taken as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Blender<T> {
    value: Option<T>,
}

impl<T> Blender<T>
where
    T: Copy + Mul<f32, Output = T> + Add<Output = T>,
{
    pub fn new() -> Self {
        Self { value: None }
    }

    pub fn with_value(initial: T) -> Self {
        Self {
            value: Some(initial),
        }
    }

    pub fn blend(&mut self, new_value: T, smoothness: f32) -> T {
        let blended = match self.value {
            None => new_value,
            Some(previous) => interpolate(smoothness, new_value, previous),
        };
        self.value = Some(blended);
        blended
    }

    pub fn value(&self) -> Option<T> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}
