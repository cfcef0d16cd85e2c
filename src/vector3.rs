/*
 * Vector3 Module
 *
 * Cartesian 3-D vector value type used for positions, directions and forces.
 * Vector3 is Copy; every operation returns a new value.
 */

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::util::{self, EPSILON};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, v: Self) -> f32 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Unit vector in the same direction. Undefined (NaN) for a zero vector;
    /// use `normalize_or_zero` when the input may be degenerate.
    pub fn normalize(self) -> Self {
        self / self.length()
    }

    pub fn normalize_or_zero(self) -> Self {
        if self.is_zero_length() {
            self
        } else {
            self.normalize()
        }
    }

    pub fn normalize_and_length(self) -> (Self, f32) {
        let length = self.length();
        (self / length, length)
    }

    pub fn is_unit_length(self) -> bool {
        util::within_epsilon(self.length_squared(), 1.0, EPSILON)
    }

    pub fn is_zero_length(self) -> bool {
        util::within_epsilon(self.length_squared(), 0.0, EPSILON * EPSILON)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    // (From https://en.wikipedia.org/wiki/Cross_product#Matrix_notation)
    pub fn cross(self, b: Self) -> Self {
        Self::new(
            self.y * b.z - self.z * b.y,
            self.z * b.x - self.x * b.z,
            self.x * b.y - self.y * b.x,
        )
    }

    /// Vector parallel to `self` but no longer than `max_length`.
    pub fn truncate(self, max_length: f32) -> Self {
        let length = self.length();
        if length <= max_length {
            self
        } else {
            self * (max_length / length)
        }
    }

    /// Component of `self` parallel to a unit basis vector.
    pub fn parallel_component(self, unit_basis: Self) -> Self {
        debug_assert!(unit_basis.is_unit_length());
        unit_basis * self.dot(unit_basis)
    }

    /// Component of `self` perpendicular to a unit basis vector.
    pub fn perpendicular_component(self, unit_basis: Self) -> Self {
        self - self.parallel_component(unit_basis)
    }

    /// Angle in radians between two arbitrary (nonzero) direction vectors.
    pub fn angle_between(self, other: Self) -> f32 {
        let cosine = self.dot(other) / (self.length() * other.length());
        util::clip(cosine, -1.0, 1.0).acos()
    }

    /// Axis-angle rotation: the axis direction with its length set to `angle`.
    pub fn axis_angle(axis: Self, angle: f32) -> Self {
        if angle != 0.0 && axis.length_squared() > 0.0 {
            axis.normalize() * angle
        } else {
            Self::ZERO
        }
    }

    /// Axis-angle that rotates `from` onto `to`.
    pub fn rotate_vec_to_vec(from: Self, to: Self) -> Self {
        Self::axis_angle(from.cross(to), from.angle_between(to))
    }

    pub fn is_perpendicular(self, other: Self) -> bool {
        debug_assert!(self.is_unit_length() && other.is_unit_length());
        util::within_epsilon(self.dot(other), 0.0, EPSILON)
    }

    /// True for parallel or anti-parallel unit vectors.
    pub fn is_parallel(self, other: Self) -> bool {
        debug_assert!(self.is_unit_length() && other.is_unit_length());
        util::within_epsilon(self.dot(other).abs(), 1.0, EPSILON)
    }

    /// Some unit vector perpendicular to this unit vector.
    pub fn find_perpendicular(self) -> Self {
        if self.is_parallel(Self::X) {
            Self::Y
        } else {
            self.cross(Self::X).normalize()
        }
    }

    pub fn is_equal_within_epsilon(self, other: Self) -> bool {
        let epsilon = EPSILON * 10.0;
        util::within_epsilon(self.x, other.x, epsilon)
            && util::within_epsilon(self.y, other.y, epsilon)
            && util::within_epsilon(self.z, other.z, epsilon)
    }

    /// Rotate the x and y components about the z axis.
    pub fn rotate_xy_about_z(self, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(self.x * c + self.y * s, self.y * c - self.x * s, self.z)
    }

    pub fn rotate_xz_about_y(self, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(self.x * c + self.z * s, self.y, self.z * c - self.x * s)
    }

    pub fn rotate_yz_about_x(self, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(self.x, self.y * c + self.z * s, self.z * c - self.y * s)
    }

    /// The longest of the given vectors (zero for an empty input).
    pub fn max_of(vectors: impl IntoIterator<Item = Self>) -> Self {
        let mut longest = Self::ZERO;
        let mut magnitude2 = 0.0;
        for v in vectors {
            let vm2 = v.length_squared();
            if magnitude2 < vm2 {
                magnitude2 = vm2;
                longest = v;
            }
        }
        longest
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, v: Self) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, v: Self) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Self;
    fn mul(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vector3> for f32 {
    type Output = Vector3;
    fn mul(self, v: Vector3) -> Vector3 {
        v * self
    }
}

impl Div<f32> for Vector3 {
    type Output = Self;
    fn div(self, s: f32) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, v: Self) {
        *self = *self + v;
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, v: Self) {
        *self = *self - v;
    }
}

impl MulAssign<f32> for Vector3 {
    fn mul_assign(&mut self, s: f32) {
        *self = *self * s;
    }
}

impl DivAssign<f32> for Vector3 {
    fn div_assign(&mut self, s: f32) {
        *self = *self / s;
    }
}

impl Sum for Vector3 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}
