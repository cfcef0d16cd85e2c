/*
 * LocalSpace Module
 *
 * Local coordinate space (pose) of an agent: three basis vectors and a
 * position. Equivalent to a rigid 4x4 homogeneous transform:
 *
 *     [ ix iy iz 0 ]
 *     [ jx jy jz 0 ]
 *     [ kx ky kz 0 ]
 *     [ px py pz 1 ]
 *
 * The basis is only ever replaced as a whole so it cannot drift out of
 * orthonormality one axis at a time.
 */

use std::fmt;

use crate::util;
use crate::vector3::Vector3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalSpace {
    // Basis vectors of local coordinate axes, ijk -> xyz
    i: Vector3,
    j: Vector3,
    k: Vector3,
    // Position of local center
    p: Vector3,
}

impl Default for LocalSpace {
    fn default() -> Self {
        Self {
            i: Vector3::X,
            j: Vector3::Y,
            k: Vector3::Z,
            p: Vector3::ZERO,
        }
    }
}

impl LocalSpace {
    pub fn new(i: Vector3, j: Vector3, k: Vector3, p: Vector3) -> Self {
        Self { i, j, k, p }
    }

    pub fn i(&self) -> Vector3 {
        self.i
    }

    pub fn j(&self) -> Vector3 {
        self.j
    }

    pub fn k(&self) -> Vector3 {
        self.k
    }

    pub fn p(&self) -> Vector3 {
        self.p
    }

    /// Replace all four fields at once.
    pub fn set_ijkp(&mut self, i: Vector3, j: Vector3, k: Vector3, p: Vector3) {
        *self = Self::new(i, j, k, p);
    }

    /// Unit-length, mutually perpendicular basis (within `epsilon`).
    pub fn is_orthonormal(&self, epsilon: f32) -> bool {
        let unit = |v: Vector3| util::within_epsilon(v.length(), 1.0, epsilon);
        let perpendicular = |a: Vector3, b: Vector3| util::within_epsilon(a.dot(b), 0.0, epsilon);
        unit(self.i)
            && unit(self.j)
            && unit(self.k)
            && perpendicular(self.i, self.j)
            && perpendicular(self.j, self.k)
            && perpendicular(self.k, self.i)
    }

    /// Transform a point from this local space into global space.
    pub fn globalize(&self, local: Vector3) -> Vector3 {
        self.p + (self.i * local.x) + (self.j * local.y) + (self.k * local.z)
    }

    /// Transform a global point into this local space (orthonormal basis only).
    pub fn localize(&self, global: Vector3) -> Vector3 {
        let offset = global - self.p;
        Vector3::new(offset.dot(self.i), offset.dot(self.j), offset.dot(self.k))
    }
}

impl fmt::Display for LocalSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[i={}, j={}, k={}, p={}]", self.i, self.j, self.k, self.p)
    }
}
