//! A plain 3D vector used throughout embryogen for positions, forces,
//! velocities and pixel/voxel coordinates alike.
//!
//! Mirrors the original `Vector3d<T>` template: no linear-algebra crate
//! dependency, just the handful of element-wise and scalar operations the
//! geometry kernel and integrator actually need.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

/// A 3D vector over `f64`, used for positions, velocities, offsets and
/// (via [`super::force::ForceVector3d`]) forces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub const ZERO: Vector3d = Vector3d {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3d { x, y, z }
    }

    /// A vector with all three components set to the same scalar.
    pub fn splat(v: f64) -> Self {
        Vector3d { x: v, y: v, z: v }
    }

    pub fn len2(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn len(&self) -> f64 {
        self.len2().sqrt()
    }

    pub fn dot(&self, other: &Vector3d) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Normalizes in place, degrading to the zero vector rather than
    /// producing NaNs when the length is zero.
    pub fn change_to_unit_or_zero(&mut self) -> &mut Self {
        let l2 = self.len2();
        if l2 > 0.0 {
            let l = l2.sqrt();
            self.x /= l;
            self.y /= l;
            self.z /= l;
        }
        self
    }

    pub fn normalized_or_zero(&self) -> Vector3d {
        let mut v = *self;
        v.change_to_unit_or_zero();
        v
    }

    pub fn elem_min(&self, other: &Vector3d) -> Vector3d {
        Vector3d::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn elem_max(&self, other: &Vector3d) -> Vector3d {
        Vector3d::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn elem_mult(&self, other: &Vector3d) -> Vector3d {
        Vector3d::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    pub fn elem_div_by(&self, other: &Vector3d) -> Vector3d {
        Vector3d::new(self.x / other.x, self.y / other.y, self.z / other.z)
    }

    pub fn elem_abs(&self) -> Vector3d {
        Vector3d::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn elem_is_less_than(&self, other: &Vector3d) -> bool {
        self.x < other.x && self.y < other.y && self.z < other.z
    }

    pub fn elem_is_greater_than(&self, other: &Vector3d) -> bool {
        self.x > other.x && self.y > other.y && self.z > other.z
    }

    /// Converts a pixel/voxel coordinate (this vector) into a micron
    /// coordinate given the per-axis resolution (px per micron) and offset.
    pub fn to_microns(&self, res: &Vector3d, off: &Vector3d) -> Vector3d {
        Vector3d::new(
            self.x / res.x + off.x,
            self.y / res.y + off.y,
            self.z / res.z + off.z,
        )
    }

    /// Converts a micron coordinate (this vector) into a (possibly
    /// fractional) pixel/voxel coordinate.
    pub fn to_pixels(&self, res: &Vector3d, off: &Vector3d) -> Vector3d {
        Vector3d::new(
            (self.x - off.x) * res.x,
            (self.y - off.y) * res.y,
            (self.z - off.z) * res.z,
        )
    }

    /// Converts from the *centre* of the given integer pixel coordinate
    /// into a micron coordinate.
    pub fn to_microns_from(px: &VoxelCoord, res: &Vector3d, off: &Vector3d) -> Vector3d {
        Vector3d::new(
            (px.x as f64 + 0.5) / res.x + off.x,
            (px.y as f64 + 0.5) / res.y + off.y,
            (px.z as f64 + 0.5) / res.z + off.z,
        )
    }

    /// Converts this micron coordinate into the nearest integer
    /// pixel/voxel coordinate, rounding (not truncating).
    pub fn to_pixels_rounded(&self, res: &Vector3d, off: &Vector3d) -> VoxelCoord {
        VoxelCoord {
            x: ((self.x - off.x) * res.x + 0.5) as usize,
            y: ((self.y - off.y) * res.y + 0.5) as usize,
            z: ((self.z - off.z) * res.z + 0.5) as usize,
        }
    }
}

impl Add for Vector3d {
    type Output = Vector3d;
    fn add(self, rhs: Vector3d) -> Vector3d {
        Vector3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3d {
    fn add_assign(&mut self, rhs: Vector3d) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vector3d {
    type Output = Vector3d;
    fn sub(self, rhs: Vector3d) -> Vector3d {
        Vector3d::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector3d {
    fn sub_assign(&mut self, rhs: Vector3d) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f64> for Vector3d {
    type Output = Vector3d;
    fn mul(self, rhs: f64) -> Vector3d {
        Vector3d::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vector3d> for f64 {
    type Output = Vector3d;
    fn mul(self, rhs: Vector3d) -> Vector3d {
        rhs * self
    }
}

impl MulAssign<f64> for Vector3d {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl Div<f64> for Vector3d {
    type Output = Vector3d;
    fn div(self, rhs: f64) -> Vector3d {
        Vector3d::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl DivAssign<f64> for Vector3d {
    fn div_assign(&mut self, rhs: f64) {
        self.x /= rhs;
        self.y /= rhs;
        self.z /= rhs;
    }
}

/// An integer voxel/pixel coordinate, as distinct from a continuous
/// `Vector3d` micron position (mirrors the original's `Vector3d<size_t>`
/// used for image indexing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
pub struct VoxelCoord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl VoxelCoord {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        VoxelCoord { x, y, z }
    }

    /// Flattens this coordinate into a linear offset into an image of the
    /// given size, x fastest-varying.
    pub fn to_img_index(&self, img_size: &VoxelCoord) -> usize {
        self.x + img_size.x * (self.y + img_size.y * self.z)
    }

    /// Inverse of [`VoxelCoord::to_img_index`].
    ///
    /// The coordinate this was ported from computed `z` twice and never
    /// wrote `x`, leaving every recovered coordinate's x component at
    /// whatever it held before the call. Corrected here: the final
    /// assignment lands in `x`, not `z`.
    pub fn from_img_index(idx: usize, img_size: &VoxelCoord) -> VoxelCoord {
        let plane = img_size.x * img_size.y;
        let z = idx / plane;
        let rem = idx - z * plane;
        let y = rem / img_size.x;
        let x = rem - img_size.x * y;
        VoxelCoord { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_to_unit_or_zero_degrades_gracefully() {
        let mut v = Vector3d::ZERO;
        v.change_to_unit_or_zero();
        assert_eq!(v, Vector3d::ZERO);

        let mut v = Vector3d::new(3.0, 4.0, 0.0);
        v.change_to_unit_or_zero();
        assert!((v.len() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn img_index_roundtrip() {
        let size = VoxelCoord::new(16, 20, 4);
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let p = VoxelCoord::new(x, y, z);
                    let idx = p.to_img_index(&size);
                    assert_eq!(VoxelCoord::from_img_index(idx, &size), p);
                }
            }
        }
    }

    #[test]
    fn microns_pixels_are_inverse_at_voxel_centres() {
        let res = Vector3d::new(4.0, 4.0, 1.0);
        let off = Vector3d::new(-10.0, -10.0, 0.0);
        let px = VoxelCoord::new(5, 7, 2);
        let microns = Vector3d::to_microns_from(&px, &res, &off);
        let back = microns.to_pixels_rounded(&res, &off);
        assert_eq!(back, px);
    }
}
