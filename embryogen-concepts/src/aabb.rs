//! Axis-aligned bounding boxes: the coarse shape every agent and every
//! `FrontOfficer` exchange round publishes before anybody asks for
//! detailed geometry.

use crate::vector::Vector3d;
use serde::{Deserialize, Serialize};

/// A coordinate value placed way outside any realistic scene, used to
/// initialize an AABB into an "empty, ready to be grown" state.
pub const TOO_FAR: f64 = 999_999_999.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAlignedBoundingBox {
    /// bottom-left corner of the box, in microns
    pub min_corner: Vector3d,
    /// upper-right corner of the box, in microns
    pub max_corner: Vector3d,
}

impl Default for AxisAlignedBoundingBox {
    fn default() -> Self {
        let mut b = AxisAlignedBoundingBox {
            min_corner: Vector3d::ZERO,
            max_corner: Vector3d::ZERO,
        };
        b.reset();
        b
    }
}

impl AxisAlignedBoundingBox {
    pub fn new(min_corner: Vector3d, max_corner: Vector3d) -> Self {
        AxisAlignedBoundingBox {
            min_corner,
            max_corner,
        }
    }

    /// Resets the box to an inverted, empty state ready to be grown by
    /// repeated calls to [`AxisAlignedBoundingBox::grow_to_contain`].
    pub fn reset(&mut self) {
        self.min_corner = Vector3d::splat(TOO_FAR);
        self.max_corner = Vector3d::splat(-TOO_FAR);
    }

    pub fn grow_to_contain(&mut self, point: Vector3d) {
        self.min_corner = self.min_corner.elem_min(&point);
        self.max_corner = self.max_corner.elem_max(&point);
    }

    pub fn grow_to_contain_box(&mut self, other: &AxisAlignedBoundingBox) {
        self.min_corner = self.min_corner.elem_min(&other.min_corner);
        self.max_corner = self.max_corner.elem_max(&other.max_corner);
    }

    /// Squared shortest distance along any axis between this and `other`,
    /// or `0.0` if the two boxes intersect.
    pub fn min_distance(&self, other: &AxisAlignedBoundingBox) -> f64 {
        let axis_gap = |a_min: f64, a_max: f64, b_min: f64, b_max: f64| -> f64 {
            if a_max < b_min {
                b_min - a_max
            } else if b_max < a_min {
                a_min - b_max
            } else {
                0.0
            }
        };
        let dx = axis_gap(
            self.min_corner.x,
            self.max_corner.x,
            other.min_corner.x,
            other.max_corner.x,
        );
        let dy = axis_gap(
            self.min_corner.y,
            self.max_corner.y,
            other.min_corner.y,
            other.max_corner.y,
        );
        let dz = axis_gap(
            self.min_corner.z,
            self.max_corner.z,
            other.min_corner.z,
            other.max_corner.z,
        );
        dx * dx + dy * dy + dz * dz
    }

    pub fn intersects(&self, other: &AxisAlignedBoundingBox) -> bool {
        self.min_distance(other) == 0.0
    }
}

/// An [`AxisAlignedBoundingBox`] tagged with the owning agent's id and a
/// hashed type name, so that a `FrontOfficer` can decide whether a remote
/// agent is worth fetching in full before actually requesting its
/// detailed geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NamedAxisAlignedBoundingBox {
    pub aabb: AxisAlignedBoundingBox,
    pub id: i64,
    pub name_id: u64,
}

impl NamedAxisAlignedBoundingBox {
    pub fn new(aabb: AxisAlignedBoundingBox, id: i64, name_id: u64) -> Self {
        NamedAxisAlignedBoundingBox { aabb, id, name_id }
    }
}

/// A pair of nearby points between two agents' geometries, the output of
/// `Geometry::get_distance`. The geometry `get_distance` was called on
/// plays the role of `local`; its argument plays `other`.
///
/// A negative `distance` means the pair is colliding and `abs(distance)`
/// is the penetration depth; a positive `distance` means the pair is the
/// nearest-points estimate between two geometries that do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityPair {
    pub local_pos: Vector3d,
    pub other_pos: Vector3d,
    pub distance: f64,
    pub local_hint: i64,
    pub other_hint: i64,
}

impl ProximityPair {
    pub fn new(local_pos: Vector3d, other_pos: Vector3d, distance: f64) -> Self {
        ProximityPair {
            local_pos,
            other_pos,
            distance,
            local_hint: 0,
            other_hint: 0,
        }
    }

    pub fn with_hints(
        local_pos: Vector3d,
        other_pos: Vector3d,
        distance: f64,
        local_hint: i64,
        other_hint: i64,
    ) -> Self {
        ProximityPair {
            local_pos,
            other_pos,
            distance,
            local_hint,
            other_hint,
        }
    }

    /// Swaps the notion of `local` and `other`, used by
    /// `Geometry::get_symmetric_distance` when only the reverse pair's
    /// dispatch entry is implemented.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.local_pos, &mut self.other_pos);
        std::mem::swap(&mut self.local_hint, &mut self.other_hint);
    }

    pub fn swapped(&self) -> ProximityPair {
        let mut p = *self;
        p.swap();
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_aabb_contains_nothing_until_grown() {
        let mut b = AxisAlignedBoundingBox::default();
        b.grow_to_contain(Vector3d::new(1.0, 2.0, 3.0));
        b.grow_to_contain(Vector3d::new(-1.0, 5.0, 0.0));
        assert_eq!(b.min_corner, Vector3d::new(-1.0, 2.0, 0.0));
        assert_eq!(b.max_corner, Vector3d::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn min_distance_is_zero_when_overlapping() {
        let a = AxisAlignedBoundingBox::new(Vector3d::new(0.0, 0.0, 0.0), Vector3d::new(2.0, 2.0, 2.0));
        let b = AxisAlignedBoundingBox::new(Vector3d::new(1.0, 1.0, 1.0), Vector3d::new(3.0, 3.0, 3.0));
        assert_eq!(a.min_distance(&b), 0.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn min_distance_along_separating_axis() {
        let a = AxisAlignedBoundingBox::new(Vector3d::new(0.0, 0.0, 0.0), Vector3d::new(1.0, 1.0, 1.0));
        let b = AxisAlignedBoundingBox::new(Vector3d::new(4.0, 0.0, 0.0), Vector3d::new(5.0, 1.0, 1.0));
        assert_eq!(a.min_distance(&b), 9.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn swap_exchanges_local_and_other() {
        let p = ProximityPair::with_hints(
            Vector3d::new(1.0, 0.0, 0.0),
            Vector3d::new(2.0, 0.0, 0.0),
            -0.5,
            7,
            9,
        );
        let s = p.swapped();
        assert_eq!(s.local_pos, p.other_pos);
        assert_eq!(s.other_pos, p.local_pos);
        assert_eq!(s.local_hint, 9);
        assert_eq!(s.other_hint, 7);
    }
}
