//! `Spheres`: a fixed-size union-of-spheres geometry, the representation
//! used by every nucleus agent in this crate.

use crate::aabb::{AxisAlignedBoundingBox, ProximityPair};
use crate::vector::Vector3d;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spheres {
    centres: Vec<Vector3d>,
    radii: Vec<f64>,
    pub aabb: AxisAlignedBoundingBox,
    pub version: u64,
}

impl Spheres {
    pub fn new(no_of_spheres: usize) -> Self {
        Spheres {
            centres: vec![Vector3d::ZERO; no_of_spheres],
            radii: vec![0.0; no_of_spheres],
            aabb: AxisAlignedBoundingBox::default(),
            version: 0,
        }
    }

    pub fn from_parts(centres: Vec<Vector3d>, radii: Vec<f64>) -> Self {
        assert_eq!(centres.len(), radii.len());
        Spheres {
            centres,
            radii,
            aabb: AxisAlignedBoundingBox::default(),
            version: 0,
        }
    }

    pub fn no_of_spheres(&self) -> usize {
        self.centres.len()
    }

    pub fn centres(&self) -> &[Vector3d] {
        &self.centres
    }

    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    pub fn centre(&self, i: usize) -> Vector3d {
        self.centres[i]
    }

    pub fn radius(&self, i: usize) -> f64 {
        self.radii[i]
    }

    pub fn update_centre(&mut self, i: usize, centre: Vector3d) {
        self.centres[i] = centre;
    }

    pub fn update_radius(&mut self, i: usize, radius: f64) {
        self.radii[i] = radius;
    }

    /// Recomputes the AABB as the union of every sphere's own AABB and
    /// bumps `version`.
    pub fn update_own_aabb(&mut self) {
        self.aabb.reset();
        for (c, r) in self.centres.iter().zip(self.radii.iter()) {
            self.aabb.grow_to_contain(*c - Vector3d::splat(*r));
            self.aabb.grow_to_contain(*c + Vector3d::splat(*r));
        }
        self.version += 1;
    }

    /// Index of the first sphere (other than `ignore`) containing `point`,
    /// or `None` if the point is outside the union.
    pub fn collide_with_point(&self, point: Vector3d, ignore: Option<usize>) -> Option<usize> {
        self.centres.iter().zip(self.radii.iter()).enumerate().find_map(|(i, (c, r))| {
            if Some(i) == ignore {
                return None;
            }
            ((point - *c).len2() <= r * r).then_some(i)
        })
    }
}

/// For every non-zero-radius local sphere, finds the nearest other sphere
/// by surface-to-surface distance and emits one `ProximityPair`.
///
/// Multiple local spheres may point at the same foreign sphere; this is
/// expected, not deduplicated.
pub fn get_distance_spheres_spheres(local: &Spheres, other: &Spheres, out: &mut Vec<ProximityPair>) {
    for i in 0..local.no_of_spheres() {
        let r_i = local.radius(i);
        if r_i <= 0.0 {
            continue;
        }
        let c_i = local.centre(i);

        let mut best: Option<(usize, f64)> = None;
        for j in 0..other.no_of_spheres() {
            let c_j = other.centre(j);
            let centre_dist = (c_j - c_i).len();
            let surface_dist = centre_dist - r_i - other.radius(j);
            if best.map_or(true, |(_, d)| surface_dist < d) {
                best = Some((j, surface_dist));
            }
        }

        if let Some((j, surface_dist)) = best {
            let c_j = other.centre(j);
            let dir = (c_j - c_i).normalized_or_zero();
            let local_pos = c_i + dir * r_i;
            let other_pos = c_j - dir * other.radius(j);
            out.push(ProximityPair::with_hints(
                local_pos,
                other_pos,
                surface_dist,
                i as i64,
                j as i64,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_spheres_report_negative_distance() {
        let mut a = Spheres::new(1);
        a.update_centre(0, Vector3d::new(0.0, 0.0, 0.0));
        a.update_radius(0, 3.0);
        let mut b = Spheres::new(1);
        b.update_centre(0, Vector3d::new(4.0, 0.0, 0.0));
        b.update_radius(0, 3.0);

        let mut out = Vec::new();
        get_distance_spheres_spheres(&a, &b, &mut out);
        assert_eq!(out.len(), 1);
        assert!(out[0].distance < 0.0);
        assert_eq!(out[0].local_hint, 0);
        assert_eq!(out[0].other_hint, 0);
    }

    #[test]
    fn zero_radius_local_spheres_are_skipped() {
        let a = Spheres::new(1);
        let mut b = Spheres::new(1);
        b.update_radius(0, 1.0);
        let mut out = Vec::new();
        get_distance_spheres_spheres(&a, &b, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn aabb_encloses_every_sphere() {
        let mut s = Spheres::new(2);
        s.update_centre(0, Vector3d::new(0.0, 0.0, 0.0));
        s.update_radius(0, 1.0);
        s.update_centre(1, Vector3d::new(10.0, 0.0, 0.0));
        s.update_radius(1, 2.0);
        s.update_own_aabb();
        assert_eq!(s.aabb.min_corner, Vector3d::new(-1.0, -1.0, -1.0));
        assert_eq!(s.aabb.max_corner, Vector3d::new(12.0, 2.0, 2.0));
        assert_eq!(s.version, 1);
    }
}
