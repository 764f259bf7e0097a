//! `VectorImg`: three parallel scalar images of identical size, resolution
//! and offset, together encoding a 3-D vector field (§3, §4.1.3).

use crate::aabb::{AxisAlignedBoundingBox, ProximityPair};
use crate::geometry::spheres::Spheres;
use crate::vector::{Vector3d, VoxelCoord};
use serde::{Deserialize, Serialize};

/// How the vectors touched near a sphere's surface are summarised into
/// the pair(s) reported for that sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorChoosingPolicy {
    /// the touched vector of smallest magnitude
    MinVec,
    /// the touched vector of largest magnitude
    MaxVec,
    /// the arithmetic mean of every touched vector
    AvgVec,
    /// one pair per touched voxel, no summarising
    AllVec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorImg {
    pub policy: VectorChoosingPolicy,
    pub size: VoxelCoord,
    /// voxels per micron, per axis
    pub resolution: Vector3d,
    /// micron offset of the voxel-space origin
    pub offset: Vector3d,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    pub aabb: AxisAlignedBoundingBox,
    pub version: u64,
}

impl VectorImg {
    pub fn new(policy: VectorChoosingPolicy, size: VoxelCoord, resolution: Vector3d, offset: Vector3d) -> Self {
        let n = size.x * size.y * size.z;
        VectorImg {
            policy,
            size,
            resolution,
            offset,
            x: vec![0.0; n],
            y: vec![0.0; n],
            z: vec![0.0; n],
            aabb: AxisAlignedBoundingBox::default(),
            version: 0,
        }
    }

    fn index(&self, p: &VoxelCoord) -> usize {
        p.to_img_index(&self.size)
    }

    pub fn vector_at(&self, p: &VoxelCoord) -> Vector3d {
        let i = self.index(p);
        Vector3d::new(self.x[i], self.y[i], self.z[i])
    }

    pub fn set_vector_at(&mut self, p: &VoxelCoord, v: Vector3d) {
        let i = self.index(p);
        self.x[i] = v.x;
        self.y[i] = v.y;
        self.z[i] = v.z;
    }

    pub fn voxel_centre_microns(&self, p: &VoxelCoord) -> Vector3d {
        Vector3d::to_microns_from(p, &self.resolution, &self.offset)
    }

    /// §4.1.4: a vector field has no inside/outside, so `updateOwnAABB`
    /// always takes the full image extent.
    pub fn update_own_aabb(&mut self) {
        self.aabb.reset();
        self.aabb.grow_to_contain(self.offset);
        self.aabb.grow_to_contain(
            Vector3d::new(self.size.x as f64, self.size.y as f64, self.size.z as f64)
                .to_microns(&self.resolution, &self.offset),
        );
        self.version += 1;
    }
}

struct Touch {
    voxel: VoxelCoord,
    vector: Vector3d,
}

/// §4.1.3: the caller is the `VectorImg`. Sweeps the voxel-space
/// intersection with `other`'s AABB using the same near-surface criterion
/// as 4.1.2, accumulates the touched vectors per sphere, then summarises
/// them per `img.policy` into the reported pair(s).
pub fn get_distance_vectorimg_spheres(img: &VectorImg, other: &Spheres, out: &mut Vec<ProximityPair>) {
    let voxel_diag = Vector3d::new(
        1.0 / img.resolution.x,
        1.0 / img.resolution.y,
        1.0 / img.resolution.z,
    )
    .len();
    let threshold = 0.5 * voxel_diag;

    let mut touches: Vec<Vec<Touch>> = (0..other.no_of_spheres()).map(|_| Vec::new()).collect();

    for z in 0..img.size.z {
        for y in 0..img.size.y {
            for x in 0..img.size.x {
                let p = VoxelCoord::new(x, y, z);
                let v = img.voxel_centre_microns(&p);
                for j in 0..other.no_of_spheres() {
                    let c = other.centre(j);
                    let r = other.radius(j);
                    if ((v - c).len() - r).abs() < threshold {
                        touches[j].push(Touch {
                            voxel: p,
                            vector: img.vector_at(&p),
                        });
                    }
                }
            }
        }
    }

    for (j, touched) in touches.into_iter().enumerate() {
        if touched.is_empty() {
            continue;
        }
        match img.policy {
            VectorChoosingPolicy::AllVec => {
                for t in &touched {
                    push_pair(out, img, other, t.voxel, t.vector, j);
                }
            }
            VectorChoosingPolicy::MinVec => {
                let t = touched
                    .iter()
                    .min_by(|a, b| a.vector.len().partial_cmp(&b.vector.len()).unwrap())
                    .unwrap();
                push_pair(out, img, other, t.voxel, t.vector, j);
            }
            VectorChoosingPolicy::MaxVec => {
                let t = touched
                    .iter()
                    .max_by(|a, b| a.vector.len().partial_cmp(&b.vector.len()).unwrap())
                    .unwrap();
                push_pair(out, img, other, t.voxel, t.vector, j);
            }
            VectorChoosingPolicy::AvgVec => {
                let n = touched.len() as f64;
                let sum = touched.iter().fold(Vector3d::ZERO, |acc, t| acc + t.vector);
                push_pair(out, img, other, touched[0].voxel, sum * (1.0 / n), j);
            }
        }
    }
}

/// Reports one pair with `localPos − otherPos = vector`, `distance =
/// |vector|` (§4.1.3's reinterpretation of `ProximityPair`): `otherPos`
/// is the sphere-surface point nearest the touched voxel, `localPos` is
/// that point displaced by the stored vector.
fn push_pair(out: &mut Vec<ProximityPair>, img: &VectorImg, other: &Spheres, voxel: VoxelCoord, vector: Vector3d, sphere_idx: usize) {
    let c = other.centre(sphere_idx);
    let r = other.radius(sphere_idx);
    let voxel_centre = img.voxel_centre_microns(&voxel);
    let dir = (voxel_centre - c).normalized_or_zero();
    let other_pos = c + dir * r;
    let local_pos = other_pos + vector;

    out.push(ProximityPair::with_hints(
        local_pos,
        other_pos,
        vector.len(),
        voxel.to_img_index(&img.size) as i64,
        sphere_idx as i64,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_vec_reports_one_pair_per_touched_voxel() {
        // a single-voxel image: whatever touches, touches exactly once
        let mut img = VectorImg::new(
            VectorChoosingPolicy::AllVec,
            VoxelCoord::new(1, 1, 1),
            Vector3d::splat(1.0),
            Vector3d::ZERO,
        );
        img.set_vector_at(&VoxelCoord::new(0, 0, 0), Vector3d::new(1.0, 0.0, 0.0));

        let mut sphere = Spheres::new(1);
        sphere.update_centre(0, Vector3d::ZERO);
        sphere.update_radius(0, 1.0);

        let mut out = Vec::new();
        get_distance_vectorimg_spheres(&img, &sphere, &mut out);
        assert_eq!(out.len(), 1);
        assert!((out[0].distance - 1.0).abs() < 1e-9);
        assert_eq!(out[0].other_hint, 0);
    }

    #[test]
    fn avg_vec_combines_every_touched_vector() {
        // a 2-voxel image, both within the near-surface shell of the sphere
        let mut img = VectorImg::new(
            VectorChoosingPolicy::AvgVec,
            VoxelCoord::new(1, 2, 1),
            Vector3d::splat(1.0),
            Vector3d::ZERO,
        );
        img.set_vector_at(&VoxelCoord::new(0, 0, 0), Vector3d::new(2.0, 0.0, 0.0));
        img.set_vector_at(&VoxelCoord::new(0, 1, 0), Vector3d::new(0.0, 0.0, 0.0));

        let mut sphere = Spheres::new(1);
        sphere.update_centre(0, Vector3d::ZERO);
        sphere.update_radius(0, 1.2);

        let mut out = Vec::new();
        get_distance_vectorimg_spheres(&img, &sphere, &mut out);
        assert_eq!(out.len(), 1);
        assert!((out[0].distance - 1.0).abs() < 1e-9, "average of (2,0,0) and (0,0,0) has length 1");
    }

    #[test]
    fn full_extent_aabb_matches_image_bounds() {
        let mut img = VectorImg::new(
            VectorChoosingPolicy::AllVec,
            VoxelCoord::new(4, 4, 4),
            Vector3d::splat(1.0),
            Vector3d::ZERO,
        );
        img.update_own_aabb();
        assert_eq!(img.aabb.min_corner, Vector3d::ZERO);
        assert_eq!(img.aabb.max_corner, Vector3d::new(4.0, 4.0, 4.0));
    }
}
