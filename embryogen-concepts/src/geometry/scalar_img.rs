//! `ScalarImg`: a 3-D signed-distance image geometry.

use crate::aabb::{AxisAlignedBoundingBox, ProximityPair};
use crate::geometry::spheres::Spheres;
use crate::vector::{Vector3d, VoxelCoord};
use serde::{Deserialize, Serialize};

/// Which sign convention a [`ScalarImg`]'s stored values follow. Immutable
/// once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarImgSemantics {
    /// negative inside the shape, zero outside
    GradInZeroOut,
    /// zero inside the shape, positive outside
    ZeroInGradOut,
    /// signed distance to the surface everywhere
    GradInGradOut,
}

/// The raw voxel buffer backing a [`ScalarImg`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarImgGrid {
    pub size: VoxelCoord,
    /// voxels per micron, per axis
    pub resolution: Vector3d,
    /// micron offset of the voxel-space origin
    pub offset: Vector3d,
    /// row-major (x fastest) values, one per voxel
    pub values: Vec<f64>,
}

impl ScalarImgGrid {
    pub fn index(&self, p: &VoxelCoord) -> usize {
        p.to_img_index(&self.size)
    }

    pub fn get(&self, p: &VoxelCoord) -> f64 {
        self.values[self.index(p)]
    }

    pub fn in_bounds(&self, p: &VoxelCoord) -> bool {
        p.x < self.size.x && p.y < self.size.y && p.z < self.size.z
    }

    pub fn voxel_centre_microns(&self, p: &VoxelCoord) -> Vector3d {
        Vector3d::to_microns_from(p, &self.resolution, &self.offset)
    }

    /// Central finite-difference gradient at `p`, one-sided at borders,
    /// normalized to a unit vector (zero if the image is locally flat).
    pub fn gradient_unit(&self, p: &VoxelCoord) -> Vector3d {
        let axis_grad = |lo: Option<f64>, hi: Option<f64>, res: f64| -> f64 {
            match (lo, hi) {
                (Some(l), Some(h)) => (h - l) * 0.5 * res,
                (Some(l), None) => (self.get(p) - l) * res,
                (None, Some(h)) => (h - self.get(p)) * res,
                (None, None) => 0.0,
            }
        };

        let at = |dx: i64, dy: i64, dz: i64| -> Option<f64> {
            let x = p.x as i64 + dx;
            let y = p.y as i64 + dy;
            let z = p.z as i64 + dz;
            if x < 0 || y < 0 || z < 0 {
                return None;
            }
            let q = VoxelCoord::new(x as usize, y as usize, z as usize);
            self.in_bounds(&q).then(|| self.get(&q))
        };

        let gx = axis_grad(at(-1, 0, 0), at(1, 0, 0), self.resolution.x);
        let gy = axis_grad(at(0, -1, 0), at(0, 1, 0), self.resolution.y);
        let gz = axis_grad(at(0, 0, -1), at(0, 0, 1), self.resolution.z);
        Vector3d::new(gx, gy, gz).normalized_or_zero()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarImg {
    pub semantics: ScalarImgSemantics,
    pub grid: ScalarImgGrid,
    pub aabb: AxisAlignedBoundingBox,
    pub version: u64,
}

impl ScalarImg {
    pub fn new(semantics: ScalarImgSemantics, grid: ScalarImgGrid) -> Self {
        ScalarImg {
            semantics,
            grid,
            aabb: AxisAlignedBoundingBox::default(),
            version: 0,
        }
    }

    pub fn new_grad_in_zero_out(grid: ScalarImgGrid) -> Self {
        Self::new(ScalarImgSemantics::GradInZeroOut, grid)
    }

    /// `GradInZeroOut`: the tightest AABB around strictly-negative voxels.
    /// Otherwise: the full image extent (there is no sharp inside/outside).
    pub fn update_own_aabb(&mut self) {
        self.aabb.reset();
        match self.semantics {
            ScalarImgSemantics::GradInZeroOut => {
                for z in 0..self.grid.size.z {
                    for y in 0..self.grid.size.y {
                        for x in 0..self.grid.size.x {
                            let p = VoxelCoord::new(x, y, z);
                            if self.grid.get(&p) < 0.0 {
                                self.aabb.grow_to_contain(self.grid.voxel_centre_microns(&p));
                            }
                        }
                    }
                }
            }
            _ => {
                let size_px = self.grid.size;
                self.aabb.grow_to_contain(self.grid.offset);
                self.aabb.grow_to_contain(
                    Vector3d::new(size_px.x as f64, size_px.y as f64, size_px.z as f64)
                        .to_microns(&self.grid.resolution, &self.grid.offset),
                );
            }
        }
        self.version += 1;
    }
}

/// Per §4.1.2: the caller is the `ScalarImg`. Sweeps the voxel-space
/// intersection with `other`'s AABB, keeps for every other-sphere the
/// single nearest-surface candidate voxel, then reconstructs one
/// `ProximityPair` per sphere from the stored distance and local gradient.
pub fn get_distance_scalarimg_spheres(img: &ScalarImg, other: &Spheres, out: &mut Vec<ProximityPair>) {
    let voxel_diag = Vector3d::new(
        1.0 / img.grid.resolution.x,
        1.0 / img.grid.resolution.y,
        1.0 / img.grid.resolution.z,
    )
    .len();
    let threshold = 0.5 * voxel_diag;

    // best[j] = (voxel, |value|) minimizing the stored distance magnitude
    let mut best: Vec<Option<(VoxelCoord, f64)>> = vec![None; other.no_of_spheres()];

    for z in 0..img.grid.size.z {
        for y in 0..img.grid.size.y {
            for x in 0..img.grid.size.x {
                let p = VoxelCoord::new(x, y, z);
                let v = img.grid.voxel_centre_microns(&p);
                for j in 0..other.no_of_spheres() {
                    let c = other.centre(j);
                    let r = other.radius(j);
                    if ((v - c).len() - r).abs() < threshold {
                        let value = img.grid.get(&p);
                        if best[j].map_or(true, |(_, bv)| value.abs() < bv) {
                            best[j] = Some((p, value.abs()));
                        }
                    }
                }
            }
        }
    }

    for (j, candidate) in best.into_iter().enumerate() {
        let Some((voxel, _)) = candidate else { continue };
        let distance = img.grid.get(&voxel);
        let grad = img.grid.gradient_unit(&voxel);
        let voxel_centre = img.grid.voxel_centre_microns(&voxel);
        let local_pos = voxel_centre + grad * distance;

        let c = other.centre(j);
        let r = other.radius(j);
        let dir = (voxel_centre - c).normalized_or_zero();
        let other_pos = c + dir * r;

        out.push(ProximityPair::with_hints(
            local_pos,
            other_pos,
            distance,
            voxel.to_img_index(&img.grid.size) as i64,
            j as i64,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(n: usize, value: f64) -> ScalarImgGrid {
        ScalarImgGrid {
            size: VoxelCoord::new(n, n, n),
            resolution: Vector3d::splat(1.0),
            offset: Vector3d::ZERO,
            values: vec![value; n * n * n],
        }
    }

    #[test]
    fn all_background_image_has_empty_negative_aabb() {
        let mut img = ScalarImg::new_grad_in_zero_out(flat_grid(5, 1.0));
        img.update_own_aabb();
        assert!(img.aabb.min_corner.x > img.aabb.max_corner.x);
    }

    #[test]
    fn grad_in_grad_out_uses_full_extent() {
        let mut img = ScalarImg::new(ScalarImgSemantics::GradInGradOut, flat_grid(5, 1.0));
        img.update_own_aabb();
        assert_eq!(img.aabb.min_corner, Vector3d::ZERO);
        assert_eq!(img.aabb.max_corner, Vector3d::new(5.0, 5.0, 5.0));
    }
}
