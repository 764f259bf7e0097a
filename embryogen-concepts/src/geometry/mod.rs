//! The geometry kernel: a closed, tagged-variant family of shape
//! representations with a symmetric `get_distance` double-dispatch table.
//!
//! The original dispatches on C++ virtual calls; here every variant is a
//! plain payload behind one `Geometry` enum, and the pairwise algorithms
//! live in a small dispatch table keyed by `(ShapeKind, ShapeKind)`. Pairs
//! with no direct implementation fall back to calling the reverse pair
//! and swapping each resulting `ProximityPair`.

pub mod scalar_img;
pub mod spheres;
pub mod vector_img;

use crate::aabb::{AxisAlignedBoundingBox, ProximityPair};
pub use scalar_img::{ScalarImg, ScalarImgSemantics};
pub use spheres::Spheres;
pub use vector_img::{VectorChoosingPolicy, VectorImg};

/// Which concrete representation a [`Geometry`] currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Spheres,
    ScalarImg,
    VectorImg,
    Mesh,
}

/// A polymorphic agent shape. Every variant owns an [`AxisAlignedBoundingBox`]
/// and a `version` counter bumped by [`Geometry::update_own_aabb`].
#[derive(Debug, Clone)]
pub enum Geometry {
    Spheres(Spheres),
    ScalarImg(ScalarImg),
    VectorImg(VectorImg),
    /// triangle mesh: present in the dispatch table for forward
    /// extensibility per §3, never constructed by the scenarios in this
    /// crate (spec.md's one named exception — "not implemented in full
    /// in the sources but required in the dispatch table")
    Mesh(MeshPlaceholder),
}

/// Triangle mesh placeholder (not implemented, per the component design).
#[derive(Debug, Clone, Default)]
pub struct MeshPlaceholder {
    pub aabb: AxisAlignedBoundingBox,
    pub version: u64,
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Spheres(_) => ShapeKind::Spheres,
            Geometry::ScalarImg(_) => ShapeKind::ScalarImg,
            Geometry::VectorImg(_) => ShapeKind::VectorImg,
            Geometry::Mesh(_) => ShapeKind::Mesh,
        }
    }

    pub fn aabb(&self) -> &AxisAlignedBoundingBox {
        match self {
            Geometry::Spheres(s) => &s.aabb,
            Geometry::ScalarImg(s) => &s.aabb,
            Geometry::VectorImg(v) => &v.aabb,
            Geometry::Mesh(m) => &m.aabb,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Geometry::Spheres(s) => s.version,
            Geometry::ScalarImg(s) => s.version,
            Geometry::VectorImg(v) => v.version,
            Geometry::Mesh(m) => m.version,
        }
    }

    /// Recomputes this geometry's own AABB from its primary data and bumps
    /// `version`.
    pub fn update_own_aabb(&mut self) {
        match self {
            Geometry::Spheres(s) => s.update_own_aabb(),
            Geometry::ScalarImg(s) => s.update_own_aabb(),
            Geometry::VectorImg(v) => v.update_own_aabb(),
            Geometry::Mesh(m) => m.version += 1,
        }
    }

    /// Appends to `out` the proximity pairs between `self` (playing
    /// `local`) and `other` (playing `other`). Falls back to the
    /// symmetric pair when the ordered dispatch entry does not exist,
    /// logging a warning when neither direction is implemented.
    pub fn get_distance(&self, other: &Geometry, out: &mut Vec<ProximityPair>) {
        match (self, other) {
            (Geometry::Spheres(a), Geometry::Spheres(b)) => {
                spheres::get_distance_spheres_spheres(a, b, out)
            }
            (Geometry::ScalarImg(a), Geometry::Spheres(b)) => {
                scalar_img::get_distance_scalarimg_spheres(a, b, out)
            }
            (Geometry::Spheres(_), Geometry::ScalarImg(_)) => {
                self.get_symmetric_distance(other, out)
            }
            (Geometry::VectorImg(a), Geometry::Spheres(b)) => {
                vector_img::get_distance_vectorimg_spheres(a, b, out)
            }
            (Geometry::Spheres(_), Geometry::VectorImg(_)) => {
                self.get_symmetric_distance(other, out)
            }
            _ => {
                tracing::warn!(
                    local = ?self.kind(),
                    other = ?other.kind(),
                    "unsupported geometry pair in get_distance, ignoring"
                );
            }
        }
    }

    /// Helper for pairs with no direct implementation: calls
    /// `other.get_distance(self, ..)` into a scratch list and reverses
    /// each resulting pair so `local`/`other` stay relative to `self`.
    fn get_symmetric_distance(&self, other: &Geometry, out: &mut Vec<ProximityPair>) {
        let mut reversed = Vec::new();
        other.get_distance(self, &mut reversed);
        out.extend(reversed.into_iter().map(|p| p.swapped()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector3d;

    #[test]
    fn unsupported_pair_is_a_noop_not_a_panic() {
        let mesh = Geometry::Mesh(MeshPlaceholder::default());
        let mut spheres = Spheres::new(1);
        spheres.update_own_aabb();
        let g_spheres = Geometry::Spheres(spheres);
        let mut out = Vec::new();
        mesh.get_distance(&g_spheres, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn vectorimg_spheres_dispatch_is_symmetric_via_swap() {
        let mut spheres = Spheres::new(1);
        spheres.update_centre(0, Vector3d::new(0.5, 0.5, 0.5));
        spheres.update_radius(0, 1.0);
        spheres.update_own_aabb();

        let mut img = VectorImg::new(
            VectorChoosingPolicy::AllVec,
            crate::vector::VoxelCoord::new(1, 1, 1),
            Vector3d::splat(1.0),
            Vector3d::ZERO,
        );
        img.set_vector_at(&crate::vector::VoxelCoord::new(0, 0, 0), Vector3d::new(1.0, 0.0, 0.0));

        let g_spheres = Geometry::Spheres(spheres);
        let g_img = Geometry::VectorImg(img);

        let mut forward = Vec::new();
        g_img.get_distance(&g_spheres, &mut forward);
        let mut backward = Vec::new();
        g_spheres.get_distance(&g_img, &mut backward);

        assert_eq!(forward.len(), backward.len());
        assert_eq!(forward.len(), 1);
        for (f, b) in forward.iter().zip(backward.iter()) {
            assert_eq!(f.local_pos, b.other_pos);
            assert_eq!(f.other_pos, b.local_pos);
        }
    }

    #[test]
    fn scalar_img_spheres_dispatch_is_symmetric_via_swap() {
        let mut spheres = Spheres::new(1);
        spheres.update_centre(0, Vector3d::new(5.0, 5.0, 5.0));
        spheres.update_radius(0, 2.0);
        spheres.update_own_aabb();

        let img = scalar_img::ScalarImg::new_grad_in_zero_out(
            VoxelGridForTest::cube(10, Vector3d::new(1.0, 1.0, 1.0), Vector3d::ZERO),
        );

        let g_spheres = Geometry::Spheres(spheres);
        let g_img = Geometry::ScalarImg(img);

        let mut forward = Vec::new();
        g_img.get_distance(&g_spheres, &mut forward);
        let mut backward = Vec::new();
        g_spheres.get_distance(&g_img, &mut backward);

        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(backward.iter()) {
            assert_eq!(f.local_pos, b.other_pos);
            assert_eq!(f.other_pos, b.local_pos);
        }
    }

    // constructs a trivial all-background (distance = +1 everywhere) scalar
    // image grid purely to exercise the dispatch path above
    struct VoxelGridForTest;
    impl VoxelGridForTest {
        fn cube(n: usize, res: Vector3d, off: Vector3d) -> scalar_img::ScalarImgGrid {
            scalar_img::ScalarImgGrid {
                size: crate::vector::VoxelCoord::new(n, n, n),
                resolution: res,
                offset: off,
                values: vec![1.0; n * n * n],
            }
        }
    }
}
