//! The `Interaction` concept: how an agent turns a neighbour's geometry
//! into forces acting on its own spheres (§4.2, external-force stage).

use crate::aabb::ProximityPair;
use crate::errors::CalcError;
use crate::force::ForceVector3d;
use crate::geometry::Geometry;

/// Implemented by agents that participate in the external-force stage of
/// a round. Mirrors the teacher's `Interaction<Pos, Vel, For, Inf>` trait,
/// specialised to embryogen's `Geometry`/`ProximityPair` vocabulary.
pub trait Interaction {
    /// The published (exposed) geometry other agents query against.
    fn exposed_geometry(&self) -> &Geometry;

    /// How far away (in microns) a foreign AABB may be before this agent
    /// stops considering it a neighbour worth fetching geometry for.
    fn ignore_distance(&self) -> f64;

    /// Turns one `ProximityPair` (with `distance < 0`, i.e. penetrating)
    /// returned by `self.exposed_geometry().get_distance(other, ..)` into
    /// the three external forces described in §4.2 step 3: body, sliding,
    /// and (for non-penetrating-but-near pairs) repulsive.
    fn forces_from_proximity_pair(
        &self,
        pair: &ProximityPair,
        own_velocity_at_hint: crate::vector::Vector3d,
        other_velocity_at_hint: crate::vector::Vector3d,
    ) -> Result<Vec<ForceVector3d>, CalcError>;
}
