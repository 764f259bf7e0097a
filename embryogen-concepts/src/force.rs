//! Named, positioned forces, and the magnitude constants used by the
//! nucleus integrator's force law.

use crate::vector::Vector3d;
use serde::{Deserialize, Serialize};

/// The family a force belongs to, used only for reporting/debugging —
/// never branched on by the integrator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceKind {
    /// sphere-to-sphere overlap repulsion within the same agent
    SphereToSphere,
    /// drive towards the agent's target/rest shape
    Drive,
    /// velocity-damping friction term
    Friction,
    /// repulsion from a neighbouring agent
    Repulsive,
    /// whole-body cohesion pulling spheres back towards the agent centroid
    Body,
    /// tangential sliding term between overlapping neighbours
    Slide,
    /// a weak hint force nudging agents apart before they truly overlap
    Hinter,
    /// domain-containment force, already passed through the boundary clip
    Boundary,
    Unknown,
}

impl Default for ForceKind {
    fn default() -> Self {
        ForceKind::Unknown
    }
}

/// A vector that additionally carries where it acts (`base`), an index
/// hint into the owning agent's sphere list, and which force law produced
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceVector3d {
    pub vector: Vector3d,
    pub base: Vector3d,
    pub hint: i64,
    pub kind: ForceKind,
}

impl ForceVector3d {
    pub fn new(vector: Vector3d, base: Vector3d, kind: ForceKind) -> Self {
        ForceVector3d {
            vector,
            base,
            hint: 0,
            kind,
        }
    }

    pub fn with_hint(vector: Vector3d, base: Vector3d, hint: i64, kind: ForceKind) -> Self {
        ForceVector3d {
            vector,
            base,
            hint,
            kind,
        }
    }
}

/// Magnitude scaling constants for the nucleus force law, adopted
/// verbatim from the original integrator's tuning.
pub mod magnitudes {
    /// scales the body-cohesion force pulling a sphere back to its rest offset
    pub const BODY_SCALE: f64 = 0.4;
    /// scales repulsion as a function of how deep two spheres overlap
    pub const OVERLAP_SCALE: f64 = 0.2;
    /// overlap fraction below which overlap repulsion is not triggered
    pub const OVERLAP_LEVEL: f64 = 0.1;
    /// exponent shaping how steeply overlap repulsion grows with depth
    pub const OVERLAP_DEPTH: f64 = 0.5;
    /// scales repulsion from neighbouring agents
    pub const REP_SCALE: f64 = 0.6;
    /// scales the tangential sliding term between overlapping neighbours
    pub const SLIDE_SCALE: f64 = 1.0;
    /// scales the weak pre-overlap hint force
    pub const HINTER_SCALE: f64 = 0.25;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_force_is_unknown_and_zero() {
        let f = ForceVector3d::default();
        assert_eq!(f.kind, ForceKind::Unknown);
        assert_eq!(f.vector, Vector3d::ZERO);
    }
}
