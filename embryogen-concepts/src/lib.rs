//! Shared vocabulary for embryogen: vectors, bounding boxes, the geometry
//! kernel, forces, and the concept traits (`Agent`, `Mechanics`,
//! `Interaction`, `Cycle`) every concrete agent type implements.

pub mod aabb;
pub mod agent;
pub mod cycle;
pub mod errors;
pub mod force;
pub mod geometry;
pub mod interaction;
pub mod mechanics;
pub mod vector;

pub use aabb::{AxisAlignedBoundingBox, NamedAxisAlignedBoundingBox, ProximityPair};
pub use agent::{Agent, AgentId, AgentIdentity};
pub use cycle::{Cycle, CyclePhase};
pub use errors::SimulationError;
pub use force::{ForceKind, ForceVector3d};
pub use geometry::Geometry;
pub use interaction::Interaction;
pub use mechanics::Mechanics;
pub use vector::{Vector3d, VoxelCoord};
