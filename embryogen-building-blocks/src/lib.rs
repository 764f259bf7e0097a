//! Concrete agent types built on top of `embryogen-concepts`: the nucleus
//! mechanics/interaction implementation, the eight-phase cell cycle
//! bookkeeping, the legacy 2-D boundary-point agent, and the texture/dot
//! engine used by the rasteriser.

pub mod boundary_point;
pub mod cell_cycle;
pub mod nucleus;
pub mod texture;

pub use boundary_point::{BoundaryPointAgent, BoundaryPointCycleHooks};
pub use cell_cycle::CellCycle;
pub use nucleus::{Nucleus, NucleusCycleHooks, NucleusVariant};
pub use texture::{advect_dots, Dot, SphereMotion, TextureDotCloud};
