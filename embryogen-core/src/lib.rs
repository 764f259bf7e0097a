//! The distributed-scheduler runtime for embryogen: spatial indexing,
//! the strings dictionary, the lineage recorder, the Director/FrontOfficer
//! scheduler, and the rasterisation/image-reduction pipeline.

pub mod agents_map;
pub mod lineage;
pub mod raster;
pub mod scheduler;
pub mod strings;

pub use agents_map::AgentsMap;
pub use lineage::{LineageRecorder, TrackRecord};
pub use raster::{FloatBuffer, MaskBuffer};
pub use scheduler::{owner_of, run_rounds, DirectorState, FrontOfficer, Message};
pub use strings::StringsDictionary;
