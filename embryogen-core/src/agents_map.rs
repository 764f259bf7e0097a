//! A uniform-grid spatial index over agent AABBs, grounded in
//! `util/AgentsMap.hpp`: cells are keyed by a flattened 3-D index over a
//! `(minCorner, maxCorner, cellSize)` grid, each holding the ids of the
//! agents whose AABB touches it.

use std::collections::HashMap;

use embryogen_concepts::aabb::{AxisAlignedBoundingBox, NamedAxisAlignedBoundingBox};
use embryogen_concepts::agent::AgentId;
use embryogen_concepts::vector::{Vector3d, VoxelCoord};

/// The default cell occupancy the original tunes `cellSize` towards.
pub const OPTIMAL_CELL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Default)]
struct CellContainer {
    agents: Vec<AgentId>,
}

/// A uniform grid over `[min_corner, max_corner)` with cubic cells of
/// edge `cell_size`, indexing agents by the cells their AABB overlaps.
#[derive(Debug, Clone)]
pub struct AgentsMap {
    min_corner: Vector3d,
    max_corner: Vector3d,
    cell_size: f64,
    grid_dims: VoxelCoord,
    cells: Vec<CellContainer>,
    entries: HashMap<AgentId, NamedAxisAlignedBoundingBox>,
}

impl AgentsMap {
    pub fn new(min_corner: Vector3d, max_corner: Vector3d, cell_size: f64) -> Self {
        let span = max_corner - min_corner;
        let grid_dims = VoxelCoord::new(
            ((span.x / cell_size).ceil() as usize).max(1),
            ((span.y / cell_size).ceil() as usize).max(1),
            ((span.z / cell_size).ceil() as usize).max(1),
        );
        let n_cells = grid_dims.x * grid_dims.y * grid_dims.z;
        AgentsMap {
            min_corner,
            max_corner,
            cell_size,
            grid_dims,
            cells: vec![CellContainer::default(); n_cells],
            entries: HashMap::new(),
        }
    }

    /// Picks a cell size so that, given `expected_agent_count` agents
    /// uniformly spread over the domain, each cell holds on average
    /// `OPTIMAL_CELL_CAPACITY` agents.
    pub fn with_optimal_cell_size(min_corner: Vector3d, max_corner: Vector3d, expected_agent_count: usize) -> Self {
        let span = max_corner - min_corner;
        let volume = (span.x * span.y * span.z).max(1e-9);
        let target_cells = (expected_agent_count as f64 / OPTIMAL_CELL_CAPACITY as f64).max(1.0);
        let cell_size = (volume / target_cells).cbrt().max(1e-6);
        AgentsMap::new(min_corner, max_corner, cell_size)
    }

    fn cell_coord_of(&self, p: Vector3d) -> VoxelCoord {
        let clamped = p.elem_max(&self.min_corner).elem_min(&self.max_corner);
        let rel = clamped - self.min_corner;
        VoxelCoord::new(
            ((rel.x / self.cell_size) as usize).min(self.grid_dims.x - 1),
            ((rel.y / self.cell_size) as usize).min(self.grid_dims.y - 1),
            ((rel.z / self.cell_size) as usize).min(self.grid_dims.z - 1),
        )
    }

    fn cell_range_of_box(&self, aabb: &AxisAlignedBoundingBox) -> (VoxelCoord, VoxelCoord) {
        (self.cell_coord_of(aabb.min_corner), self.cell_coord_of(aabb.max_corner))
    }

    fn flatten(&self, c: VoxelCoord) -> usize {
        c.to_img_index(&self.grid_dims)
    }

    /// Inserts or replaces `agent`'s entry, registering it into every
    /// cell its AABB overlaps. A previous entry for the same id is
    /// removed first.
    pub fn upsert(&mut self, named: NamedAxisAlignedBoundingBox) {
        self.remove(named.id);

        let (lo, hi) = self.cell_range_of_box(&named.aabb);
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let idx = self.flatten(VoxelCoord::new(x, y, z));
                    self.cells[idx].agents.push(named.id);
                }
            }
        }
        self.entries.insert(named.id, named);
    }

    pub fn remove(&mut self, id: AgentId) {
        if let Some(old) = self.entries.remove(&id) {
            let (lo, hi) = self.cell_range_of_box(&old.aabb);
            for z in lo.z..=hi.z {
                for y in lo.y..=hi.y {
                    for x in lo.x..=hi.x {
                        let idx = self.flatten(VoxelCoord::new(x, y, z));
                        self.cells[idx].agents.retain(|&a| a != id);
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&NamedAxisAlignedBoundingBox> {
        self.entries.get(&id)
    }

    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.agents.clear();
        }
        self.entries.clear();
    }

    /// All distinct agent ids whose AABB cell contains `point`.
    pub fn query_point(&self, point: Vector3d) -> Vec<AgentId> {
        let c = self.cell_coord_of(point);
        let idx = self.flatten(c);
        let mut out = self.cells[idx].agents.clone();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// All distinct agent ids whose AABB overlaps the box
    /// `[centre - radius, centre + radius]`, excluding `exclude_id` if
    /// given.
    pub fn query_sphere_range(&self, centre: Vector3d, radius: f64, exclude_id: Option<AgentId>) -> Vec<AgentId> {
        let query_box = AxisAlignedBoundingBox::new(
            centre - Vector3d::splat(radius),
            centre + Vector3d::splat(radius),
        );
        let (lo, hi) = self.cell_range_of_box(&query_box);

        let mut out = Vec::new();
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let idx = self.flatten(VoxelCoord::new(x, y, z));
                    for &id in &self.cells[idx].agents {
                        if Some(id) == exclude_id {
                            continue;
                        }
                        if let Some(named) = self.entries.get(&id) {
                            if named.aabb.intersects(&query_box) {
                                out.push(id);
                            }
                        }
                    }
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embryogen_concepts::aabb::AxisAlignedBoundingBox;

    fn named(id: AgentId, centre: Vector3d, half: f64) -> NamedAxisAlignedBoundingBox {
        NamedAxisAlignedBoundingBox::new(
            AxisAlignedBoundingBox::new(centre - Vector3d::splat(half), centre + Vector3d::splat(half)),
            id,
            0,
        )
    }

    #[test]
    fn query_point_finds_overlapping_agent() {
        let mut map = AgentsMap::new(Vector3d::ZERO, Vector3d::splat(100.0), 10.0);
        map.upsert(named(1, Vector3d::new(50.0, 50.0, 50.0), 3.0));
        let hits = map.query_point(Vector3d::new(51.0, 50.0, 50.0));
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn removed_agent_is_no_longer_found() {
        let mut map = AgentsMap::new(Vector3d::ZERO, Vector3d::splat(100.0), 10.0);
        map.upsert(named(1, Vector3d::new(50.0, 50.0, 50.0), 3.0));
        map.remove(1);
        assert!(map.query_point(Vector3d::new(50.0, 50.0, 50.0)).is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn sphere_range_excludes_requested_id() {
        let mut map = AgentsMap::new(Vector3d::ZERO, Vector3d::splat(100.0), 10.0);
        map.upsert(named(1, Vector3d::new(50.0, 50.0, 50.0), 3.0));
        map.upsert(named(2, Vector3d::new(52.0, 50.0, 50.0), 3.0));
        let hits = map.query_sphere_range(Vector3d::new(50.0, 50.0, 50.0), 5.0, Some(1));
        assert_eq!(hits, vec![2]);
    }
}
