//! Rasterisation and image I/O (§4.6, §6): mask/phantom/optics buffers,
//! cross-FO reduction, and TIFF output with the frame-numbered filename
//! conventions.

use std::io::BufWriter;
use std::path::Path;

use embryogen_concepts::geometry::spheres::Spheres;
use embryogen_concepts::vector::{Vector3d, VoxelCoord};
use embryogen_concepts::SimulationError;
use tiff::encoder::{colortype, TiffEncoder};
use tracing::warn;

/// A local per-FO or Director-merged raster buffer, generic over the
/// stored sample type (`u16` for masks/final, `f32` for phantom/optics).
#[derive(Debug, Clone)]
pub struct ImageBuffer<T> {
    pub size: VoxelCoord,
    pub resolution: Vector3d,
    pub offset: Vector3d,
    pub data: Vec<T>,
}

impl<T: Copy + Default> ImageBuffer<T> {
    pub fn new(size: VoxelCoord, resolution: Vector3d, offset: Vector3d) -> Self {
        ImageBuffer {
            size,
            resolution,
            offset,
            data: vec![T::default(); size.x * size.y * size.z],
        }
    }

    fn index(&self, p: &VoxelCoord) -> usize {
        p.to_img_index(&self.size)
    }

    fn in_bounds(&self, p: &VoxelCoord) -> bool {
        p.x < self.size.x && p.y < self.size.y && p.z < self.size.z
    }
}

pub type MaskBuffer = ImageBuffer<u16>;
pub type FloatBuffer = ImageBuffer<f32>;

/// §4.6 mask rendering: for every voxel inside the AABB ∩ image, if the
/// voxel centre falls inside any sphere of `spheres`, write
/// `draw_id + sphere_index`, first-writer-wins (only if the voxel was
/// previously zero).
pub fn render_mask_for_spheres(image: &mut MaskBuffer, spheres: &Spheres, draw_id: u16) {
    let aabb = &spheres.aabb;
    let lo = aabb.min_corner.to_pixels_rounded(&image.resolution, &image.offset);
    let hi = aabb.max_corner.to_pixels_rounded(&image.resolution, &image.offset);

    for z in lo.z..=hi.z.min(image.size.z.saturating_sub(1)) {
        for y in lo.y..=hi.y.min(image.size.y.saturating_sub(1)) {
            for x in lo.x..=hi.x.min(image.size.x.saturating_sub(1)) {
                let p = VoxelCoord::new(x, y, z);
                if !image.in_bounds(&p) {
                    continue;
                }
                let idx = image.index(&p);
                if image.data[idx] != 0 {
                    continue;
                }
                let centre = Vector3d::to_microns_from(&p, &image.resolution, &image.offset);
                if let Some(sphere_idx) = spheres.collide_with_point(centre, None) {
                    image.data[idx] = draw_id + sphere_idx as u16;
                }
            }
        }
    }
}

/// §5: "cross-FO overlaps ... are handled by a pixelwise sum on
/// reduction (phantoms, optics)".
pub fn reduce_sum(buffers: &[FloatBuffer]) -> FloatBuffer {
    assert!(!buffers.is_empty(), "cannot reduce zero buffers");
    let mut out = FloatBuffer::new(buffers[0].size, buffers[0].resolution, buffers[0].offset);
    for buf in buffers {
        for (o, v) in out.data.iter_mut().zip(buf.data.iter()) {
            *o += v;
        }
    }
    out
}

/// §5: "or by pixelwise maximum (masks, treating zero as 'empty')".
pub fn reduce_max(buffers: &[MaskBuffer]) -> MaskBuffer {
    assert!(!buffers.is_empty(), "cannot reduce zero buffers");
    let mut out = MaskBuffer::new(buffers[0].size, buffers[0].resolution, buffers[0].offset);
    for buf in buffers {
        for (o, v) in out.data.iter_mut().zip(buf.data.iter()) {
            *o = (*o).max(*v);
        }
    }
    out
}

/// §6: `mask%03d.tif` / `phantom%03d.tif` / `optics%03d.tif` / `final%03d.tif`.
pub fn frame_filename(kind: &str, frame: u32) -> String {
    format!("{kind}{frame:03}.tif")
}

/// Best-effort TIFF write (§7: "I/O failure on image save: logged;
/// simulation continues").
pub fn write_mask_tiff(path: &Path, image: &MaskBuffer) {
    if let Err(e) = write_mask_tiff_inner(path, image) {
        warn!(path = %path.display(), error = %e, "failed to write mask TIFF, continuing");
    }
}

fn write_mask_tiff_inner(path: &Path, image: &MaskBuffer) -> Result<(), SimulationError> {
    let file = std::fs::File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))
        .map_err(|e| SimulationError::Io(e.to_string()))?;
    for z in 0..image.size.z {
        let plane = &image.data[z * image.size.x * image.size.y..(z + 1) * image.size.x * image.size.y];
        encoder
            .write_image::<colortype::Gray16>(image.size.x as u32, image.size.y as u32, plane)
            .map_err(|e| SimulationError::Io(e.to_string()))?;
    }
    Ok(())
}

pub fn write_float_tiff(path: &Path, image: &FloatBuffer) {
    if let Err(e) = write_float_tiff_inner(path, image) {
        warn!(path = %path.display(), error = %e, "failed to write float TIFF, continuing");
    }
}

fn write_float_tiff_inner(path: &Path, image: &FloatBuffer) -> Result<(), SimulationError> {
    let file = std::fs::File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))
        .map_err(|e| SimulationError::Io(e.to_string()))?;
    for z in 0..image.size.z {
        let plane = &image.data[z * image.size.x * image.size.y..(z + 1) * image.size.x * image.size.y];
        encoder
            .write_image::<colortype::Gray32Float>(image.size.x as u32, image.size.y as u32, plane)
            .map_err(|e| SimulationError::Io(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_sphere(centre: Vector3d, radius: f64) -> Spheres {
        let mut s = Spheres::new(1);
        s.update_centre(0, centre);
        s.update_radius(0, radius);
        s.update_own_aabb();
        s
    }

    #[test]
    fn mask_render_writes_sphere_interior_only() {
        let mut img = MaskBuffer::new(VoxelCoord::new(20, 20, 20), Vector3d::splat(1.0), Vector3d::ZERO);
        let spheres = single_sphere(Vector3d::new(10.0, 10.0, 10.0), 3.0);
        render_mask_for_spheres(&mut img, &spheres, 1);
        let centre_idx = VoxelCoord::new(10, 10, 10).to_img_index(&img.size);
        assert_eq!(img.data[centre_idx], 1);
        let outside_idx = VoxelCoord::new(0, 0, 0).to_img_index(&img.size);
        assert_eq!(img.data[outside_idx], 0);
    }

    #[test]
    fn reduce_sum_adds_disjoint_phantoms() {
        let size = VoxelCoord::new(4, 4, 4);
        let mut a = FloatBuffer::new(size, Vector3d::splat(1.0), Vector3d::ZERO);
        let mut b = FloatBuffer::new(size, Vector3d::splat(1.0), Vector3d::ZERO);
        a.data[0] = 3.0;
        b.data[1] = 5.0;
        let merged = reduce_sum(&[a, b]);
        assert_eq!(merged.data[0], 3.0);
        assert_eq!(merged.data[1], 5.0);
    }

    #[test]
    fn reduce_max_unions_disjoint_masks() {
        let size = VoxelCoord::new(4, 4, 4);
        let mut a = MaskBuffer::new(size, Vector3d::splat(1.0), Vector3d::ZERO);
        let mut b = MaskBuffer::new(size, Vector3d::splat(1.0), Vector3d::ZERO);
        a.data[0] = 7;
        b.data[1] = 9;
        let merged = reduce_max(&[a, b]);
        assert_eq!(merged.data[0], 7);
        assert_eq!(merged.data[1], 9);
    }

    #[test]
    fn frame_filenames_are_zero_padded_to_three_digits() {
        assert_eq!(frame_filename("mask", 3), "mask003.tif");
        assert_eq!(frame_filename("phantom", 42), "phantom042.tif");
    }
}
