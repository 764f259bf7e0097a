//! The texture/dot engine (§4.6): a Perlin-seeded cloud of texture dots
//! that gets rasterised into a phantom image with photobleaching, and
//! advected frame-to-frame as the underlying spheres move and deform.

use embryogen_concepts::geometry::spheres::Spheres;
use embryogen_concepts::vector::{Vector3d, VoxelCoord};
use noise::{NoiseFn, Perlin};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dot {
    pub position: Vector3d,
    pub excitation_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureDotCloud {
    pub dots: Vec<Dot>,
    /// base photon quantum contributed by one dot at excitation count 0
    pub quantum: f64,
}

impl TextureDotCloud {
    /// §4.6 texture initialisation: samples 3-D Perlin noise over a grid
    /// of `size` voxels at `resolution` voxels/µm from `offset`, shifts
    /// the image mean to `target_mean`, then for each voxel places
    /// `floor(intensity / quantization)` dots uniformly at random within
    /// the voxel with Gaussian jitter `sigma = (1/6)/res` so ~99% of the
    /// jitter stays within the voxel.
    pub fn initialize(
        resolution: Vector3d,
        offset: Vector3d,
        size: VoxelCoord,
        target_mean: f64,
        quantization: f64,
        noise_scale: f64,
        seed: u32,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let perlin = Perlin::new(seed);
        let mut raw = vec![0.0_f64; size.x * size.y * size.z];
        let mut sum = 0.0;
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let idx = VoxelCoord::new(x, y, z).to_img_index(&size);
                    let v = perlin.get([
                        x as f64 * noise_scale,
                        y as f64 * noise_scale,
                        z as f64 * noise_scale,
                    ]);
                    raw[idx] = v;
                    sum += v;
                }
            }
        }
        let mean = sum / raw.len().max(1) as f64;
        let shift = target_mean - mean;

        let mut dots = Vec::new();
        let jitter_sigma = Vector3d::new(
            (1.0 / 6.0) / resolution.x,
            (1.0 / 6.0) / resolution.y,
            (1.0 / 6.0) / resolution.z,
        );
        let dist_x = Normal::new(0.0, jitter_sigma.x.max(1e-9)).unwrap();
        let dist_y = Normal::new(0.0, jitter_sigma.y.max(1e-9)).unwrap();
        let dist_z = Normal::new(0.0, jitter_sigma.z.max(1e-9)).unwrap();

        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let p = VoxelCoord::new(x, y, z);
                    let intensity = (raw[p.to_img_index(&size)] + shift).max(0.0);
                    let count = (intensity / quantization).floor() as usize;
                    let voxel_centre = Vector3d::to_microns_from(&p, &resolution, &offset);
                    for _ in 0..count {
                        let ux = rng.gen_range(-0.5..0.5) / resolution.x;
                        let uy = rng.gen_range(-0.5..0.5) / resolution.y;
                        let uz = rng.gen_range(-0.5..0.5) / resolution.z;
                        let jitter = Vector3d::new(
                            dist_x.sample(rng),
                            dist_y.sample(rng),
                            dist_z.sample(rng),
                        );
                        dots.push(Dot {
                            position: voxel_centre + Vector3d::new(ux, uy, uz) + jitter,
                            excitation_count: 0,
                        });
                    }
                }
            }
        }

        TextureDotCloud {
            dots,
            quantum: quantization,
        }
    }

    /// §4.6: for every dot outside the union of `spheres`, relocate it to
    /// a Gaussian-distributed position (sigma = r/2) inside the nearest
    /// sphere by surface distance, rejection-resampled until it actually
    /// lands inside.
    pub fn collect_outlying_dots(&mut self, spheres: &Spheres, rng: &mut ChaCha8Rng) {
        for dot in self.dots.iter_mut() {
            if spheres.collide_with_point(dot.position, None).is_some() {
                continue;
            }

            let Some((j, _)) = (0..spheres.no_of_spheres())
                .map(|j| {
                    let surface_dist = (dot.position - spheres.centre(j)).len() - spheres.radius(j);
                    (j, surface_dist)
                })
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            else {
                continue;
            };

            let c = spheres.centre(j);
            let r = spheres.radius(j);
            let sigma = (r * 0.5).max(1e-6);
            let dist = Normal::new(0.0, sigma).unwrap();

            for _ in 0..32 {
                let candidate = c
                    + Vector3d::new(dist.sample(rng), dist.sample(rng), dist.sample(rng));
                if (candidate - c).len() <= r {
                    dot.position = candidate;
                    break;
                }
            }
        }
    }

    /// Returns the fraction of dots currently outside the union of
    /// `spheres` (used by the containment test, §8 property 10 / S6).
    pub fn outlying_fraction(&self, spheres: &Spheres) -> f64 {
        if self.dots.is_empty() {
            return 0.0;
        }
        let outside = self
            .dots
            .iter()
            .filter(|d| spheres.collide_with_point(d.position, None).is_none())
            .count();
        outside as f64 / self.dots.len() as f64
    }

    /// §4.6: each render call increments every dot's excitation counter
    /// and contributes `quantum * exp(-excitationCount)` additively to
    /// the voxel containing it.
    pub fn render_phantom(&mut self, image: &mut [f64], size: &VoxelCoord, resolution: Vector3d, offset: Vector3d) {
        for dot in self.dots.iter_mut() {
            dot.excitation_count += 1;
            let px = dot.position.to_pixels_rounded(&resolution, &offset);
            if px.x >= size.x || px.y >= size.y || px.z >= size.z {
                continue;
            }
            let intensity = self.quantum * (-(dot.excitation_count as f64)).exp();
            image[px.to_img_index(size)] += intensity;
        }
    }

    /// The quantised variant: spreads one dot's contribution over a
    /// `q_counts.x * q_counts.y * q_counts.z` sub-grid centred on the
    /// dot, each sub-quantum receiving the *full* per-dot intensity
    /// (§4.6), so the total deposited per dot is multiplied by the
    /// product of `q_counts`.
    pub fn render_phantom_quantized(
        &mut self,
        image: &mut [f64],
        size: &VoxelCoord,
        resolution: Vector3d,
        offset: Vector3d,
        q_counts: VoxelCoord,
    ) {
        for dot in self.dots.iter_mut() {
            dot.excitation_count += 1;
            let intensity = self.quantum * (-(dot.excitation_count as f64)).exp();
            let base = dot.position.to_pixels_rounded(&resolution, &offset);

            let half_x = (q_counts.x / 2) as i64;
            let half_y = (q_counts.y / 2) as i64;
            let half_z = (q_counts.z / 2) as i64;
            for dz in -half_z..=half_z {
                for dy in -half_y..=half_y {
                    for dx in -half_x..=half_x {
                        let x = base.x as i64 + dx;
                        let y = base.y as i64 + dy;
                        let z = base.z as i64 + dz;
                        if x < 0 || y < 0 || z < 0 {
                            continue;
                        }
                        let p = VoxelCoord::new(x as usize, y as usize, z as usize);
                        if p.x >= size.x || p.y >= size.y || p.z >= size.z {
                            continue;
                        }
                        image[p.to_img_index(size)] += intensity;
                    }
                }
            }
        }
    }
}

/// The snapshot of one sphere needed to advect dots between two rounds
/// (§4.6, 4S variant): centre, radius, and an orientation unit vector.
#[derive(Debug, Clone, Copy)]
pub struct SphereMotion {
    pub prev_centre: Vector3d,
    pub prev_radius: f64,
    pub prev_orientation: Vector3d,
    pub new_centre: Vector3d,
    pub new_radius: f64,
    pub new_orientation: Vector3d,
}

/// Advects every dot in `cloud` under the combined motion of `spheres`,
/// weighting each sphere's candidate new position by
/// `max(prevRadius - |dot - prevCentre|, 0)`. Dots with all-zero weight
/// are left in place (they become outliers, collected separately).
pub fn advect_dots(cloud: &mut TextureDotCloud, spheres: &[SphereMotion]) {
    for dot in cloud.dots.iter_mut() {
        let mut weighted_sum = Vector3d::ZERO;
        let mut weight_total = 0.0;

        for s in spheres {
            let weight = (s.prev_radius - (dot.position - s.prev_centre).len()).max(0.0);
            if weight <= 0.0 {
                continue;
            }
            let candidate = advect_single_sphere(dot.position, s);
            weighted_sum += candidate * weight;
            weight_total += weight;
        }

        if weight_total > 0.0 {
            dot.position = weighted_sum / weight_total;
        }
    }
}

fn advect_single_sphere(position: Vector3d, s: &SphereMotion) -> Vector3d {
    let local = position - s.prev_centre;
    let rotated = rotate_between(local, s.prev_orientation, s.new_orientation);
    let scale = if s.prev_radius.abs() > 1e-12 {
        s.new_radius / s.prev_radius
    } else {
        1.0
    };
    rotated * scale + s.new_centre
}

/// Rotates `v` by the quaternion that takes unit vector `from` to unit
/// vector `to`; the identity rotation if the two are nearly parallel.
fn rotate_between(v: Vector3d, from: Vector3d, to: Vector3d) -> Vector3d {
    let from = from.normalized_or_zero();
    let to = to.normalized_or_zero();
    let cos_theta = from.dot(&to).clamp(-1.0, 1.0);
    if (cos_theta - 1.0).abs() < 1e-9 {
        return v;
    }
    if (cos_theta + 1.0).abs() < 1e-9 {
        return v * -1.0;
    }

    let axis = cross(from, to).normalized_or_zero();
    let half_theta = cos_theta.acos() * 0.5;
    let (s, c) = (half_theta.sin(), half_theta.cos());
    let qw = c;
    let qv = axis * s;

    // v' = v + 2*qv x (qv x v + qw*v)
    let t = cross(qv, v) + v * qw;
    v + cross(qv, t) * 2.0
}

fn cross(a: Vector3d, b: Vector3d) -> Vector3d {
    Vector3d::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn phantom_intensity_strictly_decreases_with_excitation() {
        let mut cloud = TextureDotCloud {
            dots: vec![Dot {
                position: Vector3d::new(1.0, 1.0, 1.0),
                excitation_count: 0,
            }],
            quantum: 100.0,
        };
        let size = VoxelCoord::new(4, 4, 4);
        let res = Vector3d::splat(1.0);
        let off = Vector3d::ZERO;

        let mut prev = f64::INFINITY;
        for _ in 0..5 {
            let mut image = vec![0.0; size.x * size.y * size.z];
            cloud.render_phantom(&mut image, &size, res, off);
            let total: f64 = image.iter().sum();
            assert!(total < prev);
            prev = total;
        }
    }

    #[test]
    fn rotate_between_identical_directions_is_identity() {
        let v = Vector3d::new(1.0, 2.0, 3.0);
        let same = rotate_between(v, Vector3d::new(1.0, 0.0, 0.0), Vector3d::new(1.0, 0.0, 0.0));
        assert!((same - v).len() < 1e-9);
    }

    #[test]
    fn collect_outlying_dots_ends_up_inside_union() {
        let mut spheres = Spheres::new(1);
        spheres.update_centre(0, Vector3d::new(0.0, 0.0, 0.0));
        spheres.update_radius(0, 5.0);

        let mut cloud = TextureDotCloud {
            dots: vec![Dot {
                position: Vector3d::new(100.0, 0.0, 0.0),
                excitation_count: 0,
            }],
            quantum: 1.0,
        };
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        cloud.collect_outlying_dots(&spheres, &mut rng);
        assert_eq!(cloud.outlying_fraction(&spheres), 0.0);
    }
}
