//! The legacy 2-D polar boundary-point agent (§4.4): a cell represented
//! as a ring of points at `(angle, radius)` around a centre, whose shape
//! is reshaped phase-by-phase and which splits into two daughters at
//! cytokinesis.
//!
//! This is the variant the original used before the sphere-chain nucleus
//! became the primary representation; it is kept here because it is the
//! only agent in this crate whose cell-cycle hooks actually reshape the
//! geometry (growth, elongation, furrow contraction) rather than merely
//! gating speed.

use embryogen_concepts::agent::{Agent as AgentTrait, AgentIdentity};
use embryogen_concepts::cycle::{Cycle, CyclePhase, DivisionEvent};
use embryogen_concepts::vector::Vector3d;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::cell_cycle::CellCycle;

/// Minimum number of boundary points the ring is kept subdivided to
/// (§4.4 G1: "subdividing boundary point arcs to keep a minimum vertex
/// density").
pub const MIN_VERTEX_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub angle: f64,
    pub radius: f64,
    pub initial_radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryPointAgent {
    pub identity: AgentIdentity,
    pub centre: Vector3d,
    /// unit vector marking the cell's major-axis pole (2-D, z ignored)
    pub orientation: Vector3d,
    pub points: Vec<BoundaryPoint>,
    pub cycle: CellCycle,
    pub desired_velocity: Vector3d,
    pub persistence_time: f64,
    pub velocity: Vector3d,
}

impl BoundaryPointAgent {
    pub fn new_circular(
        identity: AgentIdentity,
        centre: Vector3d,
        orientation: Vector3d,
        radius: f64,
        n_points: usize,
        cycle: CellCycle,
    ) -> Self {
        let points = (0..n_points)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / n_points as f64;
                BoundaryPoint {
                    angle,
                    radius,
                    initial_radius: radius,
                }
            })
            .collect();
        BoundaryPointAgent {
            identity,
            centre,
            orientation: orientation.normalized_or_zero(),
            points,
            cycle,
            desired_velocity: Vector3d::ZERO,
            persistence_time: 2.0,
            velocity: Vector3d::ZERO,
        }
    }

    pub fn pole_angle(&self) -> f64 {
        self.orientation.y.atan2(self.orientation.x)
    }

    /// Smallest signed angular distance from `angle` to the pole, in
    /// `[-pi, pi]`.
    fn angular_distance_to_pole(&self, angle: f64) -> f64 {
        let mut d = angle - self.pole_angle();
        while d > PI {
            d -= 2.0 * PI;
        }
        while d < -PI {
            d += 2.0 * PI;
        }
        d
    }

    fn nearest_point_index_to_pole(&self) -> usize {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                self.angular_distance_to_pole(a.angle)
                    .abs()
                    .partial_cmp(&self.angular_distance_to_pole(b.angle).abs())
                    .unwrap()
            })
            .map(|(i, _)| i)
            .unwrap()
    }

    /// Index of the point whose angle is closest to `target`.
    fn nearest_point_index_to_angle(&self, target: f64) -> usize {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                angular_gap(a.angle, target)
                    .partial_cmp(&angular_gap(b.angle, target))
                    .unwrap()
            })
            .map(|(i, _)| i)
            .unwrap()
    }

    /// §4.4 G1: interpolate every radius a `rate` fraction of the way back
    /// toward its initial value, then subdivide arcs that have grown too
    /// sparse.
    pub fn relax_toward_initial_shape(&mut self, rate: f64) {
        for p in self.points.iter_mut() {
            p.radius += (p.initial_radius - p.radius) * rate;
        }
        self.subdivide_to_min_density();
    }

    fn subdivide_to_min_density(&mut self) {
        if self.points.len() >= MIN_VERTEX_COUNT {
            return;
        }
        let mut subdivided = Vec::with_capacity(self.points.len() * 2);
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            subdivided.push(a);
            let mut mid_angle = (a.angle + angular_unwrap(a.angle, b.angle)) * 0.5;
            mid_angle = normalize_angle(mid_angle);
            subdivided.push(BoundaryPoint {
                angle: mid_angle,
                radius: (a.radius + b.radius) * 0.5,
                initial_radius: (a.initial_radius + b.initial_radius) * 0.5,
            });
        }
        self.points = subdivided;
    }

    /// §4.4 Telophase: elongate along the major axis. The point nearest
    /// the pole moves out by 35% of its current distance; every other
    /// point is elongated by the same fraction weighted by a Gaussian of
    /// its angular distance to the pole, sigma chosen so 200 degrees
    /// spans six sigma.
    pub fn elongate_toward_pole(&mut self) {
        const ELONGATION_FRACTION: f64 = 0.35;
        let sigma = (200.0_f64.to_radians()) / 6.0;
        let pole = self.pole_angle();

        for p in self.points.iter_mut() {
            let mut d = p.angle - pole;
            while d > PI {
                d -= 2.0 * PI;
            }
            while d < -PI {
                d += 2.0 * PI;
            }
            let weight = (-(d * d) / (2.0 * sigma * sigma)).exp();
            p.radius += p.radius * ELONGATION_FRACTION * weight;
        }
    }

    /// §4.4 Cytokinesis (run): contract the two minor-axis points toward
    /// the centre by up to 85%, cascading halved contractions to their
    /// angular neighbours within +-45 degrees.
    pub fn contract_furrow(&mut self, progress: f64) {
        const MAX_CONTRACTION: f64 = 0.85;
        let pole = self.pole_angle();
        let minor_a = normalize_angle(pole + PI / 2.0);
        let minor_b = normalize_angle(pole - PI / 2.0);

        let idx_a = self.nearest_point_index_to_angle(minor_a);
        let idx_b = self.nearest_point_index_to_angle(minor_b);
        let contraction = MAX_CONTRACTION * progress;

        let angles: Vec<f64> = self.points.iter().map(|p| p.angle).collect();
        for &idx in &[idx_a, idx_b] {
            let centre_angle = angles[idx];
            for (i, &angle) in angles.iter().enumerate() {
                let gap = angular_gap(angle, centre_angle).to_degrees();
                if gap <= 45.0 {
                    let falloff = 0.5_f64.powf(gap / 45.0);
                    self.points[i].radius *= 1.0 - contraction * falloff;
                }
            }
        }
    }

    /// Splits the ring into two daughters at the minor-axis points,
    /// returning `(self-updated-as-daughter-A, daughter-B)`. Both are
    /// reinitialised into `G1` with a freshly sampled duration by the
    /// caller (needs an RNG, which this method deliberately does not
    /// own).
    pub fn split(&self, daughter_b_id: embryogen_concepts::agent::AgentId, cycle_b: CellCycle) -> (BoundaryPointAgent, BoundaryPointAgent) {
        let pole = self.pole_angle();
        let minor_a = normalize_angle(pole + PI / 2.0);
        let minor_b = normalize_angle(pole - PI / 2.0);
        let idx_a = self.nearest_point_index_to_angle(minor_a);
        let idx_b = self.nearest_point_index_to_angle(minor_b);

        let (lo, hi) = if idx_a < idx_b { (idx_a, idx_b) } else { (idx_b, idx_a) };
        let ring_a: Vec<BoundaryPoint> = self.points[lo..=hi].to_vec();
        let ring_b: Vec<BoundaryPoint> = self
            .points
            .iter()
            .enumerate()
            .filter(|(i, _)| *i <= lo || *i >= hi)
            .map(|(_, p)| *p)
            .collect();

        let centre_of = |ring: &[BoundaryPoint], base_centre: Vector3d| -> Vector3d {
            let mut acc = Vector3d::ZERO;
            for p in ring {
                acc += base_centre + Vector3d::new(p.radius * p.angle.cos(), p.radius * p.angle.sin(), 0.0);
            }
            acc / (ring.len() as f64)
        };

        let centre_a = centre_of(&ring_a, self.centre);
        let centre_b = centre_of(&ring_b, self.centre);

        let mut daughter_a = self.clone();
        daughter_a.centre = centre_a;
        daughter_a.points = recentre(&ring_a, self.centre, centre_a);

        let mut daughter_b = self.clone();
        daughter_b.identity.id = daughter_b_id;
        daughter_b.cycle = cycle_b;
        daughter_b.centre = centre_b;
        daughter_b.points = recentre(&ring_b, self.centre, centre_b);

        (daughter_a, daughter_b)
    }

    pub fn centre_of_geometry(&self) -> Vector3d {
        let mut acc = Vector3d::ZERO;
        for p in &self.points {
            acc += self.centre + Vector3d::new(p.radius * p.angle.cos(), p.radius * p.angle.sin(), 0.0);
        }
        acc / (self.points.len() as f64)
    }
}

fn recentre(ring: &[BoundaryPoint], old_centre: Vector3d, new_centre: Vector3d) -> Vec<BoundaryPoint> {
    ring.iter()
        .map(|p| {
            let world = old_centre + Vector3d::new(p.radius * p.angle.cos(), p.radius * p.angle.sin(), 0.0);
            let local = world - new_centre;
            BoundaryPoint {
                angle: local.y.atan2(local.x),
                radius: local.len(),
                initial_radius: p.initial_radius,
            }
        })
        .collect()
}

fn normalize_angle(a: f64) -> f64 {
    let mut a = a % (2.0 * PI);
    if a < 0.0 {
        a += 2.0 * PI;
    }
    a
}

fn angular_gap(a: f64, b: f64) -> f64 {
    let mut d = (a - b).abs() % (2.0 * PI);
    if d > PI {
        d = 2.0 * PI - d;
    }
    d
}

fn angular_unwrap(a: f64, b: f64) -> f64 {
    let mut b = b;
    while b - a > PI {
        b -= 2.0 * PI;
    }
    while b - a < -PI {
        b += 2.0 * PI;
    }
    b
}

impl AgentTrait for BoundaryPointAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }
    fn identity_mut(&mut self) -> &mut AgentIdentity {
        &mut self.identity
    }
}

// BoundaryPointAgent does not implement `Mechanics`/`Interaction` the way
// `Nucleus` does: it is driven purely by its own cycle hooks and a
// straight-line velocity integration, matching the legacy source where
// this variant predates the spheres-based force pipeline.
impl BoundaryPointAgent {
    pub fn integrate_free_motion(&mut self, dt: f64) {
        let accel_to_desired = (self.desired_velocity - self.velocity) / self.persistence_time;
        self.velocity += accel_to_desired * dt;
        self.centre += self.velocity * dt;
    }

    /// Advances this agent's own cell cycle to time `t`, extracting it via
    /// `std::mem::take` first so the cycle and the agent never alias (see
    /// `CellCycle::advance`'s calling convention).
    pub fn advance_cycle(&mut self, rng: &mut ChaCha8Rng, t: f64) -> Option<DivisionEvent> {
        let mut cycle = std::mem::take(&mut self.cycle);
        let division = cycle.advance::<BoundaryPointAgent, BoundaryPointCycleHooks>(self, rng, t);
        self.cycle = cycle;
        division
    }
}

pub struct BoundaryPointCycleHooks;

impl Cycle<BoundaryPointAgent> for BoundaryPointCycleHooks {
    fn on_phase_start(agent: &mut BoundaryPointAgent, phase: CyclePhase, phase_duration: f64) {
        match phase {
            CyclePhase::Prophase | CyclePhase::Metaphase | CyclePhase::Anaphase => {
                agent.desired_velocity = Vector3d::ZERO;
                agent.persistence_time = phase_duration.max(1e-3);
            }
            _ => {}
        }
    }

    fn on_phase_run(agent: &mut BoundaryPointAgent, phase: CyclePhase, progress: f64) {
        match phase {
            CyclePhase::G1 => agent.relax_toward_initial_shape(progress * 0.1),
            CyclePhase::Telophase => {
                if progress >= 1.0 - f64::EPSILON {
                    agent.elongate_toward_pole();
                }
            }
            CyclePhase::Cytokinesis => agent.contract_furrow(progress),
            _ => {}
        }
    }

    fn on_phase_close(_agent: &mut BoundaryPointAgent, _phase: CyclePhase) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use embryogen_concepts::agent::AgentIdentity as Identity;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixture() -> BoundaryPointAgent {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cycle = CellCycle::new(3.0, &mut rng);
        BoundaryPointAgent::new_circular(
            Identity::new(1, "boundary-cell", 0.1),
            Vector3d::new(50.0, 50.0, 0.0),
            Vector3d::new(1.0, 0.0, 0.0),
            10.0,
            12,
            cycle,
        )
    }

    #[test]
    fn relax_pulls_radii_toward_initial_value() {
        let mut a = fixture();
        for p in a.points.iter_mut() {
            p.radius = 20.0;
        }
        a.relax_toward_initial_shape(0.5);
        for p in &a.points {
            assert!(p.radius < 20.0);
        }
    }

    #[test]
    fn split_preserves_centre_of_geometry_to_within_tolerance() {
        let a = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let cycle_b = CellCycle::new(3.0, &mut rng);
        let parent_centre = a.centre_of_geometry();
        let (d1, d2) = a.split(2, cycle_b);

        let n1 = d1.points.len() as f64;
        let n2 = d2.points.len() as f64;
        let weighted = (d1.centre_of_geometry() * n1 + d2.centre_of_geometry() * n2) / (n1 + n2);
        assert!((weighted - parent_centre).len() < 1.0);
    }
}
